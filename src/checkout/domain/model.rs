use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::checkout::dto::{LoanDto, LoanPolicyDto};
use crate::items::dto::{CirculationNote, ItemDto};
use crate::patrons::dto::PatronDto;
use crate::utils::date::serializer;

// PatronPair is the selected patron and the borrower the loans are made for. They differ
// only when a proxy checks out on behalf of a sponsor.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub(crate) struct PatronPair {
    pub patron: PatronDto,
    pub borrower: PatronDto,
}

impl PatronPair {
    pub(crate) fn of(patron: PatronDto) -> Self {
        Self {
            borrower: patron.clone(),
            patron,
        }
    }

    pub(crate) fn proxied(patron: PatronDto, borrower: PatronDto) -> Self {
        Self {
            patron,
            borrower,
        }
    }

    pub(crate) fn is_proxy(&self) -> bool {
        self.patron.id != self.borrower.id
    }

    // barcode of the proxy acting for the borrower, if any
    pub(crate) fn proxy_barcode(&self) -> Option<String> {
        if self.is_proxy() {
            self.patron.barcode.clone()
        } else {
            None
        }
    }
}

// ScannedItem is the outcome of one successful checkout.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScannedItem {
    pub loan: LoanDto,
    // absent when the policy could not be fetched
    pub loan_policy: Option<LoanPolicyDto>,
    pub checkout_notes: Vec<CirculationNote>,
    pub item: Option<ItemDto>,
    #[serde(with = "serializer")]
    pub scanned_at: DateTime<Utc>,
}
