use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::AddInfoKind;
use crate::items::dto::ItemDto;
use crate::patrons::dto::PatronDto;
use crate::utils::date::{opt_serializer, serializer};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanItemDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub call_number: Option<String>,
}

impl From<&ItemDto> for LoanItemDto {
    fn from(other: &ItemDto) -> Self {
        Self {
            id: Some(other.id.to_string()),
            barcode: other.barcode.clone(),
            title: other.title.clone(),
            call_number: other.call_number.clone(),
        }
    }
}

// LoanDto abstracts the loan created by a successful checkout.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanDto {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_user_id: Option<String>,
    pub item_id: String,
    #[serde(default)]
    pub item: Option<LoanItemDto>,
    #[serde(default)]
    pub loan_policy_id: Option<String>,
    #[serde(with = "serializer")]
    pub loan_date: DateTime<Utc>,
    #[serde(default, with = "opt_serializer")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub action_comment: Option<String>,
}

impl LoanDto {
    pub(crate) fn new(borrower: &PatronDto, item: &ItemDto, loan_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: borrower.id.to_string(),
            proxy_user_id: None,
            item_id: item.id.to_string(),
            item: Some(LoanItemDto::from(item)),
            loan_policy_id: None,
            loan_date,
            due_date: Some(loan_date + Duration::days(14)),
            action: Some("checkedout".to_string()),
            action_comment: None,
        }
    }
}

impl Identifiable for LoanDto {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanPeriodDto {
    pub duration: i64,
    pub interval_id: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoansPolicyDto {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub period: Option<LoanPeriodDto>,
    #[serde(default)]
    pub fixed_due_date_schedule_id: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FixedDueDateScheduleDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanPolicyDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_loanable")]
    pub loanable: bool,
    #[serde(default)]
    pub loans_policy: Option<LoansPolicyDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_due_date_schedule: Option<FixedDueDateScheduleDto>,
}

fn default_loanable() -> bool {
    true
}

impl LoanPolicyDto {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            loanable: true,
            loans_policy: Some(LoansPolicyDto {
                profile_id: Some("Rolling".to_string()),
                period: Some(LoanPeriodDto { duration: 14, interval_id: "Days".to_string() }),
                fixed_due_date_schedule_id: None,
            }),
            fixed_due_date_schedule: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub(crate) struct EmptyBlock {}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DueDateBlock {
    #[serde(with = "serializer")]
    pub due_date: DateTime<Utc>,
}

// Override payload attached to a checkout; only the blocks being overridden are present.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverrideBlocks {
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patron_block: Option<EmptyBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_not_loanable_block: Option<DueDateBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_limit_block: Option<EmptyBlock>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutRequest {
    pub item_barcode: String,
    pub user_barcode: String,
    pub service_point_id: String,
    #[serde(with = "serializer")]
    pub loan_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_user_barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_blocks: Option<OverrideBlocks>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddInfoRequest {
    pub action: String,
    pub action_comment: String,
}

impl AddInfoRequest {
    pub(crate) fn new(kind: AddInfoKind, comment: &str) -> Self {
        Self {
            action: kind.action().to_string(),
            action_comment: comment.to_string(),
        }
    }
}
