use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::checkout::dto::{DueDateBlock, EmptyBlock, OverrideBlocks};
use crate::core::library::CheckoutError;
use crate::core::view::FormField;
use crate::utils::date::parse_date;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum OverrideReason {
    ItemNotLoanable,
    ItemLimitReached,
    PatronBlock,
}

impl OverrideReason {
    pub fn permission(&self) -> &'static str {
        match self {
            OverrideReason::ItemNotLoanable => "circulation.override-item-not-loanable-block.post",
            OverrideReason::ItemLimitReached => "circulation.override-item-limit-block.post",
            OverrideReason::PatronBlock => "circulation.override-patron-block.post",
        }
    }

    pub fn requires_due_date(&self) -> bool {
        matches!(self, OverrideReason::ItemNotLoanable)
    }

    // name the backend uses in `overridableBlock`
    pub fn block_name(&self) -> &'static str {
        match self {
            OverrideReason::ItemNotLoanable => "itemNotLoanableBlock",
            OverrideReason::ItemLimitReached => "itemLimitBlock",
            OverrideReason::PatronBlock => "patronBlock",
        }
    }

    pub fn from_block_name(name: &str) -> Option<OverrideReason> {
        match name {
            "itemNotLoanableBlock" => Some(OverrideReason::ItemNotLoanable),
            "itemLimitBlock" => Some(OverrideReason::ItemLimitReached),
            "patronBlock" => Some(OverrideReason::PatronBlock),
            _ => None,
        }
    }
}

impl Display for OverrideReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.block_name())
    }
}

// Permissions held by the staff member operating the desk.
#[derive(Debug, PartialEq, Clone, Default)]
pub(crate) struct StaffPermissions(HashSet<String>);

impl StaffPermissions {
    pub fn new<I: IntoIterator<Item=String>>(permissions: I) -> Self {
        Self(permissions.into_iter().collect())
    }

    // every override permission
    pub fn overrides() -> Self {
        Self::new([OverrideReason::ItemNotLoanable, OverrideReason::ItemLimitReached, OverrideReason::PatronBlock]
            .iter()
            .map(|r| r.permission().to_string()))
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn can_override(&self, reason: OverrideReason) -> bool {
        self.contains(reason.permission())
    }
}

// OverrideInfo is a validated justification supplied by staff.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverrideInfo {
    pub comment: String,
    pub due_date: Option<DateTime<Utc>>,
    pub patron_block: bool,
}

impl OverrideInfo {
    pub(crate) fn patron_block(comment: &str) -> Self {
        Self {
            comment: comment.trim().to_string(),
            due_date: None,
            patron_block: true,
        }
    }
}

// The override form as submitted, before validation.
#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverrideDraft {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl OverrideDraft {
    pub(crate) fn new(comment: &str, due_date: Option<&str>) -> Self {
        Self {
            comment: comment.to_string(),
            due_date: due_date.map(str::to_string),
        }
    }

    pub(crate) fn validate(&self, reasons: &[OverrideReason]) -> Result<OverrideInfo, CheckoutError> {
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(CheckoutError::missing_data(FormField::OverrideComment, "Comment is required"));
        }
        let due_date = if reasons.iter().any(OverrideReason::requires_due_date) {
            let due_date = self.due_date.as_deref().and_then(parse_date);
            if due_date.is_none() {
                return Err(CheckoutError::missing_data(FormField::OverrideDueDate, "Due date is required"));
            }
            due_date
        } else {
            None
        };
        Ok(OverrideInfo {
            comment: comment.to_string(),
            due_date,
            patron_block: reasons.contains(&OverrideReason::PatronBlock),
        })
    }
}

// An item-level override, used for a single commit.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct ItemOverride {
    pub reasons: Vec<OverrideReason>,
    pub info: OverrideInfo,
}

// Builds the checkout override payload from the item override of this attempt and the
// patron-block override retained for the patron.
pub(crate) fn merge_overrides(item: Option<&ItemOverride>, patron: Option<&OverrideInfo>) -> Option<OverrideBlocks> {
    if item.is_none() && patron.is_none() {
        return None;
    }
    let comment = item.map(|o| o.info.comment.to_string())
        .or_else(|| patron.map(|o| o.comment.to_string()))
        .unwrap_or_default();
    let mut blocks = OverrideBlocks { comment, ..OverrideBlocks::default() };
    if let Some(item) = item {
        for reason in &item.reasons {
            match reason {
                OverrideReason::ItemNotLoanable => {
                    blocks.item_not_loanable_block = item.info.due_date.map(|due_date| DueDateBlock { due_date });
                }
                OverrideReason::ItemLimitReached => {
                    blocks.item_limit_block = Some(EmptyBlock {});
                }
                OverrideReason::PatronBlock => {
                    blocks.patron_block = Some(EmptyBlock {});
                }
            }
        }
    }
    if patron.map(|p| p.patron_block).unwrap_or(false) {
        blocks.patron_block = Some(EmptyBlock {});
    }
    Some(blocks)
}
