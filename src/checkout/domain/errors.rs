use crate::checkout::domain::overrides::{OverrideReason, StaffPermissions};
use crate::core::library::{BackendError, LibraryError};

pub(crate) const ITEM_NOT_LOANABLE: &str = "ITEM_NOT_LOANABLE";
pub(crate) const ITEM_LIMIT_REACHED: &str = "ITEM_LIMIT_REACHED";
pub(crate) const ITEM_HAS_OPEN_LOAN: &str = "ITEM_HAS_OPEN_LOAN";
pub(crate) const USER_IS_INACTIVE: &str = "USER_IS_INACTIVE";
pub(crate) const USER_IS_BLOCKED_MANUALLY: &str = "USER_IS_BLOCKED_MANUALLY";
pub(crate) const USER_IS_BLOCKED_AUTOMATICALLY: &str = "USER_IS_BLOCKED_AUTOMATICALLY";

// patron blocks are shown through the block modal, never in the error list
const HIDDEN_CODES: [&str; 2] = [USER_IS_BLOCKED_MANUALLY, USER_IS_BLOCKED_AUTOMATICALLY];

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Classification {
    // the backend could not be reached or answered without a structured body
    Transport {
        message: String,
    },
    // nothing but patron-block errors
    PatronBlocked,
    Override {
        reasons: Vec<OverrideReason>,
        messages: Vec<String>,
        loan_policy_name: Option<String>,
    },
    Fatal {
        messages: Vec<String>,
    },
}

pub(crate) fn classify(err: &LibraryError, permissions: &StaffPermissions) -> Classification {
    let errors = match err {
        LibraryError::Rejected { errors, .. } if !errors.is_empty() => errors,
        other => {
            return Classification::Transport { message: other.to_string() };
        }
    };

    let visible: Vec<&BackendError> = errors.iter().filter(|e| !is_hidden(e)).collect();
    let messages: Vec<String> = visible.iter().map(|e| message_for(e)).collect();

    if visible.is_empty() {
        return Classification::PatronBlocked;
    }

    let mut reasons = vec![];
    let mut overridable = true;
    for e in errors {
        match override_reason(e) {
            Some(reason) if permissions.can_override(reason) => {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
            // a hidden patron block without an override path stays with the block modal
            None if is_hidden(e) => {}
            _ => overridable = false,
        }
    }

    if overridable && !reasons.is_empty() {
        let loan_policy_name = errors.iter()
            .find_map(|e| e.parameter("loanPolicyName"))
            .map(str::to_string);
        Classification::Override { reasons, messages, loan_policy_name }
    } else {
        Classification::Fatal { messages }
    }
}

fn is_hidden(err: &BackendError) -> bool {
    err.code.as_deref().map(|c| HIDDEN_CODES.contains(&c)).unwrap_or(false)
}

// An error can be overridden when the backend names an overridable block and reports no
// permission missing for it.
fn override_reason(err: &BackendError) -> Option<OverrideReason> {
    match &err.overridable_block {
        Some(block) if block.missing_override_permissions.is_empty() => {
            OverrideReason::from_block_name(block.name.as_str())
        }
        Some(_) => None,
        None => match err.code.as_deref() {
            Some(ITEM_NOT_LOANABLE) => Some(OverrideReason::ItemNotLoanable),
            Some(ITEM_LIMIT_REACHED) => Some(OverrideReason::ItemLimitReached),
            _ => None,
        },
    }
}

// Readable message for a known code; falls back to the server text when the code is
// unknown or a parameter the template needs is missing.
pub(crate) fn message_for(err: &BackendError) -> String {
    let template = match err.code.as_deref() {
        Some(ITEM_NOT_LOANABLE) => "Item is not loanable (loan policy {loanPolicyName})",
        Some(ITEM_LIMIT_REACHED) => "Patron has reached maximum limit of {itemLimit} items",
        Some(ITEM_HAS_OPEN_LOAN) => "Item is already checked out",
        Some(USER_IS_INACTIVE) => "Patron account is inactive",
        _ => return err.message.to_string(),
    };
    fill(template, err).unwrap_or_else(|| err.message.to_string())
}

fn fill(template: &str, err: &BackendError) -> Option<String> {
    let mut out = String::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..].find('}')? + start;
        out.push_str(&rest[..start]);
        out.push_str(err.parameter(&rest[start + 1..end])?);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use crate::checkout::domain::errors::{classify, Classification, message_for};
    use crate::checkout::domain::overrides::{OverrideReason, StaffPermissions};
    use crate::core::library::{BackendError, LibraryError, OverridableBlock};

    fn not_loanable() -> BackendError {
        let mut err = BackendError::new("Item is not loanable", Some("ITEM_NOT_LOANABLE"))
            .with_parameter("loanPolicyName", "Reading room");
        err.overridable_block = Some(OverridableBlock { name: "itemNotLoanableBlock".to_string(), missing_override_permissions: vec![] });
        err
    }

    fn blocked() -> BackendError {
        let mut err = BackendError::new("Patron blocked from borrowing", Some("USER_IS_BLOCKED_MANUALLY"));
        err.overridable_block = Some(OverridableBlock { name: "patronBlock".to_string(), missing_override_permissions: vec![] });
        err
    }

    #[tokio::test]
    async fn test_should_substitute_parameters() {
        assert_eq!("Item is not loanable (loan policy Reading room)", message_for(&not_loanable()).as_str());
        let err = BackendError::new("server text", Some("ITEM_LIMIT_REACHED"));
        assert_eq!("server text", message_for(&err).as_str());
        let err = BackendError::new("server text", Some("ITEM_LIMIT_REACHED")).with_parameter("itemLimit", "5");
        assert_eq!("Patron has reached maximum limit of 5 items", message_for(&err).as_str());
        let err = BackendError::new("Something odd", Some("UNKNOWN_CODE"));
        assert_eq!("Something odd", message_for(&err).as_str());
    }

    #[tokio::test]
    async fn test_should_classify_transport() {
        let res = classify(&LibraryError::transport(Some(500), "<html>"), &StaffPermissions::overrides());
        assert!(matches!(res, Classification::Transport { .. }));
        let res = classify(&LibraryError::rejected(422, vec![]), &StaffPermissions::overrides());
        assert!(matches!(res, Classification::Transport { .. }));
    }

    #[tokio::test]
    async fn test_should_offer_override_with_permission() {
        let err = LibraryError::rejected(422, vec![not_loanable()]);
        match classify(&err, &StaffPermissions::overrides()) {
            Classification::Override { reasons, messages, loan_policy_name } => {
                assert_eq!(vec![OverrideReason::ItemNotLoanable], reasons);
                assert_eq!(1, messages.len());
                assert_eq!(Some("Reading room".to_string()), loan_policy_name);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_fail_without_permission() {
        let err = LibraryError::rejected(422, vec![not_loanable()]);
        assert!(matches!(classify(&err, &StaffPermissions::default()), Classification::Fatal { .. }));

        let mut missing = not_loanable();
        if let Some(block) = missing.overridable_block.as_mut() {
            block.missing_override_permissions = vec!["circulation.override-item-not-loanable-block.post".to_string()];
        }
        let err = LibraryError::rejected(422, vec![missing]);
        assert!(matches!(classify(&err, &StaffPermissions::overrides()), Classification::Fatal { .. }));
    }

    #[tokio::test]
    async fn test_should_fail_when_any_error_is_not_overridable() {
        let err = LibraryError::rejected(422, vec![not_loanable(), BackendError::new("Item is already checked out", Some("ITEM_HAS_OPEN_LOAN"))]);
        match classify(&err, &StaffPermissions::overrides()) {
            Classification::Fatal { messages } => assert_eq!(2, messages.len()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_hide_patron_block_codes() {
        let err = LibraryError::rejected(422, vec![blocked()]);
        assert_eq!(Classification::PatronBlocked, classify(&err, &StaffPermissions::overrides()));

        let err = LibraryError::rejected(422, vec![blocked(), not_loanable()]);
        match classify(&err, &StaffPermissions::overrides()) {
            Classification::Override { reasons, messages, .. } => {
                assert_eq!(vec![OverrideReason::PatronBlock, OverrideReason::ItemNotLoanable], reasons);
                assert_eq!(vec!["Item is not loanable (loan policy Reading room)".to_string()], messages);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
