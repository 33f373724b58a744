use std::fmt;
use std::fmt::{Display, Formatter};
use serde::Serialize;
use crate::checkout::domain::overrides::OverrideReason;
use crate::items::dto::{CirculationNote, ItemDto};
use crate::core::library::{AddInfoKind, CheckoutError};
use crate::patrons::dto::PatronDto;

// Form inputs the presentation layer renders errors against.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    PatronIdentifier,
    ItemBarcode,
    OverrideComment,
    OverrideDueDate,
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FormField::PatronIdentifier => write!(f, "patron.identifier"),
            FormField::ItemBarcode => write!(f, "item.barcode"),
            FormField::OverrideComment => write!(f, "override.comment"),
            FormField::OverrideDueDate => write!(f, "override.dueDate"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Sound {
    Success,
    Error,
}

// How an item submission ended, from the point of view of the form that issued it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Settlement {
    Resolved,
    Rejected,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "modal", rename_all = "camelCase")]
pub(crate) enum Modal {
    PatronBlocked {
        reasons: Vec<String>,
        can_override: bool,
    },
    ProxyChoice {
        candidates: Vec<PatronDto>,
    },
    AwaitingPickup {
        count: usize,
    },
    ItemSelection {
        candidates: Vec<ItemDto>,
    },
    Multipiece {
        item: ItemDto,
    },
    CheckoutNotes {
        notes: Vec<CirculationNote>,
    },
    Error {
        messages: Vec<String>,
    },
    Override {
        reasons: Vec<OverrideReason>,
        messages: Vec<String>,
        loan_policy_name: Option<String>,
        requires_due_date: bool,
    },
    AddInfo {
        loan_id: String,
        kind: AddInfoKind,
    },
}

// Everything the workflow pushes towards the presentation layer.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub(crate) enum UiEffect {
    FieldError {
        field: FormField,
        message: String,
    },
    OpenModal {
        modal: Modal,
    },
    CloseModal,
    ClearField {
        field: FormField,
    },
    Focus {
        field: FormField,
    },
    Notify {
        sound: Sound,
    },
    Notice {
        message: String,
    },
    Alert {
        message: String,
    },
    Settled {
        settlement: Settlement,
    },
}

impl UiEffect {
    pub fn field_error(field: FormField, message: &str) -> UiEffect {
        UiEffect::FieldError { field, message: message.to_string() }
    }

    pub fn open(modal: Modal) -> UiEffect {
        UiEffect::OpenModal { modal }
    }

    pub fn clear(field: FormField) -> UiEffect {
        UiEffect::ClearField { field }
    }

    pub fn settled(settlement: Settlement) -> UiEffect {
        UiEffect::Settled { settlement }
    }
}

impl From<CheckoutError> for Vec<UiEffect> {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::MissingData { field, message } => {
                vec![UiEffect::FieldError { field, message }]
            }
            CheckoutError::NotFound { field, message } => {
                vec![UiEffect::FieldError { field, message }]
            }
            CheckoutError::Blocked { reasons, can_override } => {
                vec![UiEffect::open(Modal::PatronBlocked { reasons, can_override })]
            }
            CheckoutError::PolicyViolation { messages } => {
                vec![UiEffect::open(Modal::Error { messages })]
            }
            CheckoutError::TransportFailure { message } => {
                vec![UiEffect::Alert { message }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::CheckoutError;
    use crate::core::view::{FormField, Modal, UiEffect};

    #[tokio::test]
    async fn test_should_render_errors_as_effects() {
        let effects: Vec<UiEffect> = CheckoutError::missing_data(FormField::ItemBarcode, "required").into();
        assert_eq!(vec![UiEffect::field_error(FormField::ItemBarcode, "required")], effects);

        let effects: Vec<UiEffect> = CheckoutError::transport_failure("<html>").into();
        assert_eq!(vec![UiEffect::Alert { message: "<html>".to_string() }], effects);

        let effects: Vec<UiEffect> = CheckoutError::blocked(vec!["fines".to_string()], true).into();
        assert_eq!(vec![UiEffect::open(Modal::PatronBlocked { reasons: vec!["fines".to_string()], can_override: true })], effects);

        let effects: Vec<UiEffect> = CheckoutError::PolicyViolation { messages: vec!["x".to_string()] }.into();
        assert_eq!(vec![UiEffect::open(Modal::Error { messages: vec!["x".to_string()] })], effects);
    }

    #[tokio::test]
    async fn test_should_serialize_tagged_effects() {
        let json = serde_json::to_value(&UiEffect::clear(FormField::ItemBarcode)).expect("should serialize");
        assert_eq!("clearField", json["effect"]);
        assert_eq!("itemBarcode", json["field"]);
        let json = serde_json::to_value(&UiEffect::open(Modal::AwaitingPickup { count: 2 })).expect("should serialize");
        assert_eq!("openModal", json["effect"]);
        assert_eq!("awaitingPickup", json["modal"]["modal"]);
    }
}
