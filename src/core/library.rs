use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::core::view::FormField;

#[derive(Debug)]
pub enum LibraryError {
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    NotFound {
        message: String,
    },
    // The circulation backend answered with a structured `{errors: [...]}` body, which is
    // how it reports policy violations and blocks for a checkout.
    Rejected {
        status: u16,
        errors: Vec<BackendError>,
    },
    // Non-2xx response whose body is not structured JSON, or a failure to reach the
    // backend at all. The status is absent when no response was received.
    Transport {
        status: Option<u16>,
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn access_denied(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn rejected(status: u16, errors: Vec<BackendError>) -> LibraryError {
        LibraryError::Rejected { status, errors }
    }

    pub fn transport(status: Option<u16>, message: &str) -> LibraryError {
        LibraryError::Transport { status, message: message.to_string() }
    }

    // maps a failed response onto the error taxonomy; structured bodies win over status codes
    pub fn from_response(status: u16, body: &str) -> LibraryError {
        if let Ok(res) = serde_json::from_str::<BackendErrors>(body) {
            if !res.errors.is_empty() {
                return LibraryError::rejected(status, res.errors);
            }
        }
        match status {
            401 | 403 => LibraryError::access_denied(
                format!("access-denied error {:?}", body).as_str(), Some(status.to_string())),
            404 => LibraryError::not_found(
                format!("not found error {:?}", body).as_str()),
            _ => LibraryError::transport(Some(status), body),
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::AccessDenied { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Rejected { .. } => { false }
            LibraryError::Transport { status, .. } => {
                status.map(|s| s >= 500).unwrap_or(true)
            }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::AccessDenied { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Rejected { status, errors } => {
                let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                write!(f, "{} {}", status, messages.join("; "))
            }
            LibraryError::Transport { status, message } => {
                write!(f, "{} {:?}", message, status)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for repositories and services.
pub type LibraryResult<T> = Result<T, LibraryError>;

// A single entry of the backend `{errors: [...]}` body.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub parameters: Vec<BackendParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridable_block: Option<OverridableBlock>,
}

impl BackendError {
    pub fn new(message: &str, code: Option<&str>) -> Self {
        Self {
            message: message.to_string(),
            code: code.map(str::to_string),
            parameters: vec![],
            overridable_block: None,
        }
    }

    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.push(BackendParameter { key: key.to_string(), value: Some(value.to_string()) });
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.iter()
            .find(|p| p.key == key)
            .and_then(|p| p.value.as_deref())
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BackendParameter {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridableBlock {
    pub name: String,
    #[serde(default)]
    pub missing_override_permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BackendErrors {
    #[serde(default)]
    errors: Vec<BackendError>,
}

// CheckoutError is the workflow-level taxonomy. None of these escape the desk: each one is
// turned into UI state (a field error, a modal or an alert).
#[derive(Debug, PartialEq, Clone)]
pub enum CheckoutError {
    MissingData {
        field: FormField,
        message: String,
    },
    NotFound {
        field: FormField,
        message: String,
    },
    Blocked {
        reasons: Vec<String>,
        can_override: bool,
    },
    PolicyViolation {
        messages: Vec<String>,
    },
    TransportFailure {
        message: String,
    },
}

impl CheckoutError {
    pub fn missing_data(field: FormField, message: &str) -> CheckoutError {
        CheckoutError::MissingData { field, message: message.to_string() }
    }

    pub fn not_found(field: FormField, message: &str) -> CheckoutError {
        CheckoutError::NotFound { field, message: message.to_string() }
    }

    pub fn blocked(reasons: Vec<String>, can_override: bool) -> CheckoutError {
        CheckoutError::Blocked { reasons, can_override }
    }

    pub fn transport_failure(message: &str) -> CheckoutError {
        CheckoutError::TransportFailure { message: message.to_string() }
    }
}

impl Display for CheckoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutError::MissingData { field, message } => {
                write!(f, "{}: {}", field, message)
            }
            CheckoutError::NotFound { field, message } => {
                write!(f, "{}: {}", field, message)
            }
            CheckoutError::Blocked { reasons, .. } => {
                write!(f, "blocked: {}", reasons.join("; "))
            }
            CheckoutError::PolicyViolation { messages } => {
                write!(f, "policy violation: {}", messages.join("; "))
            }
            CheckoutError::TransportFailure { message } => {
                write!(f, "transport failure: {}", message)
            }
        }
    }
}

// It defines abstraction for offset-paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // offset of the first record
    pub offset: usize,
    // page size requested
    pub limit: usize,
    // total reported by the backend, if any
    pub total_records: Option<usize>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(offset: usize, limit: usize,
                      total_records: Option<usize>, records: Vec<T>) -> Self {
        PaginatedResult {
            offset,
            limit,
            total_records,
            records,
        }
    }

    // A full page means there may be more records behind it.
    pub fn next_offset(&self) -> Option<usize> {
        if self.limit > 0 && self.records.len() >= self.limit {
            Some(self.offset + self.limit)
        } else {
            None
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub(crate) enum BlockKind {
    Manual,
    Automated,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub(crate) enum AddInfoKind {
    PatronInfo,
    StaffInfo,
}

impl AddInfoKind {
    // loan action name recorded by the backend
    pub fn action(&self) -> &'static str {
        match self {
            AddInfoKind::PatronInfo => "patronInfoAdded",
            AddInfoKind::StaffInfo => "staffInfoAdded",
        }
    }
}

impl From<String> for AddInfoKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "StaffInfo" | "staffInfoAdded" => AddInfoKind::StaffInfo,
            _ => AddInfoKind::PatronInfo,
        }
    }
}

impl Display for AddInfoKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AddInfoKind::PatronInfo => write!(f, "PatronInfo"),
            AddInfoKind::StaffInfo => write!(f, "StaffInfo"),
        }
    }
}
