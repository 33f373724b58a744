use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::BlockKind;
use crate::patrons::Patron;
use crate::utils::date::opt_serializer;

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersonalDto {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// PatronDto abstracts a directory user that can borrow items.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatronDto {
    pub id: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub external_system_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub patron_group: Option<String>,
    #[serde(default, with = "opt_serializer", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub personal: Option<PersonalDto>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, Value>,
}

fn default_active() -> bool {
    true
}

impl PatronDto {
    pub(crate) fn new(barcode: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            barcode: Some(barcode.to_string()),
            username: None,
            external_system_id: None,
            active: true,
            patron_group: None,
            expiration_date: None,
            personal: None,
            custom_fields: BTreeMap::new(),
        }
    }

    pub(crate) fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.personal = Some(PersonalDto {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email: self.personal.and_then(|p| p.email),
        });
        self
    }

    pub(crate) fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

impl Patron for PatronDto {
    fn is_active(&self) -> bool {
        self.active
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.map(|d| d < now).unwrap_or(false)
    }

    fn full_name(&self) -> String {
        let personal = self.personal.clone().unwrap_or_default();
        let name = [personal.first_name, personal.last_name]
            .into_iter()
            .flatten()
            .collect::<Vec<String>>()
            .join(" ");
        if name.is_empty() {
            self.username.clone().unwrap_or_else(|| self.id.to_string())
        } else {
            name
        }
    }
}

// ProxyForDto links a proxy user to the sponsor it may borrow for.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProxyForDto {
    pub id: String,
    // the sponsor
    pub user_id: String,
    pub proxy_user_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "opt_serializer", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl ProxyForDto {
    pub(crate) fn new(sponsor_id: &str, proxy_user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: sponsor_id.to_string(),
            proxy_user_id: proxy_user_id.to_string(),
            status: Some("Active".to_string()),
            expiration_date: None,
        }
    }

    pub(crate) fn is_usable(&self, now: DateTime<Utc>) -> bool {
        let inactive = self.status.as_deref()
            .map(|s| s.eq_ignore_ascii_case("inactive"))
            .unwrap_or(false);
        let expired = self.expiration_date.map(|d| d < now).unwrap_or(false);
        !inactive && !expired
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManualBlockDto {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub patron_message: Option<String>,
    #[serde(default)]
    pub borrowing: bool,
    #[serde(default)]
    pub renewals: bool,
    #[serde(default)]
    pub requests: bool,
    #[serde(default, with = "opt_serializer", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl ManualBlockDto {
    pub(crate) fn borrowing(user_id: &str, desc: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            desc: Some(desc.to_string()),
            patron_message: None,
            borrowing: true,
            renewals: false,
            requests: false,
            expiration_date: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutomatedBlockDto {
    #[serde(default)]
    pub patron_block_condition_id: Option<String>,
    #[serde(default)]
    pub block_borrowing: bool,
    #[serde(default)]
    pub block_renewals: bool,
    #[serde(default)]
    pub block_requests: bool,
    #[serde(default)]
    pub message: String,
}

// PatronBlock is the unified view of manual and automated blocks.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatronBlock {
    // only manual blocks carry an id
    pub id: Option<String>,
    pub user_id: String,
    pub kind: BlockKind,
    pub reason: String,
    pub borrowing: bool,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl PatronBlock {
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.kind == BlockKind::Manual && self.expiration_date.map(|d| d < now).unwrap_or(false)
    }
}

impl From<&ManualBlockDto> for PatronBlock {
    fn from(other: &ManualBlockDto) -> Self {
        Self {
            id: Some(other.id.to_string()),
            user_id: other.user_id.to_string(),
            kind: BlockKind::Manual,
            reason: other.desc.clone().or_else(|| other.patron_message.clone()).unwrap_or_default(),
            borrowing: other.borrowing,
            expiration_date: other.expiration_date,
        }
    }
}

impl PatronBlock {
    pub(crate) fn from_automated(user_id: &str, other: &AutomatedBlockDto) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            kind: BlockKind::Automated,
            reason: other.message.to_string(),
            borrowing: other.block_borrowing,
            expiration_date: None,
        }
    }
}
