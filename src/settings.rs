use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::patrons::identifiers::{IdentifierKind, IdentifierPreference};

pub mod factory;
pub mod repository;

pub(crate) const SETTINGS_MODULE: &str = "CHECKOUT";
pub(crate) const SETTINGS_CONFIG_NAME: &str = "other_settings";

// CheckoutSettings holds the tenant-wide check-out behavior stored in the configuration store.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CheckoutSettings {
    pub pref_patron_identifier: IdentifierPreference,
    pub checkout_timeout: bool,
    // minutes
    pub checkout_timeout_duration: u64,
    pub audio_alerts_enabled: bool,
    pub audio_theme: String,
    pub wildcard_lookup_enabled: bool,
    pub use_custom_fields_as_identifiers: bool,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            pref_patron_identifier: IdentifierPreference::default(),
            checkout_timeout: true,
            checkout_timeout_duration: 3,
            audio_alerts_enabled: false,
            audio_theme: "classic".to_string(),
            wildcard_lookup_enabled: false,
            use_custom_fields_as_identifiers: false,
        }
    }
}

impl CheckoutSettings {
    // inactivity period after which the desk ends the session, if enabled
    pub fn timeout(&self) -> Option<Duration> {
        if self.checkout_timeout && self.checkout_timeout_duration > 0 {
            Some(Duration::from_secs(self.checkout_timeout_duration * 60))
        } else {
            None
        }
    }

    // custom fields only take part in lookups when the tenant enabled them
    pub fn identifier_preference(&self) -> IdentifierPreference {
        if self.use_custom_fields_as_identifiers {
            return self.pref_patron_identifier.clone();
        }
        IdentifierPreference::new(self.pref_patron_identifier.kinds().iter()
            .filter(|k| !matches!(k, IdentifierKind::CustomField(_)))
            .cloned()
            .collect())
    }

    pub(crate) fn with_preference(mut self, value: &str) -> Self {
        self.pref_patron_identifier = IdentifierPreference::from_setting(value);
        self
    }
}
