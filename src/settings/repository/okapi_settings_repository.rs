use async_trait::async_trait;
use serde::Deserialize;
use crate::core::library::LibraryResult;
use crate::settings::{CheckoutSettings, SETTINGS_CONFIG_NAME, SETTINGS_MODULE};
use crate::settings::repository::SettingsRepository;
use crate::utils::cql;
use crate::utils::okapi::OkapiClient;

#[derive(Debug, Deserialize)]
struct ConfigEntry {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ConfigEntries {
    #[serde(default)]
    configs: Vec<ConfigEntry>,
}

pub(crate) struct OkapiSettingsRepository {
    client: OkapiClient,
}

impl OkapiSettingsRepository {
    pub(crate) fn new(client: OkapiClient) -> Self {
        Self {
            client,
        }
    }
}

pub(crate) fn settings_query() -> String {
    cql::all_of(&[cql::exact("module", SETTINGS_MODULE), cql::exact("configName", SETTINGS_CONFIG_NAME)])
}

// the entry value is itself a JSON document
fn settings_from(entries: ConfigEntries) -> LibraryResult<Option<CheckoutSettings>> {
    match entries.configs.first() {
        Some(entry) if !entry.value.trim().is_empty() => {
            Ok(Some(serde_json::from_str(entry.value.as_str())?))
        }
        _ => Ok(None),
    }
}

#[async_trait]
impl SettingsRepository for OkapiSettingsRepository {
    async fn load(&self) -> LibraryResult<Option<CheckoutSettings>> {
        let entries: ConfigEntries = self.client.get_json("/configurations/entries",
                                                          &[("query", settings_query())]).await?;
        settings_from(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::LibraryError;
    use crate::core::library::LibraryResult;
    use crate::settings::CheckoutSettings;
    use crate::settings::repository::okapi_settings_repository::{ConfigEntries, settings_from, settings_query};

    fn parse_entries(body: &str) -> LibraryResult<Option<CheckoutSettings>> {
        let entries: ConfigEntries = serde_json::from_str(body)?;
        settings_from(entries)
    }

    #[tokio::test]
    async fn test_should_build_settings_query() {
        assert_eq!(r#"(module=="CHECKOUT" and configName=="other_settings")"#, settings_query().as_str());
    }

    #[tokio::test]
    async fn test_should_parse_nested_value() {
        let body = r#"{"configs":[{"value":"{\"prefPatronIdentifier\":\"username\",\"wildcardLookupEnabled\":true}"}],"totalRecords":1}"#;
        let settings = parse_entries(body).expect("should parse").expect("should exist");
        assert!(settings.wildcard_lookup_enabled);
        assert_eq!("username", settings.pref_patron_identifier.to_string().as_str());
    }

    #[tokio::test]
    async fn test_should_default_when_missing() {
        assert_eq!(None, parse_entries(r#"{"configs":[]}"#).expect("should parse"));
    }

    #[tokio::test]
    async fn test_should_fail_on_malformed_value() {
        let res = parse_entries(r#"{"configs":[{"value":"not json"}]}"#);
        assert!(matches!(res, Err(LibraryError::Serialization { .. })));
    }
}
