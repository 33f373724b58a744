//! Patron identifier resolution.
//!
//! A scanned value could be any of the identifiers the library has configured, so a
//! lookup tries every configured kind at once and the first preference wins when a
//! record has to be turned back into a form value.

use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::core::library::CheckoutError;
use crate::core::view::FormField;
use crate::patrons::dto::PatronDto;
use crate::utils::cql;

const CUSTOM_FIELD_PREFIX: &str = "customFields.";

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub(crate) enum IdentifierKind {
    Barcode,
    Username,
    ExternalSystemId,
    Id,
    Email,
    CustomField(String),
}

impl IdentifierKind {
    pub fn parse(value: &str) -> Option<IdentifierKind> {
        let value = value.trim();
        match value {
            "barcode" => Some(IdentifierKind::Barcode),
            "username" => Some(IdentifierKind::Username),
            "externalSystemId" => Some(IdentifierKind::ExternalSystemId),
            "id" => Some(IdentifierKind::Id),
            "email" | "personal.email" => Some(IdentifierKind::Email),
            _ => value.strip_prefix(CUSTOM_FIELD_PREFIX)
                .filter(|r| !r.is_empty())
                .map(|r| IdentifierKind::CustomField(r.to_string())),
        }
    }

    // index name used in the user directory query
    pub fn query_key(&self) -> String {
        match self {
            IdentifierKind::Barcode => "barcode".to_string(),
            IdentifierKind::Username => "username".to_string(),
            IdentifierKind::ExternalSystemId => "externalSystemId".to_string(),
            IdentifierKind::Id => "id".to_string(),
            IdentifierKind::Email => "personal.email".to_string(),
            IdentifierKind::CustomField(ref_id) => format!("{}{}", CUSTOM_FIELD_PREFIX, ref_id),
        }
    }

    pub fn label(&self) -> String {
        match self {
            IdentifierKind::Barcode => "barcode".to_string(),
            IdentifierKind::Username => "username".to_string(),
            IdentifierKind::ExternalSystemId => "external system ID".to_string(),
            IdentifierKind::Id => "record number".to_string(),
            IdentifierKind::Email => "email".to_string(),
            IdentifierKind::CustomField(ref_id) => ref_id.to_string(),
        }
    }

    pub fn value_of(&self, patron: &PatronDto) -> Option<String> {
        let value = match self {
            IdentifierKind::Barcode => patron.barcode.clone(),
            IdentifierKind::Username => patron.username.clone(),
            IdentifierKind::ExternalSystemId => patron.external_system_id.clone(),
            IdentifierKind::Id => Some(patron.id.to_string()),
            IdentifierKind::Email => patron.personal.as_ref().and_then(|p| p.email.clone()),
            IdentifierKind::CustomField(ref_id) => patron.custom_fields.get(ref_id).and_then(|v| {
                match v {
                    serde_json::Value::String(s) => Some(s.to_string()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }
            }),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

impl Display for IdentifierKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IdentifierKind::Email => write!(f, "email"),
            other => write!(f, "{}", other.query_key()),
        }
    }
}

// Ordered identifier preference, stored by the backend as "barcode,username".
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct IdentifierPreference(Vec<IdentifierKind>);

impl IdentifierPreference {
    pub fn new(kinds: Vec<IdentifierKind>) -> Self {
        if kinds.is_empty() {
            Self::default()
        } else {
            Self(kinds)
        }
    }

    pub fn from_setting(value: &str) -> Self {
        Self::new(value.split(',').filter_map(IdentifierKind::parse).collect())
    }

    pub fn kinds(&self) -> &[IdentifierKind] {
        &self.0
    }

    pub fn primary(&self) -> &IdentifierKind {
        // never empty, see new()
        &self.0[0]
    }

    pub fn labels(&self) -> String {
        self.0.iter().map(IdentifierKind::label).collect::<Vec<String>>().join(" or ")
    }
}

impl Default for IdentifierPreference {
    fn default() -> Self {
        Self(vec![IdentifierKind::Barcode])
    }
}

impl Display for IdentifierPreference {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let keys: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "{}", keys.join(","))
    }
}

impl Serialize for IdentifierPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IdentifierPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: String = Deserialize::deserialize(deserializer)?;
        Ok(IdentifierPreference::from_setting(&value))
    }
}

// Disjunctive directory query: one clause per preferred kind, in preference order.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct IdentifierQuery {
    pub value: String,
    pub clauses: Vec<IdentifierKind>,
}

impl IdentifierQuery {
    pub fn to_cql(&self) -> String {
        let clauses: Vec<String> = self.clauses.iter()
            .map(|k| cql::exact(k.query_key().as_str(), self.value.as_str()))
            .collect();
        cql::any_of(&clauses)
    }

    pub fn matches(&self, patron: &PatronDto) -> bool {
        self.clauses.iter().any(|k| k.value_of(patron).as_deref() == Some(self.value.as_str()))
    }
}

pub(crate) fn resolve_query(preference: &IdentifierPreference, raw: &str) -> IdentifierQuery {
    IdentifierQuery {
        value: raw.trim().to_string(),
        clauses: preference.kinds().to_vec(),
    }
}

// Picks the identifier to put back into the patron form for a record chosen by staff.
pub(crate) fn pick_identifier(patron: &PatronDto, preference: &IdentifierPreference) -> Result<(IdentifierKind, String), CheckoutError> {
    for kind in preference.kinds() {
        if let Some(value) = kind.value_of(patron) {
            return Ok((kind.clone(), value));
        }
    }
    Err(CheckoutError::missing_data(FormField::PatronIdentifier,
                                    format!("Patron is missing the {} identifier", preference.primary().label()).as_str()))
}

pub(crate) fn not_found_message(preference: &IdentifierPreference) -> String {
    format!("User with this {} does not exist", preference.labels())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::core::library::CheckoutError;
    use crate::core::view::FormField;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::identifiers::{IdentifierKind, IdentifierPreference, not_found_message, pick_identifier, resolve_query};

    #[tokio::test]
    async fn test_should_default_to_barcode() {
        assert_eq!(IdentifierPreference::default(), IdentifierPreference::from_setting(""));
        assert_eq!(IdentifierPreference::default(), IdentifierPreference::from_setting("unknown"));
        let query = resolve_query(&IdentifierPreference::default(), " 123456 ");
        assert_eq!(r#"(barcode=="123456")"#, query.to_cql().as_str());
    }

    #[tokio::test]
    async fn test_should_build_one_clause_per_kind_in_order() {
        let preference = IdentifierPreference::from_setting("username,barcode,externalSystemId");
        let query = resolve_query(&preference, "abc");
        assert_eq!(3, query.clauses.len());
        assert_eq!(vec![IdentifierKind::Username, IdentifierKind::Barcode, IdentifierKind::ExternalSystemId], query.clauses);
        assert_eq!(r#"(username=="abc" or barcode=="abc" or externalSystemId=="abc")"#, query.to_cql().as_str());
        assert_eq!(2, query.to_cql().matches(" or ").count());
    }

    #[tokio::test]
    async fn test_should_parse_custom_fields() {
        let preference = IdentifierPreference::from_setting("barcode,customFields.libraryCard");
        assert_eq!(&IdentifierKind::CustomField("libraryCard".to_string()), &preference.kinds()[1]);
        assert_eq!("barcode,customFields.libraryCard", preference.to_string().as_str());
    }

    #[tokio::test]
    async fn test_should_match_records() {
        let mut patron = PatronDto::new("123").with_username("jd");
        patron.custom_fields.insert("libraryCard".to_string(), json!(42));
        let preference = IdentifierPreference::from_setting("username,customFields.libraryCard");
        assert!(resolve_query(&preference, "jd").matches(&patron));
        assert!(resolve_query(&preference, "42").matches(&patron));
        assert!(!resolve_query(&preference, "123").matches(&patron));
    }

    #[tokio::test]
    async fn test_should_pick_first_present_identifier() {
        let patron = PatronDto {
            barcode: None,
            ..PatronDto::new("x").with_username("jd")
        };
        let preference = IdentifierPreference::from_setting("barcode,username");
        let (kind, value) = pick_identifier(&patron, &preference).expect("should pick");
        assert_eq!(IdentifierKind::Username, kind);
        assert_eq!("jd", value.as_str());
    }

    #[tokio::test]
    async fn test_should_report_missing_identifier() {
        let patron = PatronDto { barcode: None, ..PatronDto::new("x") };
        let res = pick_identifier(&patron, &IdentifierPreference::default());
        assert!(matches!(res, Err(CheckoutError::MissingData { field: FormField::PatronIdentifier, message: _ })));
    }

    #[tokio::test]
    async fn test_should_name_kinds_in_not_found_message() {
        assert_eq!("User with this barcode does not exist",
                   not_found_message(&IdentifierPreference::default()).as_str());
        assert_eq!("User with this barcode or username does not exist",
                   not_found_message(&IdentifierPreference::from_setting("barcode,username")).as_str());
    }
}
