use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::items::Item;

pub(crate) const CHECK_OUT_NOTE: &str = "Check out";

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CirculationNote {
    #[serde(default)]
    pub id: Option<String>,
    pub note_type: String,
    pub note: String,
    #[serde(default)]
    pub staff_only: bool,
}

impl CirculationNote {
    pub(crate) fn checkout(note: &str) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            note_type: CHECK_OUT_NOTE.to_string(),
            note: note.to_string(),
            staff_only: true,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct ItemStatus {
    pub name: String,
}

// ItemDto abstracts an inventory item as returned by the item directory.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemDto {
    pub id: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub call_number: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    // the backend stores piece counts as free text
    #[serde(default)]
    pub number_of_pieces: Option<String>,
    #[serde(default)]
    pub description_of_pieces: Option<String>,
    #[serde(default)]
    pub number_of_missing_pieces: Option<String>,
    #[serde(default)]
    pub missing_pieces: Option<String>,
    #[serde(default)]
    pub circulation_notes: Vec<CirculationNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_loan_type_id: Option<String>,
}

impl ItemDto {
    pub(crate) fn new(barcode: &str, title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            barcode: Some(barcode.to_string()),
            title: Some(title.to_string()),
            call_number: None,
            status: Some(ItemStatus { name: "Available".to_string() }),
            number_of_pieces: None,
            description_of_pieces: None,
            number_of_missing_pieces: None,
            missing_pieces: None,
            circulation_notes: vec![],
            permanent_loan_type_id: None,
        }
    }

    pub(crate) fn with_pieces(mut self, number_of_pieces: &str) -> Self {
        self.number_of_pieces = Some(number_of_pieces.to_string());
        self
    }

    pub(crate) fn with_note(mut self, note: CirculationNote) -> Self {
        self.circulation_notes.push(note);
        self
    }
}

impl Identifiable for ItemDto {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

impl Item for ItemDto {
    fn is_multipiece(&self) -> bool {
        let pieces = self.number_of_pieces.as_deref()
            .and_then(|n| n.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let missing = self.number_of_missing_pieces.as_deref()
            .map(|n| n.trim().parse::<i64>().map(|c| c > 0).unwrap_or(!n.trim().is_empty()))
            .unwrap_or(false);
        pieces > 1 || present(&self.description_of_pieces) || missing || present(&self.missing_pieces)
    }

    fn checkout_notes(&self) -> Vec<CirculationNote> {
        self.circulation_notes.iter()
            .filter(|n| n.note_type == CHECK_OUT_NOTE)
            .cloned()
            .collect()
    }

    fn barcode(&self) -> Option<String> {
        self.barcode.clone()
    }
}
