use crate::core::domain::Identifiable;
use crate::items::dto::CirculationNote;

pub mod domain;
pub mod dto;
pub mod factory;
pub mod repository;

pub(crate) trait Item: Identifiable {
    fn is_multipiece(&self) -> bool;
    fn checkout_notes(&self) -> Vec<CirculationNote>;
    fn barcode(&self) -> Option<String>;
}
