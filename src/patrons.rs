use chrono::{DateTime, Utc};
use crate::core::domain::Identifiable;

pub mod domain;
pub mod dto;
pub mod factory;
pub mod identifiers;
pub mod repository;

pub(crate) trait Patron: Identifiable {
    fn is_active(&self) -> bool;
    fn is_expired(&self, now: DateTime<Utc>) -> bool;
    fn full_name(&self) -> String;
}
