pub mod service;

use std::time::Instant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::checkout::domain::model::ScannedItem;
use crate::checkout::domain::overrides::{OverrideDraft, StaffPermissions};
use crate::core::library::AddInfoKind;
use crate::core::view::UiEffect;
use crate::patrons::dto::PatronDto;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum ModalDecision {
    Confirm,
    Cancel,
    Dismiss,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum OverrideScope {
    // the override modal of the current item
    Item,
    // the patron-block modal
    PatronBlock,
}

// DeskView is the read model of one desk the presentation layer renders from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeskView {
    pub id: String,
    pub patron: Option<PatronDto>,
    pub borrower: Option<PatronDto>,
    // identifier shown in the patron form
    pub patron_identifier: Option<String>,
    pub proxy_candidates: Vec<PatronDto>,
    pub block_reasons: Vec<String>,
    pub block_overridden: bool,
    pub scanned_items: Vec<ScannedItem>,
    pub item_state: String,
    pub pending_add_info: Option<AddInfoKind>,
    pub timer_armed: bool,
}

// DeskOutcome is what every desk operation answers with.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeskOutcome {
    pub effects: Vec<UiEffect>,
    pub view: DeskView,
}

impl DeskOutcome {
    pub fn new(effects: Vec<UiEffect>, view: DeskView) -> Self {
        Self {
            effects,
            view,
        }
    }
}

// CheckoutDesk drives one staff workstation: the selected patron, the item workflow and
// the inactivity timer. Operations never fail; every problem comes back as UI effects.
#[async_trait]
pub(crate) trait CheckoutDesk: Sync + Send {
    fn id(&self) -> String;

    async fn open(&mut self, permissions: StaffPermissions) -> Vec<UiEffect>;

    // reloads settings, reconfigures the timer and sweeps expired blocks again
    async fn refresh_settings(&mut self) -> Vec<UiEffect>;

    async fn resolve_patron(&mut self, raw: &str) -> Vec<UiEffect>;

    async fn select_patron(&mut self, patron_id: &str) -> Vec<UiEffect>;

    async fn submit_item(&mut self, barcode: &str) -> Vec<UiEffect>;

    async fn select_item(&mut self, item_id: &str) -> Vec<UiEffect>;

    async fn resolve_modal(&mut self, decision: ModalDecision) -> Vec<UiEffect>;

    async fn submit_override(&mut self, scope: OverrideScope, draft: OverrideDraft) -> Vec<UiEffect>;

    // the next successful checkout opens the add-info modal for its loan
    fn queue_add_info(&mut self, kind: AddInfoKind) -> Vec<UiEffect>;

    async fn add_info(&mut self, loan_id: &str, kind: AddInfoKind, comment: &str) -> Vec<UiEffect>;

    async fn end_session(&mut self) -> Vec<UiEffect>;

    // Counts as activity for the inactivity timer and hands out effects produced by
    // background ticks since the last request.
    fn register_activity(&mut self, now: Instant) -> Vec<UiEffect>;

    async fn tick(&mut self, now: Instant);

    fn view(&self) -> DeskView;
}
