use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::checkout::domain::model::{PatronPair, ScannedItem};
use crate::checkout::domain::overrides::{OverrideInfo, StaffPermissions};
use crate::checkout::domain::workflow::{FlowContext, ItemFlow};
use crate::core::library::AddInfoKind;
use crate::core::view::UiEffect;
use crate::desk::timer::InactivityTimer;
use crate::patrons::domain::blocks::{borrowing_blocks, BlockSweep};
use crate::patrons::dto::{PatronBlock, PatronDto};
use crate::settings::CheckoutSettings;

// ActiveRecord remembers whose patron action session is open on the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ActiveRecord {
    patron_id: Option<String>,
}

impl ActiveRecord {
    pub(crate) fn patron_id(&self) -> Option<&str> {
        self.patron_id.as_deref()
    }

    pub(crate) fn select(&mut self, patron_id: &str) {
        self.patron_id = Some(patron_id.to_string());
    }

    pub(crate) fn take_patron_id(&mut self) -> Option<String> {
        self.patron_id.take()
    }
}

// PatronStage makes a pending proxy choice and a selected patron mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PatronStage {
    Empty,
    AwaitingProxyChoice {
        patron: PatronDto,
        // the patron first, then every sponsor
        candidates: Vec<PatronDto>,
    },
    Selected(PatronPair),
}

pub(crate) struct CheckoutSession {
    pub id: String,
    pub active: ActiveRecord,
    pub settings: CheckoutSettings,
    pub permissions: StaffPermissions,
    pub stage: PatronStage,
    // every block of the active patron as last fetched
    pub blocks: Vec<PatronBlock>,
    pub borrowing_blocks: Vec<PatronBlock>,
    pub block_override: Option<OverrideInfo>,
    // newest first
    pub scanned_items: Vec<ScannedItem>,
    pub item_flow: ItemFlow,
    pub timer: InactivityTimer,
    pub sweep: BlockSweep,
    pub pending_add_info: Option<AddInfoKind>,
    // effects produced by background ticks, handed out with the next response
    pub deferred: Vec<UiEffect>,
}

impl CheckoutSession {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            active: ActiveRecord::default(),
            settings: CheckoutSettings::default(),
            permissions: StaffPermissions::default(),
            stage: PatronStage::Empty,
            blocks: vec![],
            borrowing_blocks: vec![],
            block_override: None,
            scanned_items: vec![],
            item_flow: ItemFlow::Idle,
            timer: InactivityTimer::default(),
            sweep: BlockSweep::default(),
            pending_add_info: None,
            deferred: vec![],
        }
    }

    pub(crate) fn pair(&self) -> Option<&PatronPair> {
        match &self.stage {
            PatronStage::Selected(pair) => Some(pair),
            _ => None,
        }
    }

    pub(crate) fn set_blocks(&mut self, blocks: Vec<PatronBlock>, patron_id: &str, now: DateTime<Utc>) {
        self.borrowing_blocks = borrowing_blocks(&blocks, patron_id, now);
        self.blocks = blocks;
    }

    // Drops everything tied to the current patron. The item workflow is reset separately
    // so that a pending submission is settled first.
    pub(crate) fn clear_resources(&mut self) {
        self.scanned_items = vec![];
        self.stage = PatronStage::Empty;
        self.blocks = vec![];
        self.borrowing_blocks = vec![];
        self.block_override = None;
        self.pending_add_info = None;
        self.sweep.rearm();
    }

    pub(crate) fn flow_context<'a>(&'a self, service_point_id: &'a str, now: DateTime<Utc>) -> FlowContext<'a> {
        FlowContext {
            pair: self.pair(),
            borrowing_blocks: &self.borrowing_blocks,
            block_override: self.block_override.as_ref(),
            settings: &self.settings,
            permissions: &self.permissions,
            service_point_id,
            add_info: self.pending_add_info,
            now,
        }
    }
}
