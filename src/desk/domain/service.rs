use std::collections::VecDeque;
use std::time::Instant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::checkout::domain::CheckoutService;
use crate::checkout::domain::overrides::{OverrideDraft, OverrideReason, StaffPermissions};
use crate::checkout::domain::workflow::{FlowEffect, FlowEvent, ItemFlow, transition};
use crate::checkout::domain::model::PatronPair;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{AddInfoKind, CheckoutError, LibraryError};
use crate::core::view::{FormField, Modal, UiEffect};
use crate::desk::domain::{CheckoutDesk, DeskView, ModalDecision, OverrideScope};
use crate::desk::session::{CheckoutSession, PatronStage};
use crate::gateway::events::EventPublisher;
use crate::items::domain::ItemService;
use crate::patrons::domain::blocks::block_reasons;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::PatronDto;
use crate::patrons::identifiers::{not_found_message, pick_identifier, resolve_query};
use crate::patrons::Patron;
use crate::settings::repository::SettingsRepository;

const REQUIRED: &str = "Please fill this in to continue";

pub(crate) struct CheckoutDeskImpl {
    service_point_id: String,
    session: CheckoutSession,
    settings_repository: Box<dyn SettingsRepository>,
    patron_service: Box<dyn PatronService>,
    item_service: Box<dyn ItemService>,
    checkout_service: Box<dyn CheckoutService>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CheckoutDeskImpl {
    pub(crate) fn new(config: &Configuration,
                      settings_repository: Box<dyn SettingsRepository>,
                      patron_service: Box<dyn PatronService>,
                      item_service: Box<dyn ItemService>,
                      checkout_service: Box<dyn CheckoutService>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            service_point_id: config.service_point_id.to_string(),
            session: CheckoutSession::new(),
            settings_repository,
            patron_service,
            item_service,
            checkout_service,
            events_publisher,
        }
    }

    // Feeds `event` to the item workflow and runs the effects it asks for until the
    // workflow stops asking. Only the UI effects are returned.
    async fn drive(&mut self, event: FlowEvent) -> Vec<UiEffect> {
        let mut ui = vec![];
        let mut events = VecDeque::from([event]);
        while let Some(event) = events.pop_front() {
            let flow = std::mem::replace(&mut self.session.item_flow, ItemFlow::Idle);
            let from = flow.name();
            let next = {
                let ctx = self.session.flow_context(self.service_point_id.as_str(), Utc::now());
                transition(flow, event, &ctx)
            };
            tracing::debug!(desk = %self.session.id, from, to = next.flow.name(), "item workflow transition");
            self.session.item_flow = next.flow;

            for effect in next.effects {
                match effect {
                    FlowEffect::LookupItems { barcode, wildcard } => {
                        match self.item_service.find_items_by_barcode(barcode.as_str(), wildcard).await {
                            Ok(items) => events.push_back(FlowEvent::LookupCompleted { items }),
                            Err(err) => {
                                tracing::warn!(desk = %self.session.id, barcode = %barcode, error = %err, "item lookup failed");
                                events.push_back(FlowEvent::LookupFailed { message: err.to_string() });
                            }
                        }
                    }
                    FlowEffect::Commit(req) => {
                        match self.checkout_service.checkout(&req).await {
                            Ok(loan) => events.push_back(FlowEvent::CheckoutSucceeded { loan }),
                            Err(error) => {
                                tracing::info!(desk = %self.session.id, barcode = %req.item_barcode, error = %error, "checkout refused");
                                events.push_back(FlowEvent::CheckoutFailed { error });
                            }
                        }
                    }
                    FlowEffect::LoadPolicy { policy_id } => {
                        // the loan stands even when its policy cannot be shown
                        let policy = match self.checkout_service.find_loan_policy(policy_id.as_str()).await {
                            Ok(policy) => Some(policy),
                            Err(err) => {
                                tracing::warn!(desk = %self.session.id, policy_id = %policy_id, error = %err, "failed to load loan policy");
                                None
                            }
                        };
                        events.push_back(FlowEvent::PolicyLoaded { policy });
                    }
                    FlowEffect::Record(scanned) => {
                        let mut scanned_items = Vec::with_capacity(self.session.scanned_items.len() + 1);
                        scanned_items.push(scanned);
                        scanned_items.extend(self.session.scanned_items.iter().cloned());
                        self.session.scanned_items = scanned_items;
                        self.session.pending_add_info = None;
                    }
                    FlowEffect::RetainBlockOverride(info) => {
                        self.session.block_override = Some(info);
                    }
                    FlowEffect::Ui(effect) => ui.push(effect),
                }
            }
        }
        ui
    }

    async fn reload_settings(&mut self) {
        match self.settings_repository.load().await {
            Ok(Some(settings)) => self.session.settings = settings,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(desk = %self.session.id, error = %err, "failed to load checkout settings, keeping current ones");
            }
        }
        self.session.timer.configure(self.session.settings.timeout(), Instant::now());
    }

    // Fetches the blocks of `patron_id` and deletes the expired manual ones the sweep
    // hands out. Lookup failures leave the patron unblocked.
    async fn load_blocks(&mut self, patron_id: &str, now: DateTime<Utc>) {
        let blocks = match self.patron_service.find_blocks(patron_id).await {
            Ok(blocks) => blocks,
            Err(err) => {
                tracing::warn!(desk = %self.session.id, patron_id, error = %err, "failed to load patron blocks");
                vec![]
            }
        };
        for id in self.session.sweep.expired_to_delete(&blocks, now) {
            match self.patron_service.delete_block(id.as_str()).await {
                Ok(_) => tracing::info!(desk = %self.session.id, block_id = %id, "expired block deleted"),
                Err(err) => tracing::warn!(desk = %self.session.id, block_id = %id, error = %err, "failed to delete expired block"),
            }
        }
        self.session.set_blocks(blocks, patron_id, now);
    }

    fn block_modal(&self) -> Vec<UiEffect> {
        if self.session.borrowing_blocks.is_empty() || self.session.block_override.is_some() {
            return vec![];
        }
        CheckoutError::blocked(block_reasons(&self.session.borrowing_blocks),
                               self.session.permissions.can_override(OverrideReason::PatronBlock)).into()
    }

    async fn select_self(&mut self, patron: PatronDto) -> Vec<UiEffect> {
        let mut effects = vec![];
        match self.patron_service.count_awaiting_pickup(patron.id.as_str()).await {
            Ok(count) if count > 0 => effects.push(UiEffect::open(Modal::AwaitingPickup { count })),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(desk = %self.session.id, patron_id = %patron.id, error = %err, "failed to count requests awaiting pickup");
            }
        }
        self.session.stage = PatronStage::Selected(PatronPair::of(patron));
        effects.push(UiEffect::Focus { field: FormField::ItemBarcode });
        effects
    }

    async fn publish_session_end(&mut self) {
        let patron_id = match self.session.active.take_patron_id() {
            Some(patron_id) => patron_id,
            None => return,
        };
        let event = match DomainEvent::session_ended(patron_id.as_str()) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(desk = %self.session.id, patron_id = %patron_id, error = %err, "failed to build session end event");
                return;
            }
        };
        if let Err(err) = self.events_publisher.publish(&event).await {
            tracing::warn!(desk = %self.session.id, patron_id = %patron_id, error = %err, "failed to end patron action session");
        }
    }
}

fn alert(err: &LibraryError) -> Vec<UiEffect> {
    CheckoutError::transport_failure(err.to_string().as_str()).into()
}

#[async_trait]
impl CheckoutDesk for CheckoutDeskImpl {
    fn id(&self) -> String {
        self.session.id.to_string()
    }

    async fn open(&mut self, permissions: StaffPermissions) -> Vec<UiEffect> {
        self.session.permissions = permissions;
        self.reload_settings().await;
        tracing::info!(desk = %self.session.id, service_point_id = %self.service_point_id, "desk opened");
        vec![UiEffect::Focus { field: FormField::PatronIdentifier }]
    }

    async fn refresh_settings(&mut self) -> Vec<UiEffect> {
        self.reload_settings().await;
        if let Some(patron_id) = self.session.active.patron_id().map(str::to_string) {
            self.load_blocks(patron_id.as_str(), Utc::now()).await;
        }
        vec![]
    }

    async fn resolve_patron(&mut self, raw: &str) -> Vec<UiEffect> {
        let raw = raw.trim();
        if raw.is_empty() {
            return CheckoutError::missing_data(FormField::PatronIdentifier, REQUIRED).into();
        }
        let mut effects = self.drive(FlowEvent::Reset).await;
        self.session.clear_resources();

        let preference = self.session.settings.identifier_preference();
        let query = resolve_query(&preference, raw);
        let patron = match self.patron_service.find_patrons(&query).await {
            Ok(patrons) => patrons.into_iter().next(),
            Err(err) => {
                tracing::warn!(desk = %self.session.id, error = %err, "patron lookup failed");
                effects.extend(alert(&err));
                return effects;
            }
        };
        let patron = match patron {
            Some(patron) => patron,
            None => {
                let err = CheckoutError::not_found(FormField::PatronIdentifier, not_found_message(&preference).as_str());
                effects.extend(Vec::<UiEffect>::from(err));
                return effects;
            }
        };

        let now = Utc::now();
        self.session.active.select(patron.id.as_str());
        self.load_blocks(patron.id.as_str(), now).await;
        effects.extend(self.block_modal());
        if !patron.is_active() {
            effects.push(UiEffect::Notice { message: format!("{} has an inactive account", patron.full_name()) });
        } else if patron.is_expired(now) {
            effects.push(UiEffect::Notice { message: format!("{} has an expired account", patron.full_name()) });
        }

        let sponsors = match self.patron_service.find_sponsors(patron.id.as_str(), now).await {
            Ok(sponsors) => sponsors,
            Err(err) => {
                tracing::warn!(desk = %self.session.id, patron_id = %patron.id, error = %err, "failed to load sponsors");
                vec![]
            }
        };
        if sponsors.is_empty() {
            effects.extend(self.select_self(patron).await);
        } else {
            let mut candidates = vec![patron.clone()];
            candidates.extend(sponsors);
            effects.push(UiEffect::open(Modal::ProxyChoice { candidates: candidates.clone() }));
            self.session.stage = PatronStage::AwaitingProxyChoice { patron, candidates };
        }
        effects
    }

    async fn select_patron(&mut self, patron_id: &str) -> Vec<UiEffect> {
        let (patron, chosen) = match &self.session.stage {
            PatronStage::AwaitingProxyChoice { patron, candidates } => {
                match candidates.iter().find(|c| c.id == patron_id) {
                    Some(chosen) => (patron.clone(), chosen.clone()),
                    None => return vec![],
                }
            }
            _ => {
                tracing::debug!(desk = %self.session.id, patron_id, "no proxy choice pending");
                return vec![];
            }
        };

        let mut effects = vec![UiEffect::CloseModal];
        if chosen.id == patron.id {
            effects.extend(self.select_self(patron).await);
            return effects;
        }
        self.session.active.select(chosen.id.as_str());
        self.load_blocks(chosen.id.as_str(), Utc::now()).await;
        effects.extend(self.block_modal());
        self.session.stage = PatronStage::Selected(PatronPair::proxied(patron, chosen));
        effects.push(UiEffect::Focus { field: FormField::ItemBarcode });
        effects
    }

    async fn submit_item(&mut self, barcode: &str) -> Vec<UiEffect> {
        self.drive(FlowEvent::Submitted { barcode: barcode.to_string() }).await
    }

    async fn select_item(&mut self, item_id: &str) -> Vec<UiEffect> {
        self.drive(FlowEvent::ItemSelected { item_id: item_id.to_string() }).await
    }

    async fn resolve_modal(&mut self, decision: ModalDecision) -> Vec<UiEffect> {
        if self.session.item_flow.is_pending() {
            let confirmable = matches!(self.session.item_flow,
                ItemFlow::ConfirmingMultipiece { .. } | ItemFlow::ConfirmingCheckoutNotes { .. });
            let event = match decision {
                ModalDecision::Confirm if confirmable => FlowEvent::Confirmed,
                ModalDecision::Cancel => FlowEvent::Cancelled,
                _ => FlowEvent::Dismissed,
            };
            return self.drive(event).await;
        }
        let choosing_proxy = matches!(self.session.stage, PatronStage::AwaitingProxyChoice { .. });
        // walking away from the proxy choice drops the patron
        if choosing_proxy && decision != ModalDecision::Confirm {
            self.session.clear_resources();
            return vec![UiEffect::CloseModal,
                        UiEffect::clear(FormField::PatronIdentifier),
                        UiEffect::Focus { field: FormField::PatronIdentifier }];
        }
        vec![UiEffect::CloseModal]
    }

    async fn submit_override(&mut self, scope: OverrideScope, draft: OverrideDraft) -> Vec<UiEffect> {
        match scope {
            OverrideScope::Item => self.drive(FlowEvent::OverrideSubmitted { draft }).await,
            OverrideScope::PatronBlock => {
                if !self.session.permissions.can_override(OverrideReason::PatronBlock) {
                    return vec![UiEffect::Alert { message: "You do not have permission to override patron blocks".to_string() }];
                }
                self.drive(FlowEvent::BlockOverrideSubmitted { draft }).await
            }
        }
    }

    fn queue_add_info(&mut self, kind: AddInfoKind) -> Vec<UiEffect> {
        self.session.pending_add_info = Some(kind);
        vec![UiEffect::Focus { field: FormField::ItemBarcode }]
    }

    async fn add_info(&mut self, loan_id: &str, kind: AddInfoKind, comment: &str) -> Vec<UiEffect> {
        match self.checkout_service.add_info(loan_id, kind, comment).await {
            Ok(_) => vec![UiEffect::CloseModal],
            Err(err) => {
                tracing::warn!(desk = %self.session.id, loan_id, error = %err, "failed to add loan info");
                alert(&err)
            }
        }
    }

    async fn end_session(&mut self) -> Vec<UiEffect> {
        let mut effects = self.drive(FlowEvent::Reset).await;
        self.session.clear_resources();
        effects.push(UiEffect::clear(FormField::ItemBarcode));
        effects.push(UiEffect::clear(FormField::PatronIdentifier));
        effects.push(UiEffect::Focus { field: FormField::PatronIdentifier });
        self.publish_session_end().await;
        self.session.sweep.reset();
        tracing::info!(desk = %self.session.id, "session ended");
        effects
    }

    fn register_activity(&mut self, now: Instant) -> Vec<UiEffect> {
        self.session.timer.touch(now);
        std::mem::take(&mut self.session.deferred)
    }

    async fn tick(&mut self, now: Instant) {
        if !self.session.timer.fired(now) {
            return;
        }
        tracing::info!(desk = %self.session.id, "inactivity timeout");
        let effects = self.end_session().await;
        self.session.deferred.extend(effects);
    }

    fn view(&self) -> DeskView {
        let (patron, borrower, proxy_candidates) = match &self.session.stage {
            PatronStage::Empty => (None, None, vec![]),
            PatronStage::AwaitingProxyChoice { patron, candidates } => (Some(patron.clone()), None, candidates.clone()),
            PatronStage::Selected(pair) => (Some(pair.patron.clone()), Some(pair.borrower.clone()), vec![]),
        };
        let preference = self.session.settings.identifier_preference();
        let patron_identifier = patron.as_ref()
            .and_then(|p| pick_identifier(p, &preference).ok())
            .map(|(_, value)| value);
        DeskView {
            id: self.session.id.to_string(),
            patron,
            borrower,
            patron_identifier,
            proxy_candidates,
            block_reasons: block_reasons(&self.session.borrowing_blocks),
            block_overridden: self.session.block_override.is_some(),
            scanned_items: self.session.scanned_items.clone(),
            item_state: self.session.item_flow.name().to_string(),
            pending_add_info: self.session.pending_add_info,
            timer_armed: self.session.timer.is_armed(),
        }
    }
}
