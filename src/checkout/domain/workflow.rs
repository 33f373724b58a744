//! Item checkout workflow.
//!
//! A single item submission moves through lookup, the multi-piece and checkout-note
//! confirmations, the commit and, when the backend refuses the loan, an override
//! negotiation. The workflow is a pure function of the current state, an event and a
//! read-only view of the desk session. Remote calls come out as effects and their
//! results come back in as events, so the desk driver owns every side effect.

use chrono::{DateTime, Utc};
use crate::checkout::domain::errors::{classify, Classification};
use crate::checkout::domain::model::{PatronPair, ScannedItem};
use crate::checkout::domain::overrides::{ItemOverride, merge_overrides, OverrideDraft, OverrideInfo, OverrideReason, StaffPermissions};
use crate::checkout::dto::{CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::core::library::{AddInfoKind, CheckoutError, LibraryError};
use crate::core::view::{FormField, Modal, Settlement, Sound, UiEffect};
use crate::items::dto::ItemDto;
use crate::items::Item;
use crate::patrons::domain::blocks::block_reasons;
use crate::patrons::dto::PatronBlock;
use crate::settings::CheckoutSettings;

const REQUIRED: &str = "Please fill this in to continue";

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ItemFlow {
    Idle,
    // waiting for the patron-block modal
    Blocked {
        barcode: String,
    },
    LookingUp {
        barcode: String,
    },
    SelectingItem {
        barcode: String,
        candidates: Vec<ItemDto>,
    },
    ConfirmingMultipiece {
        barcode: String,
        item: ItemDto,
    },
    ConfirmingCheckoutNotes {
        barcode: String,
        item: ItemDto,
    },
    Committing {
        barcode: String,
        item: Option<ItemDto>,
    },
    LoadingPolicy {
        loan: LoanDto,
        item: Option<ItemDto>,
    },
    Overriding {
        barcode: String,
        item: Option<ItemDto>,
        reasons: Vec<OverrideReason>,
    },
    Failed {
        barcode: String,
        messages: Vec<String>,
    },
}

impl ItemFlow {
    // any state but Idle holds an unsettled submission
    pub fn is_pending(&self) -> bool {
        !matches!(self, ItemFlow::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemFlow::Idle => "idle",
            ItemFlow::Blocked { .. } => "blocked",
            ItemFlow::LookingUp { .. } => "lookingUp",
            ItemFlow::SelectingItem { .. } => "selectingItem",
            ItemFlow::ConfirmingMultipiece { .. } => "confirmingMultipiece",
            ItemFlow::ConfirmingCheckoutNotes { .. } => "confirmingCheckoutNotes",
            ItemFlow::Committing { .. } => "committing",
            ItemFlow::LoadingPolicy { .. } => "loadingPolicy",
            ItemFlow::Overriding { .. } => "overriding",
            ItemFlow::Failed { .. } => "failed",
        }
    }

    fn has_modal(&self) -> bool {
        matches!(self, ItemFlow::Blocked { .. } | ItemFlow::SelectingItem { .. }
            | ItemFlow::ConfirmingMultipiece { .. } | ItemFlow::ConfirmingCheckoutNotes { .. }
            | ItemFlow::Overriding { .. } | ItemFlow::Failed { .. })
    }
}

#[derive(Debug)]
pub(crate) enum FlowEvent {
    Submitted {
        barcode: String,
    },
    LookupCompleted {
        items: Vec<ItemDto>,
    },
    LookupFailed {
        message: String,
    },
    ItemSelected {
        item_id: String,
    },
    Confirmed,
    Cancelled,
    Dismissed,
    BlockOverrideSubmitted {
        draft: OverrideDraft,
    },
    OverrideSubmitted {
        draft: OverrideDraft,
    },
    CheckoutSucceeded {
        loan: LoanDto,
    },
    CheckoutFailed {
        error: LibraryError,
    },
    PolicyLoaded {
        policy: Option<LoanPolicyDto>,
    },
    Reset,
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum FlowEffect {
    LookupItems {
        barcode: String,
        wildcard: bool,
    },
    Commit(CheckoutRequest),
    LoadPolicy {
        policy_id: String,
    },
    Record(ScannedItem),
    RetainBlockOverride(OverrideInfo),
    Ui(UiEffect),
}

// Read-only view of the desk session a transition runs against.
pub(crate) struct FlowContext<'a> {
    pub pair: Option<&'a PatronPair>,
    pub borrowing_blocks: &'a [PatronBlock],
    pub block_override: Option<&'a OverrideInfo>,
    pub settings: &'a CheckoutSettings,
    pub permissions: &'a StaffPermissions,
    pub service_point_id: &'a str,
    pub add_info: Option<AddInfoKind>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct Transition {
    pub flow: ItemFlow,
    pub effects: Vec<FlowEffect>,
}

impl Transition {
    fn to(flow: ItemFlow, effects: Vec<FlowEffect>) -> Self {
        Self { flow, effects }
    }

    fn stay(flow: ItemFlow) -> Self {
        Self { flow, effects: vec![] }
    }
}

fn ui(effect: UiEffect) -> FlowEffect {
    FlowEffect::Ui(effect)
}

fn errors_to_effects(err: CheckoutError) -> Vec<FlowEffect> {
    let effects: Vec<UiEffect> = err.into();
    effects.into_iter().map(FlowEffect::Ui).collect()
}

pub(crate) fn transition(flow: ItemFlow, event: FlowEvent, ctx: &FlowContext) -> Transition {
    match (flow, event) {
        (ItemFlow::Idle, FlowEvent::Submitted { barcode }) => submit(barcode, ctx),
        (flow, FlowEvent::Submitted { .. }) => {
            // the pending submission keeps going
            let effects = vec![ui(UiEffect::field_error(FormField::ItemBarcode, "Another item is being checked out"))];
            Transition::to(flow, effects)
        }

        (ItemFlow::Idle, FlowEvent::BlockOverrideSubmitted { draft }) => {
            match draft.validate(&[OverrideReason::PatronBlock]) {
                Ok(info) => Transition::to(ItemFlow::Idle, vec![
                    FlowEffect::RetainBlockOverride(info), ui(UiEffect::CloseModal)]),
                Err(err) => Transition::to(ItemFlow::Idle, errors_to_effects(err)),
            }
        }
        (ItemFlow::Blocked { barcode }, FlowEvent::BlockOverrideSubmitted { draft }) => {
            match draft.validate(&[OverrideReason::PatronBlock]) {
                Ok(info) => {
                    let effects = vec![FlowEffect::RetainBlockOverride(info),
                                       ui(UiEffect::CloseModal),
                                       lookup(barcode.as_str(), ctx.settings.wildcard_lookup_enabled)];
                    Transition::to(ItemFlow::LookingUp { barcode }, effects)
                }
                Err(err) => Transition::to(ItemFlow::Blocked { barcode }, errors_to_effects(err)),
            }
        }

        (ItemFlow::LookingUp { barcode }, FlowEvent::LookupCompleted { items }) => {
            looked_up(barcode, items, ctx)
        }
        (ItemFlow::LookingUp { .. }, FlowEvent::LookupFailed { message }) => {
            transport_failure(message, ctx)
        }

        (ItemFlow::SelectingItem { barcode, candidates }, FlowEvent::ItemSelected { item_id }) => {
            match candidates.iter().find(|c| c.id == item_id).cloned() {
                Some(item) => {
                    let mut effects = vec![ui(UiEffect::CloseModal)];
                    match item.barcode() {
                        // the pipeline starts over with an exact lookup of the chosen copy
                        Some(chosen) => {
                            effects.push(lookup(chosen.as_str(), false));
                            Transition::to(ItemFlow::LookingUp { barcode: chosen }, effects)
                        }
                        None => {
                            let next = pre_check(barcode, item, ctx);
                            effects.extend(next.effects);
                            Transition::to(next.flow, effects)
                        }
                    }
                }
                None => Transition::stay(ItemFlow::SelectingItem { barcode, candidates }),
            }
        }

        (ItemFlow::ConfirmingMultipiece { barcode, item }, FlowEvent::Confirmed) => {
            let mut effects = vec![ui(UiEffect::CloseModal)];
            let next = check_notes(barcode, item, ctx);
            effects.extend(next.effects);
            Transition::to(next.flow, effects)
        }
        (ItemFlow::ConfirmingCheckoutNotes { barcode, item }, FlowEvent::Confirmed) => {
            let mut effects = vec![ui(UiEffect::CloseModal)];
            let next = commit(barcode, Some(item), None, ctx);
            effects.extend(next.effects);
            Transition::to(next.flow, effects)
        }

        (ItemFlow::Committing { barcode: _, item }, FlowEvent::CheckoutSucceeded { loan }) => {
            match loan.loan_policy_id.clone() {
                Some(policy_id) => Transition::to(ItemFlow::LoadingPolicy { loan, item },
                                                  vec![FlowEffect::LoadPolicy { policy_id }]),
                None => finish(loan, item, None, ctx),
            }
        }
        (ItemFlow::Committing { barcode, item }, FlowEvent::CheckoutFailed { error }) => {
            failed(barcode, item, error, ctx)
        }
        (ItemFlow::LoadingPolicy { loan, item }, FlowEvent::PolicyLoaded { policy }) => {
            finish(loan, item, policy, ctx)
        }

        (ItemFlow::Overriding { barcode, item, reasons }, FlowEvent::OverrideSubmitted { draft }) => {
            match draft.validate(&reasons) {
                Ok(info) => {
                    let mut effects = vec![ui(UiEffect::CloseModal)];
                    // only the patron-block part outlives this attempt
                    if reasons.contains(&OverrideReason::PatronBlock) {
                        effects.push(FlowEffect::RetainBlockOverride(OverrideInfo::patron_block(info.comment.as_str())));
                    }
                    let next = commit(barcode, item, Some(ItemOverride { reasons, info }), ctx);
                    effects.extend(next.effects);
                    Transition::to(next.flow, effects)
                }
                Err(err) => Transition::to(ItemFlow::Overriding { barcode, item, reasons }, errors_to_effects(err)),
            }
        }

        (flow, FlowEvent::Cancelled) | (flow, FlowEvent::Dismissed) if flow.has_modal() => {
            Transition::to(ItemFlow::Idle, vec![
                ui(UiEffect::CloseModal),
                ui(UiEffect::clear(FormField::ItemBarcode)),
                ui(UiEffect::Focus { field: FormField::ItemBarcode }),
                ui(UiEffect::settled(Settlement::Rejected)),
            ])
        }

        (flow, FlowEvent::Reset) => {
            let mut effects = vec![];
            if flow.has_modal() {
                effects.push(ui(UiEffect::CloseModal));
            }
            if flow.is_pending() {
                effects.push(ui(UiEffect::settled(Settlement::Rejected)));
            }
            Transition::to(ItemFlow::Idle, effects)
        }

        (flow, event) => {
            tracing::debug!(state = flow.name(), event = ?event, "event ignored");
            Transition::stay(flow)
        }
    }
}

fn lookup(barcode: &str, wildcard: bool) -> FlowEffect {
    FlowEffect::LookupItems { barcode: barcode.to_string(), wildcard }
}

fn submit(barcode: String, ctx: &FlowContext) -> Transition {
    let barcode = barcode.trim().to_string();
    if barcode.is_empty() {
        return Transition::to(ItemFlow::Idle,
                              errors_to_effects(CheckoutError::missing_data(FormField::ItemBarcode, REQUIRED)));
    }
    if ctx.pair.is_none() {
        return Transition::to(ItemFlow::Idle,
                              errors_to_effects(CheckoutError::missing_data(FormField::PatronIdentifier, REQUIRED)));
    }
    if !ctx.borrowing_blocks.is_empty() && ctx.block_override.is_none() {
        let err = CheckoutError::blocked(block_reasons(ctx.borrowing_blocks),
                                         ctx.permissions.can_override(OverrideReason::PatronBlock));
        return Transition::to(ItemFlow::Blocked { barcode }, errors_to_effects(err));
    }
    let effects = vec![lookup(barcode.as_str(), ctx.settings.wildcard_lookup_enabled)];
    Transition::to(ItemFlow::LookingUp { barcode }, effects)
}

fn looked_up(barcode: String, mut items: Vec<ItemDto>, ctx: &FlowContext) -> Transition {
    match items.len() {
        // unknown barcodes still go to the backend, which reports them properly
        0 => commit(barcode, None, None, ctx),
        1 => match items.pop() {
            Some(item) => pre_check(barcode, item, ctx),
            None => commit(barcode, None, None, ctx),
        },
        _ => {
            let modal = Modal::ItemSelection { candidates: items.clone() };
            Transition::to(ItemFlow::SelectingItem { barcode, candidates: items }, vec![ui(UiEffect::open(modal))])
        }
    }
}

fn pre_check(barcode: String, item: ItemDto, ctx: &FlowContext) -> Transition {
    let barcode = item.barcode().unwrap_or(barcode);
    if item.is_multipiece() {
        let modal = Modal::Multipiece { item: item.clone() };
        return Transition::to(ItemFlow::ConfirmingMultipiece { barcode, item }, vec![ui(UiEffect::open(modal))]);
    }
    check_notes(barcode, item, ctx)
}

fn check_notes(barcode: String, item: ItemDto, ctx: &FlowContext) -> Transition {
    let notes = item.checkout_notes();
    if !notes.is_empty() {
        let modal = Modal::CheckoutNotes { notes };
        return Transition::to(ItemFlow::ConfirmingCheckoutNotes { barcode, item }, vec![ui(UiEffect::open(modal))]);
    }
    commit(barcode, Some(item), None, ctx)
}

fn commit(barcode: String, item: Option<ItemDto>, item_override: Option<ItemOverride>, ctx: &FlowContext) -> Transition {
    let pair = match ctx.pair {
        Some(pair) => pair,
        None => {
            let mut effects = errors_to_effects(CheckoutError::missing_data(FormField::PatronIdentifier, REQUIRED));
            effects.push(ui(UiEffect::settled(Settlement::Rejected)));
            return Transition::to(ItemFlow::Idle, effects);
        }
    };
    let user_barcode = match pair.borrower.barcode.clone() {
        Some(user_barcode) => user_barcode,
        None => {
            let mut effects = errors_to_effects(CheckoutError::missing_data(
                FormField::PatronIdentifier, "Patron has no barcode"));
            effects.push(ui(UiEffect::settled(Settlement::Rejected)));
            return Transition::to(ItemFlow::Idle, effects);
        }
    };
    let req = CheckoutRequest {
        item_barcode: barcode.to_string(),
        user_barcode,
        service_point_id: ctx.service_point_id.to_string(),
        loan_date: ctx.now,
        proxy_user_barcode: pair.proxy_barcode(),
        override_blocks: merge_overrides(item_override.as_ref(), ctx.block_override),
    };
    Transition::to(ItemFlow::Committing { barcode, item }, vec![FlowEffect::Commit(req)])
}

fn finish(loan: LoanDto, item: Option<ItemDto>, policy: Option<LoanPolicyDto>, ctx: &FlowContext) -> Transition {
    let loan_id = loan.id.to_string();
    let scanned = ScannedItem {
        loan,
        loan_policy: policy,
        checkout_notes: item.as_ref().map(|i| i.checkout_notes()).unwrap_or_default(),
        item,
        scanned_at: ctx.now,
    };
    let mut effects = vec![
        FlowEffect::Record(scanned),
        ui(UiEffect::clear(FormField::ItemBarcode)),
    ];
    if ctx.settings.audio_alerts_enabled {
        effects.push(ui(UiEffect::Notify { sound: Sound::Success }));
    }
    if let Some(kind) = ctx.add_info {
        effects.push(ui(UiEffect::open(Modal::AddInfo { loan_id, kind })));
    }
    effects.push(ui(UiEffect::settled(Settlement::Resolved)));
    Transition::to(ItemFlow::Idle, effects)
}

fn error_sound(ctx: &FlowContext, effects: &mut Vec<FlowEffect>) {
    if ctx.settings.audio_alerts_enabled {
        effects.push(ui(UiEffect::Notify { sound: Sound::Error }));
    }
}

fn transport_failure(message: String, ctx: &FlowContext) -> Transition {
    let mut effects = errors_to_effects(CheckoutError::transport_failure(message.as_str()));
    error_sound(ctx, &mut effects);
    effects.push(ui(UiEffect::settled(Settlement::Rejected)));
    Transition::to(ItemFlow::Idle, effects)
}

fn failed(barcode: String, item: Option<ItemDto>, error: LibraryError, ctx: &FlowContext) -> Transition {
    match classify(&error, ctx.permissions) {
        Classification::Transport { message } => transport_failure(message, ctx),
        Classification::PatronBlocked if ctx.block_override.is_none() => {
            let mut reasons = block_reasons(ctx.borrowing_blocks);
            if reasons.is_empty() {
                reasons.push("Patron blocked from borrowing".to_string());
            }
            let mut effects = errors_to_effects(CheckoutError::blocked(
                reasons, ctx.permissions.can_override(OverrideReason::PatronBlock)));
            error_sound(ctx, &mut effects);
            Transition::to(ItemFlow::Blocked { barcode }, effects)
        }
        Classification::PatronBlocked => {
            fatal(barcode, vec!["Patron blocked from borrowing".to_string()], ctx)
        }
        Classification::Override { reasons, messages, loan_policy_name } => {
            let modal = Modal::Override {
                reasons: reasons.clone(),
                messages,
                loan_policy_name,
                requires_due_date: reasons.iter().any(OverrideReason::requires_due_date),
            };
            let mut effects = vec![ui(UiEffect::open(modal))];
            error_sound(ctx, &mut effects);
            Transition::to(ItemFlow::Overriding { barcode, item, reasons }, effects)
        }
        Classification::Fatal { messages } => fatal(barcode, messages, ctx),
    }
}

fn fatal(barcode: String, messages: Vec<String>, ctx: &FlowContext) -> Transition {
    let mut effects = errors_to_effects(CheckoutError::PolicyViolation { messages: messages.clone() });
    error_sound(ctx, &mut effects);
    Transition::to(ItemFlow::Failed { barcode, messages }, effects)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::checkout::domain::model::PatronPair;
    use crate::checkout::domain::overrides::{OverrideDraft, OverrideInfo, OverrideReason, StaffPermissions};
    use crate::checkout::domain::workflow::{FlowContext, FlowEffect, FlowEvent, ItemFlow, transition};
    use crate::checkout::dto::{LoanDto, LoanPolicyDto};
    use crate::core::library::{AddInfoKind, BackendError, LibraryError, OverridableBlock};
    use crate::core::view::{FormField, Modal, Settlement, Sound, UiEffect};
    use crate::items::dto::{CirculationNote, ItemDto};
    use crate::patrons::dto::{ManualBlockDto, PatronBlock, PatronDto};
    use crate::settings::CheckoutSettings;

    struct Fixture {
        pair: PatronPair,
        blocks: Vec<PatronBlock>,
        block_override: Option<OverrideInfo>,
        settings: CheckoutSettings,
        permissions: StaffPermissions,
        add_info: Option<AddInfoKind>,
        with_patron: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pair: PatronPair::of(PatronDto::new("patron-1")),
                blocks: vec![],
                block_override: None,
                settings: CheckoutSettings::default(),
                permissions: StaffPermissions::overrides(),
                add_info: None,
                with_patron: true,
            }
        }

        fn ctx(&self) -> FlowContext<'_> {
            FlowContext {
                pair: if self.with_patron { Some(&self.pair) } else { None },
                borrowing_blocks: &self.blocks,
                block_override: self.block_override.as_ref(),
                settings: &self.settings,
                permissions: &self.permissions,
                service_point_id: "sp1",
                add_info: self.add_info,
                now: Utc::now(),
            }
        }
    }

    fn submitted(barcode: &str) -> FlowEvent {
        FlowEvent::Submitted { barcode: barcode.to_string() }
    }

    fn commits(effects: &[FlowEffect]) -> usize {
        effects.iter().filter(|e| matches!(e, FlowEffect::Commit(_))).count()
    }

    fn opens(effects: &[FlowEffect]) -> Vec<Modal> {
        effects.iter().filter_map(|e| match e {
            FlowEffect::Ui(UiEffect::OpenModal { modal }) => Some(modal.clone()),
            _ => None,
        }).collect()
    }

    fn not_loanable() -> LibraryError {
        let mut err = BackendError::new("Item is not loanable", Some("ITEM_NOT_LOANABLE"))
            .with_parameter("loanPolicyName", "Reading room");
        err.overridable_block = Some(OverridableBlock { name: "itemNotLoanableBlock".to_string(), missing_override_permissions: vec![] });
        LibraryError::rejected(422, vec![err])
    }

    #[tokio::test]
    async fn test_should_require_barcode_then_patron() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::Idle, submitted("  "), &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert!(matches!(&t.effects[0], FlowEffect::Ui(UiEffect::FieldError { field: FormField::ItemBarcode, .. })));

        let fixture = Fixture { with_patron: false, ..Fixture::new() };
        let t = transition(ItemFlow::Idle, submitted("BC1"), &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert!(matches!(&t.effects[0], FlowEffect::Ui(UiEffect::FieldError { field: FormField::PatronIdentifier, .. })));
    }

    #[tokio::test]
    async fn test_should_short_circuit_blocked_patron_without_lookup() {
        let mut fixture = Fixture::new();
        fixture.blocks = vec![PatronBlock::from(&ManualBlockDto::borrowing(fixture.pair.patron.id.as_str(), "fines"))];
        let t = transition(ItemFlow::Idle, submitted("BC1"), &fixture.ctx());
        assert_eq!(ItemFlow::Blocked { barcode: "BC1".to_string() }, t.flow);
        assert!(!t.effects.iter().any(|e| matches!(e, FlowEffect::LookupItems { .. })));
        assert_eq!(vec![Modal::PatronBlocked { reasons: vec!["fines".to_string()], can_override: true }], opens(&t.effects));
    }

    #[tokio::test]
    async fn test_should_continue_after_block_override() {
        let mut fixture = Fixture::new();
        fixture.blocks = vec![PatronBlock::from(&ManualBlockDto::borrowing(fixture.pair.patron.id.as_str(), "fines"))];
        let blocked = ItemFlow::Blocked { barcode: "BC1".to_string() };

        let t = transition(blocked.clone(), FlowEvent::BlockOverrideSubmitted { draft: OverrideDraft::new("", None) }, &fixture.ctx());
        assert_eq!(blocked, t.flow);

        let t = transition(blocked, FlowEvent::BlockOverrideSubmitted { draft: OverrideDraft::new("ok", None) }, &fixture.ctx());
        assert_eq!(ItemFlow::LookingUp { barcode: "BC1".to_string() }, t.flow);
        assert!(matches!(&t.effects[0], FlowEffect::RetainBlockOverride(info) if info.patron_block));
    }

    #[tokio::test]
    async fn test_should_commit_plain_item_without_modals() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::Idle, submitted("BC1"), &fixture.ctx());
        assert_eq!(vec![FlowEffect::LookupItems { barcode: "BC1".to_string(), wildcard: false }], t.effects);

        let item = ItemDto::new("BC1", "plain");
        let t = transition(t.flow, FlowEvent::LookupCompleted { items: vec![item.clone()] }, &fixture.ctx());
        assert!(opens(&t.effects).is_empty());
        assert_eq!(1, commits(&t.effects));
        match &t.effects[0] {
            FlowEffect::Commit(req) => {
                assert_eq!("BC1", req.item_barcode.as_str());
                assert_eq!("patron-1", req.user_barcode.as_str());
                assert_eq!("sp1", req.service_point_id.as_str());
                assert_eq!(None, req.proxy_user_barcode);
                assert_eq!(None, req.override_blocks);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ItemFlow::Committing { barcode: "BC1".to_string(), item: Some(item) }, t.flow);
    }

    #[tokio::test]
    async fn test_should_commit_unknown_barcode() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::LookingUp { barcode: "NOPE".to_string() },
                           FlowEvent::LookupCompleted { items: vec![] }, &fixture.ctx());
        assert_eq!(1, commits(&t.effects));
        assert_eq!(ItemFlow::Committing { barcode: "NOPE".to_string(), item: None }, t.flow);
    }

    #[tokio::test]
    async fn test_should_select_among_matches() {
        let fixture = Fixture::new();
        let a = ItemDto::new("BC-1", "a");
        let b = ItemDto::new("BC-2", "b");
        let t = transition(ItemFlow::LookingUp { barcode: "BC".to_string() },
                           FlowEvent::LookupCompleted { items: vec![a.clone(), b.clone()] }, &fixture.ctx());
        assert!(matches!(t.flow, ItemFlow::SelectingItem { .. }));
        assert_eq!(vec![Modal::ItemSelection { candidates: vec![a, b.clone()] }], opens(&t.effects));

        let t = transition(t.flow, FlowEvent::ItemSelected { item_id: b.id.to_string() }, &fixture.ctx());
        assert_eq!(ItemFlow::LookingUp { barcode: "BC-2".to_string() }, t.flow);
        assert_eq!(vec![FlowEffect::Ui(UiEffect::CloseModal),
                        FlowEffect::LookupItems { barcode: "BC-2".to_string(), wildcard: false }], t.effects);
    }

    #[tokio::test]
    async fn test_should_cancel_multipiece_without_commit() {
        let fixture = Fixture::new();
        let item = ItemDto::new("BC1", "set").with_pieces("3");
        let t = transition(ItemFlow::LookingUp { barcode: "BC1".to_string() },
                           FlowEvent::LookupCompleted { items: vec![item.clone()] }, &fixture.ctx());
        assert_eq!(ItemFlow::ConfirmingMultipiece { barcode: "BC1".to_string(), item }, t.flow);
        assert_eq!(0, commits(&t.effects));

        let t = transition(t.flow, FlowEvent::Cancelled, &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert_eq!(0, commits(&t.effects));
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::clear(FormField::ItemBarcode))));
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::settled(Settlement::Rejected))));
    }

    #[tokio::test]
    async fn test_should_confirm_multipiece_then_notes_then_commit_once() {
        let fixture = Fixture::new();
        let item = ItemDto::new("BC1", "set").with_pieces("2").with_note(CirculationNote::checkout("fragile"));
        let t = transition(ItemFlow::LookingUp { barcode: "BC1".to_string() },
                           FlowEvent::LookupCompleted { items: vec![item] }, &fixture.ctx());
        assert!(matches!(t.flow, ItemFlow::ConfirmingMultipiece { .. }));

        let t = transition(t.flow, FlowEvent::Confirmed, &fixture.ctx());
        assert!(matches!(t.flow, ItemFlow::ConfirmingCheckoutNotes { .. }));
        assert_eq!(0, commits(&t.effects));
        assert!(matches!(opens(&t.effects)[0], Modal::CheckoutNotes { .. }));

        let t = transition(t.flow, FlowEvent::Confirmed, &fixture.ctx());
        assert_eq!(1, commits(&t.effects));
        assert!(matches!(t.flow, ItemFlow::Committing { .. }));
    }

    #[tokio::test]
    async fn test_should_record_after_policy_loaded() {
        let fixture = Fixture { settings: CheckoutSettings { audio_alerts_enabled: true, ..CheckoutSettings::default() },
            add_info: Some(AddInfoKind::StaffInfo), ..Fixture::new() };
        let item = ItemDto::new("BC1", "t");
        let mut loan = LoanDto::new(&fixture.pair.borrower, &item, Utc::now());
        loan.loan_policy_id = Some("policy-1".to_string());

        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: Some(item.clone()) },
                           FlowEvent::CheckoutSucceeded { loan: loan.clone() }, &fixture.ctx());
        assert_eq!(vec![FlowEffect::LoadPolicy { policy_id: "policy-1".to_string() }], t.effects);

        let policy = LoanPolicyDto::new("Standard");
        let t = transition(t.flow, FlowEvent::PolicyLoaded { policy: Some(policy.clone()) }, &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        match &t.effects[0] {
            FlowEffect::Record(scanned) => {
                assert_eq!(loan, scanned.loan);
                assert_eq!(Some(policy), scanned.loan_policy);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::Notify { sound: Sound::Success })));
        assert_eq!(vec![Modal::AddInfo { loan_id: loan.id.to_string(), kind: AddInfoKind::StaffInfo }], opens(&t.effects));
        assert_eq!(Some(&FlowEffect::Ui(UiEffect::settled(Settlement::Resolved))), t.effects.last());
    }

    #[tokio::test]
    async fn test_should_record_without_policy() {
        let fixture = Fixture::new();
        let loan = LoanDto::new(&fixture.pair.borrower, &ItemDto::new("BC1", "t"), Utc::now());
        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: None },
                           FlowEvent::CheckoutSucceeded { loan }, &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert!(matches!(t.effects[0], FlowEffect::Record(_)));
        assert!(!t.effects.contains(&FlowEffect::Ui(UiEffect::Notify { sound: Sound::Success })));
    }

    #[tokio::test]
    async fn test_should_open_override_for_not_loanable() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: None },
                           FlowEvent::CheckoutFailed { error: not_loanable() }, &fixture.ctx());
        assert_eq!(ItemFlow::Overriding { barcode: "BC1".to_string(), item: None, reasons: vec![OverrideReason::ItemNotLoanable] }, t.flow);
        match &opens(&t.effects)[0] {
            Modal::Override { reasons, requires_due_date, loan_policy_name, .. } => {
                assert_eq!(&vec![OverrideReason::ItemNotLoanable], reasons);
                assert!(*requires_due_date);
                assert_eq!(&Some("Reading room".to_string()), loan_policy_name);
            }
            other => panic!("unexpected {:?}", other),
        }

        // comment alone is not enough
        let t = transition(t.flow, FlowEvent::OverrideSubmitted { draft: OverrideDraft::new("ok", None) }, &fixture.ctx());
        assert!(matches!(t.flow, ItemFlow::Overriding { .. }));
        assert!(matches!(&t.effects[0], FlowEffect::Ui(UiEffect::FieldError { field: FormField::OverrideDueDate, .. })));

        let t = transition(t.flow, FlowEvent::OverrideSubmitted { draft: OverrideDraft::new("ok", Some("2030-01-31")) }, &fixture.ctx());
        assert_eq!(FlowEffect::Ui(UiEffect::CloseModal), t.effects[0]);
        match &t.effects[1] {
            FlowEffect::Commit(req) => {
                let blocks = req.override_blocks.clone().expect("should carry overrides");
                assert_eq!("ok", blocks.comment.as_str());
                assert!(blocks.item_not_loanable_block.is_some());
                assert!(blocks.patron_block.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!t.effects.iter().any(|e| matches!(e, FlowEffect::RetainBlockOverride(_))));
    }

    #[tokio::test]
    async fn test_should_show_error_modal_without_permission() {
        let fixture = Fixture { permissions: StaffPermissions::default(), ..Fixture::new() };
        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: None },
                           FlowEvent::CheckoutFailed { error: not_loanable() }, &fixture.ctx());
        assert!(matches!(t.flow, ItemFlow::Failed { .. }));
        assert_eq!(vec![Modal::Error { messages: vec!["Item is not loanable (loan policy Reading room)".to_string()] }], opens(&t.effects));
        // the submission stays pending until the modal is dismissed
        assert!(!t.effects.iter().any(|e| matches!(e, FlowEffect::Ui(UiEffect::Settled { .. }))));

        let t = transition(t.flow, FlowEvent::Dismissed, &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::settled(Settlement::Rejected))));
    }

    #[tokio::test]
    async fn test_should_alert_on_transport_failure() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: None },
                           FlowEvent::CheckoutFailed { error: LibraryError::from_response(502, "<html>Bad gateway</html>") },
                           &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert!(matches!(&t.effects[0], FlowEffect::Ui(UiEffect::Alert { .. })));
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::settled(Settlement::Rejected))));
    }

    #[tokio::test]
    async fn test_should_reject_submission_when_lookup_fails() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::LookingUp { barcode: "BC1".to_string() },
                           FlowEvent::LookupFailed { message: "inventory unavailable".to_string() },
                           &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert_eq!(FlowEffect::Ui(UiEffect::Alert { message: "inventory unavailable".to_string() }), t.effects[0]);
        assert!(t.effects.contains(&FlowEffect::Ui(UiEffect::settled(Settlement::Rejected))));
        assert_eq!(0, commits(&t.effects));
    }

    #[tokio::test]
    async fn test_should_fall_back_to_block_modal() {
        let fixture = Fixture::new();
        let mut err = BackendError::new("Patron blocked from borrowing", Some("USER_IS_BLOCKED_AUTOMATICALLY"));
        err.overridable_block = Some(OverridableBlock { name: "patronBlock".to_string(), missing_override_permissions: vec![] });
        let t = transition(ItemFlow::Committing { barcode: "BC1".to_string(), item: None },
                           FlowEvent::CheckoutFailed { error: LibraryError::rejected(422, vec![err]) }, &fixture.ctx());
        assert_eq!(ItemFlow::Blocked { barcode: "BC1".to_string() }, t.flow);
        assert!(matches!(opens(&t.effects)[0], Modal::PatronBlocked { can_override: true, .. }));
    }

    #[tokio::test]
    async fn test_should_reject_second_submission_while_pending() {
        let fixture = Fixture::new();
        let pending = ItemFlow::Committing { barcode: "BC1".to_string(), item: None };
        let t = transition(pending.clone(), submitted("BC2"), &fixture.ctx());
        assert_eq!(pending, t.flow);
        assert_eq!(0, commits(&t.effects));
    }

    #[tokio::test]
    async fn test_should_reject_pending_on_reset() {
        let fixture = Fixture::new();
        let t = transition(ItemFlow::ConfirmingMultipiece { barcode: "BC1".to_string(), item: ItemDto::new("BC1", "t") },
                           FlowEvent::Reset, &fixture.ctx());
        assert_eq!(ItemFlow::Idle, t.flow);
        assert_eq!(vec![FlowEffect::Ui(UiEffect::CloseModal), FlowEffect::Ui(UiEffect::settled(Settlement::Rejected))], t.effects);
        assert!(transition(ItemFlow::Idle, FlowEvent::Reset, &fixture.ctx()).effects.is_empty());
    }

    #[tokio::test]
    async fn test_should_send_proxy_and_retained_patron_override() {
        let proxy = PatronDto::new("proxy-1");
        let sponsor = PatronDto::new("sponsor-1");
        let fixture = Fixture {
            pair: PatronPair::proxied(proxy, sponsor),
            block_override: Some(OverrideInfo::patron_block("approved")),
            ..Fixture::new()
        };
        let t = transition(ItemFlow::LookingUp { barcode: "BC1".to_string() },
                           FlowEvent::LookupCompleted { items: vec![] }, &fixture.ctx());
        match &t.effects[0] {
            FlowEffect::Commit(req) => {
                assert_eq!("sponsor-1", req.user_barcode.as_str());
                assert_eq!(Some("proxy-1".to_string()), req.proxy_user_barcode);
                let blocks = req.override_blocks.clone().expect("should carry overrides");
                assert!(blocks.patron_block.is_some());
                assert_eq!("approved", blocks.comment.as_str());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
