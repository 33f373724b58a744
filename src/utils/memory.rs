use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use chrono::Utc;
use crate::checkout::dto::{AddInfoRequest, CheckoutRequest, LoanDto, LoanPolicyDto, OverrideBlocks};
use crate::core::events::DomainEvent;
use crate::core::library::{BackendError, LibraryError, LibraryResult, OverridableBlock, PaginatedResult};
use crate::items::dto::ItemDto;
use crate::items::repository::ItemQuery;
use crate::patrons::dto::{AutomatedBlockDto, ManualBlockDto, PatronDto, ProxyForDto};
use crate::patrons::identifiers::IdentifierQuery;
use crate::settings::CheckoutSettings;

// A published event as seen by the in-memory gateway.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct PublishedEvent {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone)]
struct TransportFailure {
    status: u16,
    body: String,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<PatronDto>,
    proxies: Vec<ProxyForDto>,
    manual_blocks: Vec<ManualBlockDto>,
    automated_blocks: HashMap<String, Vec<AutomatedBlockDto>>,
    awaiting_pickup: HashMap<String, usize>,
    items: Vec<ItemDto>,
    loan_policies: HashMap<String, LoanPolicyDto>,
    item_policies: HashMap<String, String>,
    default_policy_id: Option<String>,
    rejections: HashMap<String, Vec<BackendError>>,
    transport_failures: HashMap<String, TransportFailure>,
    item_lookup_failure: Option<String>,
    // users whose automated-block lookup fails
    automated_block_failures: Vec<String>,
    settings: Option<CheckoutSettings>,
    loans: Vec<LoanDto>,
    // call log
    user_queries: Vec<String>,
    item_queries: Vec<(String, usize, usize)>,
    checkouts: Vec<CheckoutRequest>,
    deleted_blocks: Vec<String>,
    policy_fetches: Vec<String>,
    added_info: Vec<(String, AddInfoRequest)>,
    published: Vec<PublishedEvent>,
}

// MemoryCirculation is an in-process circulation backend with the same behavior the
// remote service shows for the calls the desk makes. It records every call it receives.
pub(crate) struct MemoryCirculation {
    state: Mutex<MemoryState>,
}

impl Default for MemoryCirculation {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCirculation {
    pub(crate) fn new() -> Self {
        let policy = LoanPolicyDto::new("Example Loan Policy");
        let mut state = MemoryState::default();
        state.default_policy_id = Some(policy.id.to_string());
        state.loan_policies.insert(policy.id.to_string(), policy);
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // seeding

    pub(crate) fn add_user(&self, user: PatronDto) {
        self.lock().users.push(user);
    }

    pub(crate) fn add_proxy(&self, proxy: ProxyForDto) {
        self.lock().proxies.push(proxy);
    }

    pub(crate) fn add_manual_block(&self, block: ManualBlockDto) {
        self.lock().manual_blocks.push(block);
    }

    pub(crate) fn add_automated_block(&self, user_id: &str, block: AutomatedBlockDto) {
        self.lock().automated_blocks.entry(user_id.to_string()).or_default().push(block);
    }

    pub(crate) fn set_awaiting_pickup(&self, user_id: &str, count: usize) {
        self.lock().awaiting_pickup.insert(user_id.to_string(), count);
    }

    pub(crate) fn add_item(&self, item: ItemDto) {
        self.lock().items.push(item);
    }

    pub(crate) fn add_loan_policy(&self, policy: LoanPolicyDto) {
        self.lock().loan_policies.insert(policy.id.to_string(), policy);
    }

    pub(crate) fn assign_policy(&self, item_id: &str, policy_id: &str) {
        self.lock().item_policies.insert(item_id.to_string(), policy_id.to_string());
    }

    pub(crate) fn remove_loan_policy(&self, policy_id: &str) {
        self.lock().loan_policies.remove(policy_id);
    }

    // checkouts of `barcode` fail with `errors` unless each error is overridden
    pub(crate) fn reject_checkout(&self, barcode: &str, errors: Vec<BackendError>) {
        self.lock().rejections.insert(barcode.to_string(), errors);
    }

    // checkouts of `barcode` fail with an unstructured response
    pub(crate) fn fail_checkout(&self, barcode: &str, status: u16, body: &str) {
        self.lock().transport_failures.insert(barcode.to_string(), TransportFailure { status, body: body.to_string() });
    }

    pub(crate) fn fail_automated_blocks(&self, user_id: &str) {
        self.lock().automated_block_failures.push(user_id.to_string());
    }

    pub(crate) fn fail_item_lookup(&self, message: &str) {
        self.lock().item_lookup_failure = Some(message.to_string());
    }

    pub(crate) fn set_settings(&self, settings: CheckoutSettings) {
        self.lock().settings = Some(settings);
    }

    // reads used by the repositories

    pub(crate) fn query_users(&self, query: &IdentifierQuery, limit: usize) -> PaginatedResult<PatronDto> {
        let mut state = self.lock();
        state.user_queries.push(query.to_cql());
        let matched: Vec<PatronDto> = state.users.iter().filter(|u| query.matches(u)).cloned().collect();
        let total = matched.len();
        PaginatedResult::new(0, limit, Some(total), matched.into_iter().take(limit).collect())
    }

    pub(crate) fn users_by_ids(&self, ids: &[String]) -> Vec<PatronDto> {
        self.lock().users.iter().filter(|u| ids.contains(&u.id)).cloned().collect()
    }

    pub(crate) fn proxies_for(&self, proxy_user_id: &str) -> Vec<ProxyForDto> {
        self.lock().proxies.iter().filter(|p| p.proxy_user_id == proxy_user_id).cloned().collect()
    }

    pub(crate) fn manual_blocks(&self, user_id: &str) -> Vec<ManualBlockDto> {
        self.lock().manual_blocks.iter().filter(|b| b.user_id == user_id).cloned().collect()
    }

    pub(crate) fn automated_blocks(&self, user_id: &str) -> LibraryResult<Vec<AutomatedBlockDto>> {
        let state = self.lock();
        if state.automated_block_failures.iter().any(|id| id == user_id) {
            return Err(LibraryError::transport(Some(500), "automated patron blocks unavailable"));
        }
        Ok(state.automated_blocks.get(user_id).cloned().unwrap_or_default())
    }

    pub(crate) fn delete_manual_block(&self, id: &str) -> LibraryResult<()> {
        let mut state = self.lock();
        state.deleted_blocks.push(id.to_string());
        let before = state.manual_blocks.len();
        state.manual_blocks.retain(|b| b.id != id);
        if state.manual_blocks.len() == before {
            return Err(LibraryError::not_found(format!("manual block {} not found", id).as_str()));
        }
        Ok(())
    }

    pub(crate) fn awaiting_pickup(&self, user_id: &str) -> usize {
        self.lock().awaiting_pickup.get(user_id).cloned().unwrap_or_default()
    }

    pub(crate) fn query_items(&self, query: &ItemQuery, offset: usize, limit: usize) -> LibraryResult<PaginatedResult<ItemDto>> {
        let mut state = self.lock();
        state.item_queries.push((query.to_cql(), offset, limit));
        if let Some(message) = &state.item_lookup_failure {
            return Err(LibraryError::transport(Some(500), message.as_str()));
        }
        let matched: Vec<ItemDto> = state.items.iter().filter(|i| query.matches(i)).cloned().collect();
        let total = matched.len();
        let records = matched.into_iter().skip(offset).take(limit).collect();
        Ok(PaginatedResult::new(offset, limit, Some(total), records))
    }

    pub(crate) fn check_out(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto> {
        let mut state = self.lock();
        state.checkouts.push(req.clone());
        if let Some(failure) = state.transport_failures.get(&req.item_barcode) {
            return Err(LibraryError::from_response(failure.status, failure.body.as_str()));
        }
        let overrides = req.override_blocks.clone().unwrap_or_default();
        let borrower = state.find_by_barcode(req.user_barcode.as_str());
        let item = state.items.iter()
            .find(|i| i.barcode.as_deref() == Some(req.item_barcode.as_str()))
            .cloned();

        let mut errors = vec![];
        if let Some(borrower) = &borrower {
            if !borrower.active {
                errors.push(BackendError::new("Cannot check out to inactive user", Some("USER_IS_INACTIVE")));
            }
            if overrides.patron_block.is_none() && state.has_borrowing_block(borrower.id.as_str()) {
                let mut err = BackendError::new("Patron blocked from borrowing", Some("USER_IS_BLOCKED_MANUALLY"));
                err.overridable_block = Some(OverridableBlock { name: "patronBlock".to_string(), missing_override_permissions: vec![] });
                errors.push(err);
            }
        } else {
            errors.push(BackendError::new("Could not find user with matching barcode", Some("USER_BARCODE_NOT_FOUND"))
                .with_parameter("userBarcode", req.user_barcode.as_str()));
        }
        if item.is_none() {
            errors.push(BackendError::new(format!("No item with barcode {} exists", req.item_barcode).as_str(), Some("ITEM_NOT_FOUND"))
                .with_parameter("itemBarcode", req.item_barcode.as_str()));
        }
        if let Some(rejections) = state.rejections.get(&req.item_barcode) {
            errors.extend(rejections.iter().filter(|e| !is_overridden(e, &overrides)).cloned());
        }

        match (borrower, item) {
            (Some(borrower), Some(item)) if errors.is_empty() => {
                let mut loan = LoanDto::new(&borrower, &item, req.loan_date);
                loan.proxy_user_id = req.proxy_user_barcode.as_deref()
                    .and_then(|b| state.find_by_barcode(b))
                    .map(|p| p.id);
                loan.loan_policy_id = state.item_policies.get(&item.id).cloned()
                    .or_else(|| state.default_policy_id.clone());
                if let Some(block) = &overrides.item_not_loanable_block {
                    loan.due_date = Some(block.due_date);
                }
                if req.override_blocks.is_some() {
                    loan.action_comment = Some(overrides.comment.to_string());
                }
                state.loans.push(loan.clone());
                Ok(loan)
            }
            _ => Err(LibraryError::rejected(422, errors)),
        }
    }

    pub(crate) fn loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto> {
        let mut state = self.lock();
        state.policy_fetches.push(id.to_string());
        state.loan_policies.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("loan policy {} not found", id).as_str()))
    }

    pub(crate) fn add_info(&self, loan_id: &str, req: &AddInfoRequest) -> LibraryResult<()> {
        let mut state = self.lock();
        if !state.loans.iter().any(|l| l.id == loan_id) {
            return Err(LibraryError::not_found(format!("loan {} not found", loan_id).as_str()));
        }
        state.added_info.push((loan_id.to_string(), req.clone()));
        Ok(())
    }

    pub(crate) fn settings(&self) -> Option<CheckoutSettings> {
        self.lock().settings.clone()
    }

    pub(crate) fn publish(&self, event: &DomainEvent) {
        self.lock().published.push(PublishedEvent { name: event.name.to_string(), key: event.key.to_string() });
    }

    // call log

    pub(crate) fn user_queries(&self) -> Vec<String> {
        self.lock().user_queries.clone()
    }

    pub(crate) fn item_queries(&self) -> Vec<(String, usize, usize)> {
        self.lock().item_queries.clone()
    }

    pub(crate) fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.lock().checkouts.clone()
    }

    pub(crate) fn deleted_blocks(&self) -> Vec<String> {
        self.lock().deleted_blocks.clone()
    }

    pub(crate) fn policy_fetches(&self) -> Vec<String> {
        self.lock().policy_fetches.clone()
    }

    pub(crate) fn added_info(&self) -> Vec<(String, AddInfoRequest)> {
        self.lock().added_info.clone()
    }

    pub(crate) fn published(&self) -> Vec<PublishedEvent> {
        self.lock().published.clone()
    }
}

impl MemoryState {
    fn find_by_barcode(&self, barcode: &str) -> Option<PatronDto> {
        self.users.iter().find(|u| u.barcode.as_deref() == Some(barcode)).cloned()
    }

    fn has_borrowing_block(&self, user_id: &str) -> bool {
        let now = Utc::now();
        let manual = self.manual_blocks.iter()
            .any(|b| b.user_id == user_id && b.borrowing && b.expiration_date.map(|d| d >= now).unwrap_or(true));
        let automated = self.automated_blocks.get(user_id)
            .map(|blocks| blocks.iter().any(|b| b.block_borrowing))
            .unwrap_or(false);
        manual || automated
    }
}

fn is_overridden(err: &BackendError, overrides: &OverrideBlocks) -> bool {
    match err.overridable_block.as_ref().map(|b| b.name.as_str()) {
        Some("itemNotLoanableBlock") => overrides.item_not_loanable_block.is_some(),
        Some("itemLimitBlock") => overrides.item_limit_block.is_some(),
        Some("patronBlock") => overrides.patron_block.is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::checkout::dto::{CheckoutRequest, EmptyBlock, OverrideBlocks};
    use crate::core::library::{BackendError, LibraryError, OverridableBlock};
    use crate::items::dto::ItemDto;
    use crate::items::repository::ItemQuery;
    use crate::patrons::dto::{ManualBlockDto, PatronDto};
    use crate::utils::memory::MemoryCirculation;

    fn request(item: &str, user: &str) -> CheckoutRequest {
        CheckoutRequest {
            item_barcode: item.to_string(),
            user_barcode: user.to_string(),
            service_point_id: "sp1".to_string(),
            loan_date: Utc::now(),
            proxy_user_barcode: None,
            override_blocks: None,
        }
    }

    #[tokio::test]
    async fn test_should_check_out_known_item() {
        let backend = MemoryCirculation::new();
        backend.add_user(PatronDto::new("u-1"));
        backend.add_item(ItemDto::new("i-1", "title"));
        let loan = backend.check_out(&request("i-1", "u-1")).expect("should check out");
        assert!(loan.loan_policy_id.is_some());
        assert_eq!(1, backend.checkouts().len());
    }

    #[tokio::test]
    async fn test_should_reject_unknown_item() {
        let backend = MemoryCirculation::new();
        backend.add_user(PatronDto::new("u-1"));
        match backend.check_out(&request("missing", "u-1")) {
            Err(LibraryError::Rejected { status, errors }) => {
                assert_eq!(422, status);
                assert_eq!("No item with barcode missing exists", errors[0].message.as_str());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_honor_overrides() {
        let backend = MemoryCirculation::new();
        backend.add_user(PatronDto::new("u-1"));
        backend.add_item(ItemDto::new("i-1", "title"));
        let mut limit = BackendError::new("Patron has reached maximum limit", Some("ITEM_LIMIT_REACHED"));
        limit.overridable_block = Some(OverridableBlock { name: "itemLimitBlock".to_string(), missing_override_permissions: vec![] });
        backend.reject_checkout("i-1", vec![limit]);
        assert!(backend.check_out(&request("i-1", "u-1")).is_err());

        let mut req = request("i-1", "u-1");
        req.override_blocks = Some(OverrideBlocks {
            comment: "ok".to_string(),
            item_limit_block: Some(EmptyBlock {}),
            ..OverrideBlocks::default()
        });
        let loan = backend.check_out(&req).expect("should check out with override");
        assert_eq!(Some("ok".to_string()), loan.action_comment);
    }

    #[tokio::test]
    async fn test_should_block_borrowing_patron() {
        let backend = MemoryCirculation::new();
        let patron = PatronDto::new("u-1");
        backend.add_manual_block(ManualBlockDto::borrowing(patron.id.as_str(), "fines"));
        backend.add_user(patron);
        backend.add_item(ItemDto::new("i-1", "title"));
        assert!(matches!(backend.check_out(&request("i-1", "u-1")), Err(LibraryError::Rejected { .. })));

        let mut req = request("i-1", "u-1");
        req.override_blocks = Some(OverrideBlocks { comment: "c".to_string(), patron_block: Some(EmptyBlock {}), ..OverrideBlocks::default() });
        assert!(backend.check_out(&req).is_ok());
    }

    #[tokio::test]
    async fn test_should_ignore_expired_blocks_on_checkout() {
        let backend = MemoryCirculation::new();
        let patron = PatronDto::new("u-1");
        let mut block = ManualBlockDto::borrowing(patron.id.as_str(), "old");
        block.expiration_date = Some(Utc::now() - Duration::days(1));
        backend.add_manual_block(block);
        backend.add_user(patron);
        backend.add_item(ItemDto::new("i-1", "title"));
        assert!(backend.check_out(&request("i-1", "u-1")).is_ok());
    }

    #[tokio::test]
    async fn test_should_fail_with_transport_error() {
        let backend = MemoryCirculation::new();
        backend.fail_checkout("i-1", 500, "<html>Internal</html>");
        assert!(matches!(backend.check_out(&request("i-1", "u-1")), Err(LibraryError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_should_page_items() {
        let backend = MemoryCirculation::new();
        for i in 0..5 {
            backend.add_item(ItemDto::new(format!("BC{}", i).as_str(), "t"));
        }
        let page = backend.query_items(&ItemQuery::new("BC", true), 4, 2).expect("should query");
        assert_eq!(1, page.records.len());
        assert_eq!(Some(5), page.total_records);
        assert_eq!(vec![(r#"barcode=="BC*""#.to_string(), 4, 2)], backend.item_queries());
    }
}
