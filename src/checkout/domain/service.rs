use std::collections::HashMap;
use async_trait::async_trait;
use crate::checkout::domain::CheckoutService;
use crate::checkout::dto::{AddInfoRequest, CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::checkout::repository::LoanRepository;
use crate::core::domain::Configuration;
use crate::core::events::{DomainEvent, LOAN_CHECKED_OUT};
use crate::core::library::{AddInfoKind, LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

pub(crate) struct CheckoutServiceImpl {
    service_point_id: String,
    loan_repository: Box<dyn LoanRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CheckoutServiceImpl {
    pub(crate) fn new(config: &Configuration, loan_repository: Box<dyn LoanRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            service_point_id: config.service_point_id.to_string(),
            loan_repository,
            events_publisher,
        }
    }
}

#[async_trait]
impl CheckoutService for CheckoutServiceImpl {
    async fn checkout(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto> {
        let loan = self.loan_repository.check_out(req).await?;
        tracing::info!(loan_id = %loan.id, item_barcode = %req.item_barcode,
            overridden = req.override_blocks.is_some(), "item checked out");
        let event = DomainEvent::added(LOAN_CHECKED_OUT, "checkout", loan.id.as_str(),
                                       &HashMap::from([("servicePointId".to_string(), self.service_point_id.to_string())]),
                                       &loan)?;
        // the loan exists either way
        if let Err(err) = self.events_publisher.publish(&event).await {
            tracing::warn!(loan_id = %loan.id, error = %err, "failed to publish checkout event");
        }
        Ok(loan)
    }

    async fn find_loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto> {
        self.loan_repository.find_loan_policy(id).await
    }

    async fn add_info(&self, loan_id: &str, kind: AddInfoKind, comment: &str) -> LibraryResult<()> {
        if comment.trim().is_empty() {
            return Err(LibraryError::validation("comment is required", Some("400".to_string())));
        }
        self.loan_repository.add_info(loan_id, &AddInfoRequest::new(kind, comment.trim())).await
    }
}
