use std::sync::Arc;
use async_trait::async_trait;
use crate::checkout::dto::{AddInfoRequest, CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::checkout::repository::LoanRepository;
use crate::core::library::LibraryResult;
use crate::utils::memory::MemoryCirculation;

pub(crate) struct MemoryLoanRepository {
    backend: Arc<MemoryCirculation>,
}

impl MemoryLoanRepository {
    pub(crate) fn new(backend: Arc<MemoryCirculation>) -> Self {
        Self {
            backend,
        }
    }
}

#[async_trait]
impl LoanRepository for MemoryLoanRepository {
    async fn check_out(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto> {
        self.backend.check_out(req)
    }

    async fn find_loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto> {
        self.backend.loan_policy(id)
    }

    async fn add_info(&self, loan_id: &str, req: &AddInfoRequest) -> LibraryResult<()> {
        self.backend.add_info(loan_id, req)
    }
}
