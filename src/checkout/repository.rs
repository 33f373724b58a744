pub mod memory_loan_repository;
pub mod okapi_loan_repository;

use async_trait::async_trait;
use crate::checkout::dto::{AddInfoRequest, CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::core::library::LibraryResult;

#[async_trait]
pub(crate) trait LoanRepository: Sync + Send {
    async fn check_out(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto>;
    async fn find_loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto>;
    async fn add_info(&self, loan_id: &str, req: &AddInfoRequest) -> LibraryResult<()>;
}
