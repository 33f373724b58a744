use async_trait::async_trait;
use crate::checkout::dto::{CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::core::library::{AddInfoKind, LibraryResult};

pub mod errors;
pub mod model;
pub mod overrides;
pub mod service;
pub mod workflow;

#[async_trait]
pub(crate) trait CheckoutService: Sync + Send {
    async fn checkout(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto>;
    async fn find_loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto>;
    async fn add_info(&self, loan_id: &str, kind: AddInfoKind, comment: &str) -> LibraryResult<()>;
}
