use async_trait::async_trait;
use crate::checkout::dto::{AddInfoRequest, CheckoutRequest, LoanDto, LoanPolicyDto};
use crate::checkout::repository::LoanRepository;
use crate::core::library::LibraryResult;
use crate::utils::okapi::OkapiClient;

pub(crate) struct OkapiLoanRepository {
    client: OkapiClient,
}

impl OkapiLoanRepository {
    pub(crate) fn new(client: OkapiClient) -> Self {
        Self {
            client,
        }
    }
}

#[async_trait]
impl LoanRepository for OkapiLoanRepository {
    async fn check_out(&self, req: &CheckoutRequest) -> LibraryResult<LoanDto> {
        self.client.post_json("/circulation/check-out-by-barcode", req).await
    }

    async fn find_loan_policy(&self, id: &str) -> LibraryResult<LoanPolicyDto> {
        self.client.get_json(format!("/loan-policy-storage/loan-policies/{}", id).as_str(), &[]).await
    }

    async fn add_info(&self, loan_id: &str, req: &AddInfoRequest) -> LibraryResult<()> {
        self.client.post_empty(format!("/circulation/loans/{}/add-info", loan_id).as_str(), req).await
    }
}
