use crate::checkout::domain::CheckoutService;
use crate::checkout::domain::service::CheckoutServiceImpl;
use crate::checkout::repository::LoanRepository;
use crate::checkout::repository::memory_loan_repository::MemoryLoanRepository;
use crate::checkout::repository::okapi_loan_repository::OkapiLoanRepository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::utils::okapi::build_okapi_client;

pub(crate) async fn create_loan_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn LoanRepository> {
    match store {
        RepositoryStore::Okapi => {
            Box::new(OkapiLoanRepository::new(build_okapi_client(config)))
        }
        RepositoryStore::InMemory(backend) => {
            Box::new(MemoryLoanRepository::new(backend))
        }
    }
}

pub(crate) async fn create_checkout_service(config: &Configuration, store: RepositoryStore) -> Box<dyn CheckoutService> {
    let loan_repo = create_loan_repository(config, store.clone()).await;
    let publisher = create_publisher(config, store.gateway_publisher()).await;
    Box::new(CheckoutServiceImpl::new(config, loan_repo, publisher))
}
