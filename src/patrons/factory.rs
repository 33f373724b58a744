use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;
use crate::patrons::repository::okapi_patron_repository::OkapiPatronRepository;
use crate::patrons::repository::PatronRepository;
use crate::utils::okapi::build_okapi_client;

pub(crate) async fn create_patron_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn PatronRepository> {
    match store {
        RepositoryStore::Okapi => {
            Box::new(OkapiPatronRepository::new(build_okapi_client(config)))
        }
        RepositoryStore::InMemory(backend) => {
            Box::new(MemoryPatronRepository::new(backend))
        }
    }
}

pub(crate) async fn create_patron_service(config: &Configuration, store: RepositoryStore) -> Box<dyn PatronService> {
    let patron_repo = create_patron_repository(config, store).await;
    Box::new(PatronServiceImpl::new(config, patron_repo))
}
