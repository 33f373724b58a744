use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::items::domain::ItemService;
use crate::items::domain::service::ItemServiceImpl;
use crate::items::repository::ItemRepository;
use crate::items::repository::memory_item_repository::MemoryItemRepository;
use crate::items::repository::okapi_item_repository::OkapiItemRepository;
use crate::utils::okapi::build_okapi_client;

pub(crate) async fn create_item_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn ItemRepository> {
    match store {
        RepositoryStore::Okapi => {
            Box::new(OkapiItemRepository::new(build_okapi_client(config)))
        }
        RepositoryStore::InMemory(backend) => {
            Box::new(MemoryItemRepository::new(backend))
        }
    }
}

pub(crate) async fn create_item_service(config: &Configuration, store: RepositoryStore) -> Box<dyn ItemService> {
    let item_repo = create_item_repository(config, store).await;
    Box::new(ItemServiceImpl::new(config, item_repo))
}
