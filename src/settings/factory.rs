use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::settings::repository::memory_settings_repository::MemorySettingsRepository;
use crate::settings::repository::okapi_settings_repository::OkapiSettingsRepository;
use crate::settings::repository::SettingsRepository;
use crate::utils::okapi::build_okapi_client;

pub(crate) async fn create_settings_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn SettingsRepository> {
    match store {
        RepositoryStore::Okapi => {
            Box::new(OkapiSettingsRepository::new(build_okapi_client(config)))
        }
        RepositoryStore::InMemory(backend) => {
            Box::new(MemorySettingsRepository::new(backend))
        }
    }
}
