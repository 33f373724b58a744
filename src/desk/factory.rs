use crate::checkout::factory::create_checkout_service;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::desk::domain::CheckoutDesk;
use crate::desk::domain::service::CheckoutDeskImpl;
use crate::gateway::factory::create_publisher;
use crate::items::factory::create_item_service;
use crate::patrons::factory::create_patron_service;
use crate::settings::factory::create_settings_repository;

pub(crate) async fn create_checkout_desk(config: &Configuration, store: RepositoryStore) -> Box<dyn CheckoutDesk> {
    let settings_repo = create_settings_repository(config, store.clone()).await;
    let patron_svc = create_patron_service(config, store.clone()).await;
    let item_svc = create_item_service(config, store.clone()).await;
    let checkout_svc = create_checkout_service(config, store.clone()).await;
    let publisher = create_publisher(config, store.gateway_publisher()).await;
    Box::new(CheckoutDeskImpl::new(config, settings_repo, patron_svc, item_svc, checkout_svc, publisher))
}
