pub mod memory_settings_repository;
pub mod okapi_settings_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::settings::CheckoutSettings;

#[async_trait]
pub(crate) trait SettingsRepository: Sync + Send {
    // None when the tenant never saved check-out settings
    async fn load(&self) -> LibraryResult<Option<CheckoutSettings>>;
}
