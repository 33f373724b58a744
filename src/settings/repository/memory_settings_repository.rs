use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::settings::CheckoutSettings;
use crate::settings::repository::SettingsRepository;
use crate::utils::memory::MemoryCirculation;

pub(crate) struct MemorySettingsRepository {
    backend: Arc<MemoryCirculation>,
}

impl MemorySettingsRepository {
    pub(crate) fn new(backend: Arc<MemoryCirculation>) -> Self {
        Self {
            backend,
        }
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn load(&self) -> LibraryResult<Option<CheckoutSettings>> {
        Ok(self.backend.settings())
    }
}
