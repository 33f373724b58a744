use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use crate::core::library::{LibraryError, LibraryResult};
use crate::desk::domain::CheckoutDesk;

// One desk is driven by one request at a time; the lock is held across remote calls.
pub(crate) type DeskHandle = Arc<tokio::sync::Mutex<Box<dyn CheckoutDesk>>>;

// DeskRegistry keeps the open desks of this process.
#[derive(Clone, Default)]
pub(crate) struct DeskRegistry {
    desks: Arc<Mutex<HashMap<String, DeskHandle>>>,
}

impl DeskRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, DeskHandle>> {
        self.desks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn insert(&self, desk: Box<dyn CheckoutDesk>) -> DeskHandle {
        let id = desk.id();
        let handle = Arc::new(tokio::sync::Mutex::new(desk));
        self.lock().insert(id, handle.clone());
        handle
    }

    pub(crate) fn find(&self, id: &str) -> LibraryResult<DeskHandle> {
        self.lock().get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("desk {} not found", id).as_str()))
    }

    pub(crate) fn remove(&self, id: &str) -> LibraryResult<DeskHandle> {
        self.lock().remove(id)
            .ok_or_else(|| LibraryError::not_found(format!("desk {} not found", id).as_str()))
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn handles(&self) -> Vec<DeskHandle> {
        self.lock().values().cloned().collect()
    }

    // Ticks every idle desk's inactivity timer, each on its own task. A desk busy with a
    // request is skipped; the next tick catches it.
    pub(crate) async fn tick_all(&self, now: Instant) {
        let tasks: Vec<_> = self.handles().into_iter()
            .filter_map(|handle| handle.try_lock_owned().ok())
            .map(|mut desk| tokio::spawn(async move { desk.tick(now).await }))
            .collect();
        for task in tasks {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "desk tick failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use crate::checkout::domain::overrides::StaffPermissions;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::RepositoryStore;
    use crate::desk::factory::create_checkout_desk;
    use crate::desk::registry::DeskRegistry;
    use crate::settings::CheckoutSettings;
    use crate::utils::memory::MemoryCirculation;

    #[tokio::test]
    async fn test_should_register_and_find_desks() {
        let store = RepositoryStore::InMemory(Arc::new(MemoryCirculation::new()));
        let registry = DeskRegistry::default();
        let mut desk = create_checkout_desk(&Configuration::new("sp1"), store).await;
        let _ = desk.open(StaffPermissions::default()).await;
        let id = desk.id();
        let _ = registry.insert(desk);

        assert_eq!(1, registry.len());
        let handle = registry.find(id.as_str()).expect("should find desk");
        assert_eq!(id, handle.lock().await.view().id);
        assert!(matches!(registry.find("missing"), Err(LibraryError::NotFound { .. })));

        assert!(registry.remove(id.as_str()).is_ok());
        assert_eq!(0, registry.len());
        assert!(registry.find(id.as_str()).is_err());
        assert!(matches!(registry.remove(id.as_str()), Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_tick_idle_desks_while_another_is_busy() {
        let backend = Arc::new(MemoryCirculation::new());
        backend.set_settings(CheckoutSettings { checkout_timeout_duration: 1, ..CheckoutSettings::default() });
        let registry = DeskRegistry::default();
        let start = Instant::now();
        let mut ids = vec![];
        for _ in 0..2 {
            let mut desk = create_checkout_desk(&Configuration::new("sp1"), RepositoryStore::InMemory(backend.clone())).await;
            let _ = desk.open(StaffPermissions::default()).await;
            let _ = desk.register_activity(start);
            ids.push(desk.id());
            let _ = registry.insert(desk);
        }
        let busy = registry.find(ids[0].as_str()).expect("should find desk");
        let idle = registry.find(ids[1].as_str()).expect("should find desk");

        let guard = busy.lock().await;
        registry.tick_all(start + Duration::from_secs(61)).await;
        assert!(guard.view().timer_armed);
        assert!(!idle.lock().await.view().timer_armed);
        drop(guard);

        registry.tick_all(start + Duration::from_secs(62)).await;
        assert!(!busy.lock().await.view().timer_armed);
    }
}
