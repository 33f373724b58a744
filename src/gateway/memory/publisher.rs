use std::sync::Arc;
use async_trait::async_trait;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;
use crate::utils::memory::MemoryCirculation;

pub struct MemoryPublisher {
    backend: Arc<MemoryCirculation>,
}

impl MemoryPublisher {
    pub(crate) fn new(backend: Arc<MemoryCirculation>) -> Self {
        Self {
            backend,
        }
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        self.backend.publish(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::core::domain::Configuration;
    use crate::core::events::{DomainEvent, PATRON_ACTION_SESSION};
    use crate::gateway::{factory, GatewayPublisherVia};
    use crate::utils::memory::MemoryCirculation;

    #[tokio::test]
    async fn test_should_record_published_events() {
        let backend = Arc::new(MemoryCirculation::new());
        let publisher = factory::create_publisher(&Configuration::new("test"), GatewayPublisherVia::InMemory(backend.clone())).await;
        let event = DomainEvent::session_ended("patron-1").expect("build event");
        publisher.publish(&event).await.expect("should publish");
        let published = backend.published();
        assert_eq!(1, published.len());
        assert_eq!(PATRON_ACTION_SESSION, published[0].name.as_str());
        assert_eq!("patron-1", published[0].key.as_str());
    }
}
