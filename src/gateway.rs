use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use crate::utils::memory::MemoryCirculation;

pub mod events;
pub mod factory;
pub mod memory {
    pub mod publisher;
}
pub mod okapi {
    pub mod publisher;
}

#[derive(Clone)]
pub(crate) enum GatewayPublisherVia {
    Okapi,
    InMemory(Arc<MemoryCirculation>),
}

impl PartialEq for GatewayPublisherVia {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GatewayPublisherVia::Okapi, GatewayPublisherVia::Okapi) => true,
            (GatewayPublisherVia::InMemory(a), GatewayPublisherVia::InMemory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Debug for GatewayPublisherVia {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GatewayPublisherVia::Okapi => write!(f, "Okapi"),
            GatewayPublisherVia::InMemory(_) => write!(f, "InMemory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::gateway::GatewayPublisherVia;
    use crate::utils::memory::MemoryCirculation;

    #[tokio::test]
    async fn test_should_compare_via() {
        let backend = Arc::new(MemoryCirculation::new());
        assert_eq!(GatewayPublisherVia::InMemory(backend.clone()), GatewayPublisherVia::InMemory(backend));
        assert_ne!(GatewayPublisherVia::InMemory(Arc::new(MemoryCirculation::new())), GatewayPublisherVia::Okapi);
    }
}
