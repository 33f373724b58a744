use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use crate::gateway::GatewayPublisherVia;
use crate::utils::memory::MemoryCirculation;

// RepositoryStore selects where the desk reads and writes circulation data.
#[derive(Clone)]
pub(crate) enum RepositoryStore {
    Okapi,
    InMemory(Arc<MemoryCirculation>),
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::Okapi => { GatewayPublisherVia::Okapi }
            RepositoryStore::InMemory(backend) => { GatewayPublisherVia::InMemory(backend.clone()) }
        }
    }
}

impl Debug for RepositoryStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryStore::Okapi => write!(f, "Okapi"),
            RepositoryStore::InMemory(_) => write!(f, "InMemory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::core::repository::RepositoryStore;
    use crate::gateway::GatewayPublisherVia;
    use crate::utils::memory::MemoryCirculation;

    #[tokio::test]
    async fn test_should_select_publisher() {
        assert_eq!(GatewayPublisherVia::Okapi, RepositoryStore::Okapi.gateway_publisher());
        let store = RepositoryStore::InMemory(Arc::new(MemoryCirculation::new()));
        assert!(matches!(store.gateway_publisher(), GatewayPublisherVia::InMemory(_)));
        assert_eq!("InMemory", format!("{:?}", store).as_str());
    }
}
