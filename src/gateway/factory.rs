use crate::core::domain::Configuration;
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::memory::publisher::MemoryPublisher;
use crate::gateway::okapi::publisher::OkapiPublisher;
use crate::utils::okapi::build_okapi_client;

pub(crate) async fn create_publisher(config: &Configuration, via: GatewayPublisherVia) -> Box<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Okapi => {
            Box::new(OkapiPublisher::new(build_okapi_client(config)))
        }
        GatewayPublisherVia::InMemory(backend) => {
            Box::new(MemoryPublisher::new(backend))
        }
    }
}
