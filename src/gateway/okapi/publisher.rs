use async_trait::async_trait;
use serde::Serialize;
use crate::core::events::{DomainEvent, DomainEventType, PATRON_ACTION_SESSION};
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;
use crate::utils::okapi::OkapiClient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndSession {
    action_type: String,
    patron_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndSessions {
    end_sessions: Vec<EndSession>,
}

// OkapiPublisher forwards the events the circulation backend cares about and logs the rest.
#[derive(Debug)]
pub struct OkapiPublisher {
    client: OkapiClient,
}

impl OkapiPublisher {
    pub(crate) fn new(client: OkapiClient) -> Self {
        Self {
            client,
        }
    }
}

fn end_sessions(event: &DomainEvent) -> EndSessions {
    let action_type = event.metadata.get("actionType").cloned().unwrap_or_else(|| "Check out".to_string());
    EndSessions {
        end_sessions: vec![EndSession { action_type, patron_id: event.key.to_string() }],
    }
}

#[async_trait]
impl EventPublisher for OkapiPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        if event.name == PATRON_ACTION_SESSION && event.kind == DomainEventType::Ended {
            return self.client.post_empty("/circulation/end-patron-action-session", &end_sessions(event)).await;
        }
        tracing::info!(name = %event.name, key = %event.key, data = %event.json_data, "domain event");
        Ok(())
    }
}
