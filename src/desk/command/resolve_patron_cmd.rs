use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct ResolvePatronCommand {
    desks: DeskRegistry,
}

impl ResolvePatronCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatronForm {
    #[serde(default)]
    pub(crate) identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResolvePatronCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) patron: PatronForm,
}

impl ResolvePatronCommandRequest {
    pub fn new(desk_id: &str, identifier: &str) -> Self {
        Self {
            desk_id: desk_id.to_string(),
            patron: PatronForm { identifier: identifier.to_string() },
        }
    }
}

pub(crate) type ResolvePatronCommandResponse = DeskOutcome;

#[async_trait]
impl Command<ResolvePatronCommandRequest, ResolvePatronCommandResponse> for ResolvePatronCommand {
    async fn execute(&self, req: ResolvePatronCommandRequest) -> Result<ResolvePatronCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.resolve_patron(req.patron.identifier.as_str()).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
