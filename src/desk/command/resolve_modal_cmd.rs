use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::{DeskOutcome, ModalDecision};
use crate::desk::registry::DeskRegistry;

pub(crate) struct ResolveModalCommand {
    desks: DeskRegistry,
}

impl ResolveModalCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResolveModalCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) decision: ModalDecision,
}

pub(crate) type ResolveModalCommandResponse = DeskOutcome;

#[async_trait]
impl Command<ResolveModalCommandRequest, ResolveModalCommandResponse> for ResolveModalCommand {
    async fn execute(&self, req: ResolveModalCommandRequest) -> Result<ResolveModalCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.resolve_modal(req.decision).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
