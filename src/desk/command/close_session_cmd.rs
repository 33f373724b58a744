use std::time::Instant;
use async_trait::async_trait;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

// Closes a desk for good: the patron session is ended and the desk leaves the registry.
pub(crate) struct CloseSessionCommand {
    desks: DeskRegistry,
}

impl CloseSessionCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug)]
pub(crate) struct CloseSessionCommandRequest {
    pub(crate) desk_id: String,
}

pub(crate) type CloseSessionCommandResponse = DeskOutcome;

#[async_trait]
impl Command<CloseSessionCommandRequest, CloseSessionCommandResponse> for CloseSessionCommand {
    async fn execute(&self, req: CloseSessionCommandRequest) -> Result<CloseSessionCommandResponse, CommandError> {
        let desk = self.desks.remove(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.end_session().await);
        tracing::info!(desk = %req.desk_id, open_desks = self.desks.len(), "desk closed");
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
