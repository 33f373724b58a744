use std::time::Instant;
use async_trait::async_trait;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct GetSessionCommand {
    desks: DeskRegistry,
}

impl GetSessionCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug)]
pub(crate) struct GetSessionCommandRequest {
    pub(crate) desk_id: String,
}

pub(crate) type GetSessionCommandResponse = DeskOutcome;

#[async_trait]
impl Command<GetSessionCommandRequest, GetSessionCommandResponse> for GetSessionCommand {
    async fn execute(&self, req: GetSessionCommandRequest) -> Result<GetSessionCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let effects = desk.register_activity(Instant::now());
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
