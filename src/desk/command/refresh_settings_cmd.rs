use std::time::Instant;
use async_trait::async_trait;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct RefreshSettingsCommand {
    desks: DeskRegistry,
}

impl RefreshSettingsCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RefreshSettingsCommandRequest {
    pub(crate) desk_id: String,
}

pub(crate) type RefreshSettingsCommandResponse = DeskOutcome;

#[async_trait]
impl Command<RefreshSettingsCommandRequest, RefreshSettingsCommandResponse> for RefreshSettingsCommand {
    async fn execute(&self, req: RefreshSettingsCommandRequest) -> Result<RefreshSettingsCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.refresh_settings().await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
