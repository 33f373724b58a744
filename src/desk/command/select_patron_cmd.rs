use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct SelectPatronCommand {
    desks: DeskRegistry,
}

impl SelectPatronCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectPatronCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) patron_id: String,
}

pub(crate) type SelectPatronCommandResponse = DeskOutcome;

#[async_trait]
impl Command<SelectPatronCommandRequest, SelectPatronCommandResponse> for SelectPatronCommand {
    async fn execute(&self, req: SelectPatronCommandRequest) -> Result<SelectPatronCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.select_patron(req.patron_id.as_str()).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
