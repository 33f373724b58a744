use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct SelectItemCommand {
    desks: DeskRegistry,
}

impl SelectItemCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectItemCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) item_id: String,
}

pub(crate) type SelectItemCommandResponse = DeskOutcome;

#[async_trait]
impl Command<SelectItemCommandRequest, SelectItemCommandResponse> for SelectItemCommand {
    async fn execute(&self, req: SelectItemCommandRequest) -> Result<SelectItemCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.select_item(req.item_id.as_str()).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
