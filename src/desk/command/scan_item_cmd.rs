use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct ScanItemCommand {
    desks: DeskRegistry,
}

impl ScanItemCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemForm {
    #[serde(default)]
    pub(crate) barcode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScanItemCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) item: ItemForm,
}

impl ScanItemCommandRequest {
    pub fn new(desk_id: &str, barcode: &str) -> Self {
        Self {
            desk_id: desk_id.to_string(),
            item: ItemForm { barcode: barcode.to_string() },
        }
    }
}

pub(crate) type ScanItemCommandResponse = DeskOutcome;

#[async_trait]
impl Command<ScanItemCommandRequest, ScanItemCommandResponse> for ScanItemCommand {
    async fn execute(&self, req: ScanItemCommandRequest) -> Result<ScanItemCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.submit_item(req.item.barcode.as_str()).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}
