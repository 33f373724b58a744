use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::checkout::domain::overrides::OverrideDraft;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::{DeskOutcome, OverrideScope};
use crate::desk::registry::DeskRegistry;

pub(crate) struct SubmitOverrideCommand {
    desks: DeskRegistry,
}

impl SubmitOverrideCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitOverrideCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    pub(crate) scope: OverrideScope,
    #[serde(default)]
    pub(crate) comment: String,
    #[serde(default)]
    pub(crate) due_date: Option<String>,
}

impl SubmitOverrideCommandRequest {
    pub fn build_draft(&self) -> OverrideDraft {
        OverrideDraft::new(self.comment.as_str(), self.due_date.as_deref())
    }
}

pub(crate) type SubmitOverrideCommandResponse = DeskOutcome;

#[async_trait]
impl Command<SubmitOverrideCommandRequest, SubmitOverrideCommandResponse> for SubmitOverrideCommand {
    async fn execute(&self, req: SubmitOverrideCommandRequest) -> Result<SubmitOverrideCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.submit_override(req.scope, req.build_draft()).await);
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}

#[cfg(test)]
mod tests {
    use crate::desk::command::submit_override_cmd::SubmitOverrideCommandRequest;
    use crate::desk::domain::OverrideScope;

    #[tokio::test]
    async fn test_should_decode_override_request() {
        let json = r#"{"scope":"patronBlock","comment":"manager approved"}"#;
        let req: SubmitOverrideCommandRequest = serde_json::from_str(json).expect("should decode");
        assert_eq!(OverrideScope::PatronBlock, req.scope);
        let draft = req.build_draft();
        assert_eq!("manager approved", draft.comment.as_str());
        assert_eq!(None, draft.due_date);
    }
}
