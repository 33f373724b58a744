use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::core::library::AddInfoKind;
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct AddInfoCommand {
    desks: DeskRegistry,
}

impl AddInfoCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

// Without a loan the request queues the capture for the next checkout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddInfoCommandRequest {
    #[serde(default)]
    pub(crate) desk_id: String,
    #[serde(default)]
    pub(crate) loan_id: Option<String>,
    pub(crate) kind: AddInfoKind,
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

pub(crate) type AddInfoCommandResponse = DeskOutcome;

#[async_trait]
impl Command<AddInfoCommandRequest, AddInfoCommandResponse> for AddInfoCommand {
    async fn execute(&self, req: AddInfoCommandRequest) -> Result<AddInfoCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        match req.loan_id.as_deref() {
            Some(loan_id) => {
                let comment = req.comment.as_deref().unwrap_or_default();
                effects.extend(desk.add_info(loan_id, req.kind, comment).await);
            }
            None => effects.extend(desk.queue_add_info(req.kind)),
        }
        Ok(DeskOutcome::new(effects, desk.view()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::library::AddInfoKind;
    use crate::core::repository::RepositoryStore;
    use crate::core::view::UiEffect;
    use crate::desk::command::add_info_cmd::{AddInfoCommand, AddInfoCommandRequest};
    use crate::desk::command::open_session_cmd::{OpenSessionCommand, OpenSessionCommandRequest};
    use crate::desk::registry::DeskRegistry;
    use crate::utils::memory::MemoryCirculation;

    lazy_static! {
        static ref DESKS: DeskRegistry = DeskRegistry::default();
        static ref SUT_CMD : AsyncOnce<AddInfoCommand> = AsyncOnce::new(async {
                AddInfoCommand::new(DESKS.clone())
            });
    }

    #[tokio::test]
    async fn test_should_queue_then_reject_unknown_loan() {
        let cmd = SUT_CMD.get().await;
        let store = RepositoryStore::InMemory(Arc::new(MemoryCirculation::new()));
        let opened = OpenSessionCommand::new(Configuration::new("test"), store, DESKS.clone())
            .execute(OpenSessionCommandRequest::default()).await.expect("should open desk");
        let desk_id = opened.view.id;

        let req = AddInfoCommandRequest { desk_id: desk_id.to_string(), loan_id: None, kind: AddInfoKind::PatronInfo, comment: None };
        let res = cmd.execute(req).await.expect("should queue");
        assert_eq!(Some(AddInfoKind::PatronInfo), res.view.pending_add_info);

        let req = AddInfoCommandRequest {
            desk_id: desk_id.to_string(),
            loan_id: Some("missing".to_string()),
            kind: AddInfoKind::StaffInfo,
            comment: Some("note".to_string()),
        };
        let res = cmd.execute(req).await.expect("should answer");
        assert!(matches!(res.effects.as_slice(), [UiEffect::Alert { .. }]));
    }
}
