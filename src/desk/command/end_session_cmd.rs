use std::time::Instant;
use async_trait::async_trait;
use crate::core::command::{Command, CommandError};
use crate::desk::domain::DeskOutcome;
use crate::desk::registry::DeskRegistry;

pub(crate) struct EndSessionCommand {
    desks: DeskRegistry,
}

impl EndSessionCommand {
    pub(crate) fn new(desks: DeskRegistry) -> Self {
        Self {
            desks,
        }
    }
}

#[derive(Debug)]
pub(crate) struct EndSessionCommandRequest {
    pub(crate) desk_id: String,
}

pub(crate) type EndSessionCommandResponse = DeskOutcome;

#[async_trait]
impl Command<EndSessionCommandRequest, EndSessionCommandResponse> for EndSessionCommand {
    async fn execute(&self, req: EndSessionCommandRequest) -> Result<EndSessionCommandResponse, CommandError> {
        let desk = self.desks.find(req.desk_id.as_str())?;
        let mut desk = desk.lock().await;
        let mut effects = desk.register_activity(Instant::now());
        effects.extend(desk.end_session().await);
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
    use crate::core::events::PATRON_ACTION_SESSION;
    use crate::core::repository::RepositoryStore;
    use crate::desk::command::end_session_cmd::{EndSessionCommand, EndSessionCommandRequest};
    use crate::desk::command::open_session_cmd::{OpenSessionCommand, OpenSessionCommandRequest};
    use crate::desk::command::resolve_patron_cmd::{ResolvePatronCommand, ResolvePatronCommandRequest};
    use crate::desk::registry::DeskRegistry;
    use crate::patrons::dto::PatronDto;
    use crate::utils::memory::MemoryCirculation;

    lazy_static! {
        static ref BACKEND: Arc<MemoryCirculation> = Arc::new(MemoryCirculation::new());
        static ref DESKS: DeskRegistry = DeskRegistry::default();
        static ref SUT_CMD : AsyncOnce<EndSessionCommand> = AsyncOnce::new(async {
                EndSessionCommand::new(DESKS.clone())
            });
    }

    #[tokio::test]
    async fn test_should_run_end_session() {
        let cmd = SUT_CMD.get().await;
        let patron = PatronDto::new("cmd-end-patron");
        BACKEND.add_user(patron.clone());
        let opened = OpenSessionCommand::new(Configuration::new("test"), RepositoryStore::InMemory(BACKEND.clone()), DESKS.clone())
            .execute(OpenSessionCommandRequest::default()).await.expect("should open desk");
        let desk_id = opened.view.id;
        let res = ResolvePatronCommand::new(DESKS.clone())
            .execute(ResolvePatronCommandRequest::new(desk_id.as_str(), "cmd-end-patron")).await.expect("should resolve patron");
        assert!(res.view.patron.is_some());

        let res = cmd.execute(EndSessionCommandRequest { desk_id }).await.expect("should end session");
        assert!(res.view.patron.is_none());
        assert!(BACKEND.published().iter().any(|e| e.name == PATRON_ACTION_SESSION && e.key == patron.id));
    }
}
