use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::{Command, KanbanError, Member, ProjectState};

use super::environment::Environment;
use super::reducer;

/// One session's project state.
///
/// Built once at the application root and handed to whatever needs it.
/// Commands are applied one at a time; every applied command publishes the
/// new snapshot to subscribers (for example the snapshot persister).
pub struct ProjectStore {
    state: Arc<ProjectState>,
    env: Box<dyn Environment + Send>,
    current_member: Option<Member>,
    observers: broadcast::Sender<Arc<ProjectState>>,
}

impl ProjectStore {
    pub fn new(initial: ProjectState, env: Box<dyn Environment + Send>, observer_capacity: usize) -> Self {
        let (observers, _rx) = broadcast::channel(observer_capacity.max(1));
        Self {
            state: Arc::new(initial),
            env,
            current_member: None,
            observers,
        }
    }

    /// Sets the member used as the default comment author.
    pub fn with_current_member(mut self, member: Member) -> Self {
        self.current_member = Some(member);
        self
    }

    pub fn current_member(&self) -> Option<&Member> {
        self.current_member.as_ref()
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<ProjectState> {
        Arc::clone(&self.state)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ProjectState>> {
        self.observers.subscribe()
    }

    /// Applies a command. Commands referring to missing entities are
    /// ignored and the state stays as it was.
    pub fn dispatch(&mut self, command: Command) -> &ProjectState {
        if let Err(e) = self.try_dispatch(command) {
            tracing::debug!(error = %e, "Command ignored");
        }
        &self.state
    }

    /// Like `dispatch`, but reports the missing reference instead of
    /// swallowing it. The state is unchanged on error.
    pub fn try_dispatch(&mut self, command: Command) -> Result<&ProjectState, KanbanError> {
        let command = self.resolve_author(command);
        let kind = command.kind();

        let next = reducer::try_apply(&self.state, command, self.env.as_mut())?;
        tracing::debug!(command = kind, "Command applied");

        self.state = Arc::new(next);
        // No subscribers is fine; the snapshot is still current.
        let _ = self.observers.send(Arc::clone(&self.state));
        Ok(self.state.as_ref())
    }

    fn resolve_author(&self, command: Command) -> Command {
        match command {
            Command::AddComment {
                card_id,
                text,
                author: None,
            } => Command::AddComment {
                card_id,
                text,
                author: self.current_member.clone(),
            },
            other => other,
        }
    }
}
