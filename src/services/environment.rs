use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Source of fresh ids and timestamps for the reducer, so that `apply`
/// stays a function of its inputs.
pub trait Environment {
    fn next_id(&mut self) -> String;
    fn now(&mut self) -> DateTime<Utc>;
}

/// UUID v4 ids and the wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic environment: ids count up from a prefix, and the clock
/// advances by a fixed step on every read.
#[derive(Debug, Clone)]
pub struct SequentialEnvironment {
    prefix: String,
    next: u64,
    clock: DateTime<Utc>,
    step: Duration,
}

impl SequentialEnvironment {
    pub fn new(prefix: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            clock: start,
            step: Duration::seconds(1),
        }
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }
}

impl Environment for SequentialEnvironment {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    fn now(&mut self) -> DateTime<Utc> {
        let now = self.clock;
        self.clock += self.step;
        now
    }
}
