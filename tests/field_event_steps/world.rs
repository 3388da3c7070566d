//! Shared world state for field-event BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use waymark::activity::adapters::memory::InMemoryActivityLog;
use waymark::task::{
    adapters::memory::{
        InMemoryAttachmentStore, InMemoryPaymentRepository, InMemoryTaskRepository,
    },
    domain::{Actor, Role, Task, UserId},
    services::{
        CheckInOutcome, CheckOutOutcome, FieldEventError, FieldEventService, TaskLifecycleService,
    },
};

/// Lifecycle service type used by the BDD world.
pub type TestLifecycleService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryPaymentRepository,
    InMemoryAttachmentStore,
    InMemoryActivityLog,
    DefaultClock,
>;

/// Field-event service type used by the BDD world.
pub type TestFieldEventService = FieldEventService<
    InMemoryTaskRepository,
    InMemoryPaymentRepository,
    InMemoryAttachmentStore,
    InMemoryActivityLog,
    DefaultClock,
>;

/// Scenario world for field-event behaviour tests.
pub struct FieldEventWorld {
    pub lifecycle: TestLifecycleService,
    pub field_events: TestFieldEventService,
    pub admin: Actor,
    pub worker: Actor,
    pub task: Option<Task>,
    pub last_check_in: Option<Result<CheckInOutcome, FieldEventError>>,
    pub last_check_out: Option<Result<CheckOutOutcome, FieldEventError>>,
}

impl FieldEventWorld {
    /// Creates a world over fresh in-memory collaborators.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let storage = Arc::new(InMemoryAttachmentStore::new());
        let log = Arc::new(InMemoryActivityLog::new());
        let clock = Arc::new(DefaultClock);
        Self {
            lifecycle: TaskLifecycleService::new(
                Arc::clone(&repository),
                Arc::clone(&payments),
                Arc::clone(&storage),
                Arc::clone(&log),
                Arc::clone(&clock),
            ),
            field_events: FieldEventService::new(repository, payments, storage, log, clock),
            admin: Actor::new(UserId::new(), Role::Admin),
            worker: Actor::new(UserId::new(), Role::Worker),
            task: None,
            last_check_in: None,
            last_check_out: None,
        }
    }

    /// Returns the scenario task, failing when no given step created one.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for FieldEventWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> FieldEventWorld {
    FieldEventWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
