//! Application services orchestrating tasks, payments, attachments, and the
//! activity log.

mod field_event;
mod lifecycle;
mod state_machine;

pub use field_event::{
    CheckInOutcome, CheckInRequest, CheckOutOutcome, CheckOutRequest, FieldEventError,
    FieldEventResult, FieldEventService, FileUpload,
};
pub use lifecycle::{
    CreateTaskRequest, TaskDetails, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use state_machine::{TaskStateMachine, TaskStateMachineError, TaskStateMachineResult};
