//! When steps for field-event BDD scenarios.

use super::world::{FieldEventWorld, run_async};
use rstest_bdd_macros::when;
use waymark::task::services::{CheckInRequest, CheckOutRequest};

#[when(r#"the worker checks in from coordinates "{latitude}" and "{longitude}""#)]
fn worker_checks_in(
    world: &mut FieldEventWorld,
    latitude: String,
    longitude: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let worker = world.worker;
    let result = run_async(
        world
            .field_events
            .check_in(&worker, CheckInRequest::new(task_id, latitude, longitude)),
    );
    if let Ok(ref outcome) = result {
        world.task = Some(outcome.task.clone());
    }
    world.last_check_in = Some(result);
    Ok(())
}

#[when(r#"the worker checks out collecting "{amount}""#)]
fn worker_checks_out_collecting(
    world: &mut FieldEventWorld,
    amount: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let worker = world.worker;
    let request = CheckOutRequest::new(task_id, "51.5", "-0.12")
        .with_payment_collected()
        .with_payment_amount(amount);
    let result = run_async(world.field_events.check_out(&worker, request));
    if let Ok(ref outcome) = result {
        world.task = Some(outcome.task.clone());
    }
    world.last_check_out = Some(result);
    Ok(())
}
