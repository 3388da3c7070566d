//! Given steps for field-event BDD scenarios.

use super::world::{FieldEventWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use rust_decimal::Decimal;
use std::str::FromStr;
use waymark::task::{
    domain::{GeoPoint, TaskLocation, UserId},
    services::{CheckInRequest, CreateTaskRequest},
};

fn seed_ready_task(
    world: &mut FieldEventWorld,
    assignee: UserId,
) -> Result<(), eyre::Report> {
    let location = TaskLocation::new(GeoPoint::new(51.5, -0.12)?).with_name("Depot");
    let created = run_async(world.lifecycle.create_task(
        &world.admin,
        CreateTaskRequest::new("Depot maintenance visit")
            .with_location(location)
            .with_assignees([assignee]),
    ))
    .wrap_err("create task in scenario setup")?;
    let ready = run_async(world.lifecycle.mark_ready(&world.admin, created.id()))
        .wrap_err("release task in scenario setup")?;
    world.task = Some(ready);
    Ok(())
}

#[given("a ready task at the depot assigned to the worker")]
fn ready_task_assigned_to_worker(world: &mut FieldEventWorld) -> Result<(), eyre::Report> {
    let assignee = world.worker.user_id();
    seed_ready_task(world, assignee)
}

#[given("a ready task at the depot assigned to someone else")]
fn ready_task_assigned_elsewhere(world: &mut FieldEventWorld) -> Result<(), eyre::Report> {
    seed_ready_task(world, UserId::new())
}

#[given(r#"the task expects revenue of "{amount}""#)]
fn task_expects_revenue(
    world: &mut FieldEventWorld,
    amount: String,
) -> Result<(), eyre::Report> {
    let target = Decimal::from_str(&amount).wrap_err("invalid revenue amount in scenario")?;
    let task_id = world.task()?.id();
    let updated = run_async(
        world
            .lifecycle
            .set_expected_revenue(&world.admin, task_id, target),
    )
    .wrap_err("set expected revenue in scenario setup")?;
    world.task = Some(updated);
    Ok(())
}

#[given("the worker has checked in")]
fn worker_has_checked_in(world: &mut FieldEventWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let worker = world.worker;
    let outcome = run_async(
        world
            .field_events
            .check_in(&worker, CheckInRequest::new(task_id, "51.5", "-0.12")),
    )
    .wrap_err("check in during scenario setup")?;
    world.task = Some(outcome.task);
    Ok(())
}
