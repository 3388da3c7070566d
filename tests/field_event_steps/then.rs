//! Then steps for field-event BDD scenarios.

use super::world::FieldEventWorld;
use rstest_bdd_macros::then;
use waymark::task::{
    domain::{TaskDomainError, TaskStatus},
    services::FieldEventError,
};

#[then("the check-in succeeds")]
fn check_in_succeeds(world: &FieldEventWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_check_in
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing check-in result"))?;
    if let Err(err) = result {
        return Err(eyre::eyre!("expected a successful check-in, got {err:?}"));
    }
    Ok(())
}

#[then("the check-in is rejected as not assigned")]
fn check_in_rejected_not_assigned(world: &FieldEventWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_check_in
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing check-in result"))?;
    if !matches!(
        result,
        Err(FieldEventError::Domain(TaskDomainError::NotAssigned { .. }))
    ) {
        return Err(eyre::eyre!("expected NotAssigned error, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &FieldEventWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then("no warnings are reported")]
fn no_warnings_reported(world: &FieldEventWorld) -> Result<(), eyre::Report> {
    let Some(Ok(outcome)) = world.last_check_in.as_ref() else {
        return Err(eyre::eyre!("missing successful check-in outcome"));
    };
    if !outcome.warnings.is_empty() {
        return Err(eyre::eyre!("unexpected warnings: {:?}", outcome.warnings));
    }
    Ok(())
}

#[then("a distance warning is reported")]
fn distance_warning_reported(world: &FieldEventWorld) -> Result<(), eyre::Report> {
    let Some(Ok(outcome)) = world.last_check_in.as_ref() else {
        return Err(eyre::eyre!("missing successful check-in outcome"));
    };
    if !outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("from task location"))
    {
        return Err(eyre::eyre!(
            "expected a distance warning, got {:?}",
            outcome.warnings
        ));
    }
    Ok(())
}

#[then("the check-out succeeds with a payment mismatch warning")]
fn check_out_succeeds_with_mismatch(world: &FieldEventWorld) -> Result<(), eyre::Report> {
    let Some(result) = world.last_check_out.as_ref() else {
        return Err(eyre::eyre!("missing check-out result"));
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return Err(eyre::eyre!("expected a successful check-out, got {err:?}")),
    };
    if outcome.payment.is_none() {
        return Err(eyre::eyre!("expected a payment record"));
    }
    if !outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("more than 10%"))
    {
        return Err(eyre::eyre!(
            "expected a mismatch warning, got {:?}",
            outcome.warnings
        ));
    }
    Ok(())
}
