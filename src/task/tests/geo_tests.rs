//! Unit tests for coordinate validation, haversine distance, and fix
//! verification.

use crate::task::domain::{
    GeoFix, GeoPoint, TaskDomainError, geo::haversine_distance_meters, geo::verify,
};
use eyre::ensure;
use rstest::rstest;

// One degree of longitude on the equator.
const ONE_DEGREE_EQUATOR_METERS: f64 = 111_195.0;

#[rstest]
#[case(91.0, 0.0)]
#[case(-91.0, 0.0)]
#[case(0.0, 181.0)]
#[case(0.0, -181.0)]
#[case(f64::NAN, 0.0)]
#[case(0.0, f64::INFINITY)]
fn point_rejects_out_of_range_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
    assert!(matches!(
        GeoPoint::new(latitude, longitude),
        Err(TaskDomainError::InvalidCoordinates { .. })
    ));
}

#[rstest]
#[case(90.0, 180.0)]
#[case(-90.0, -180.0)]
#[case(0.0, 0.0)]
fn point_accepts_boundary_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
    assert!(GeoPoint::new(latitude, longitude).is_ok());
}

#[rstest]
fn distance_to_self_is_zero() -> eyre::Result<()> {
    let point = GeoPoint::new(51.5074, -0.1278)?;
    let distance = haversine_distance_meters(point, point);
    ensure!(distance.abs() < 1e-6, "expected zero, got {distance}");
    Ok(())
}

#[rstest]
fn one_equatorial_degree_is_about_111_kilometres() -> eyre::Result<()> {
    let a = GeoPoint::new(0.0, 0.0)?;
    let b = GeoPoint::new(0.0, 1.0)?;
    let distance = haversine_distance_meters(a, b);
    let tolerance = ONE_DEGREE_EQUATOR_METERS * 0.01;
    ensure!(
        (distance - ONE_DEGREE_EQUATOR_METERS).abs() < tolerance,
        "expected ~{ONE_DEGREE_EQUATOR_METERS}, got {distance}"
    );
    Ok(())
}

#[rstest]
fn distance_is_symmetric() -> eyre::Result<()> {
    let a = GeoPoint::new(48.8566, 2.3522)?;
    let b = GeoPoint::new(52.5200, 13.4050)?;
    let forward = haversine_distance_meters(a, b);
    let backward = haversine_distance_meters(b, a);
    ensure!((forward - backward).abs() < 1e-6);
    Ok(())
}

#[rstest]
fn fix_rejects_negative_accuracy() -> eyre::Result<()> {
    let fix = GeoFix::new(GeoPoint::new(0.0, 0.0)?);
    assert!(matches!(
        fix.with_accuracy(-1.0),
        Err(TaskDomainError::InvalidAccuracy(_))
    ));
    Ok(())
}

#[rstest]
fn nearby_fix_produces_no_warnings() -> eyre::Result<()> {
    // ~55m north of the reference point.
    let fix = GeoFix::new(GeoPoint::new(0.0005, 0.0)?);
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    ensure!(verification.warnings().is_empty());
    let distance = verification.distance_meters().unwrap_or(f64::MAX);
    ensure!(distance < 100.0, "expected <100m, got {distance}");
    Ok(())
}

#[rstest]
fn distant_fix_warns_with_rounded_distance() -> eyre::Result<()> {
    // ~1112m north of the reference point.
    let fix = GeoFix::new(GeoPoint::new(0.01, 0.0)?);
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    ensure!(verification.warnings().len() == 1);
    let warning = verification.warnings().first().cloned().unwrap_or_default();
    ensure!(warning.starts_with("worker is "), "got: {warning}");
    ensure!(warning.ends_with("m from task location"), "got: {warning}");
    Ok(())
}

#[rstest]
fn fix_just_inside_the_distance_threshold_does_not_warn() -> eyre::Result<()> {
    // ~99.9m north of the reference point.
    let fix = GeoFix::new(GeoPoint::new(0.000_898, 0.0)?);
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    let distance = verification.distance_meters().unwrap_or(f64::MAX);
    ensure!(distance < 100.0, "expected <100m, got {distance}");
    ensure!(verification.warnings().is_empty());
    Ok(())
}

#[rstest]
fn fix_just_beyond_the_distance_threshold_warns() -> eyre::Result<()> {
    // ~100.1m north of the reference point.
    let fix = GeoFix::new(GeoPoint::new(0.000_9, 0.0)?);
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    let distance = verification.distance_meters().unwrap_or(0.0);
    ensure!(distance > 100.0, "expected >100m, got {distance}");
    ensure!(verification.warnings() == ["worker is 100m from task location".to_owned()]);
    Ok(())
}

#[rstest]
fn imprecise_fix_warns_about_accuracy() -> eyre::Result<()> {
    let fix = GeoFix::new(GeoPoint::new(0.0, 0.0)?).with_accuracy(50.1)?;
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    ensure!(verification.warnings() == ["low GPS accuracy".to_owned()]);
    Ok(())
}

#[rstest]
fn accuracy_of_exactly_fifty_meters_does_not_warn() -> eyre::Result<()> {
    let fix = GeoFix::new(GeoPoint::new(0.0, 0.0)?).with_accuracy(50.0)?;

    let verification = verify(&fix, Some(GeoPoint::new(0.0, 0.0)?));

    ensure!(verification.warnings().is_empty());
    Ok(())
}

#[rstest]
fn distant_imprecise_fix_collects_both_warnings() -> eyre::Result<()> {
    let fix = GeoFix::new(GeoPoint::new(0.01, 0.0)?).with_accuracy(120.0)?;
    let reference = GeoPoint::new(0.0, 0.0)?;

    let verification = verify(&fix, Some(reference));

    ensure!(verification.warnings().len() == 2);
    Ok(())
}

#[rstest]
fn fix_without_reference_skips_the_distance_check() -> eyre::Result<()> {
    let fix = GeoFix::new(GeoPoint::new(89.0, 179.0)?);

    let verification = verify(&fix, None);

    ensure!(verification.distance_meters().is_none());
    ensure!(verification.warnings().is_empty());
    Ok(())
}
