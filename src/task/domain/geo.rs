//! Geodesic distance computation and advisory location warnings.
//!
//! Pure functions: no persistence, no clock, no I/O. Warnings produced here
//! never block a check-in or check-out; they are returned to the actor and
//! persisted verbatim in the activity payload for later review.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distance beyond which a check-in/out earns an advisory warning.
pub const DISTANCE_WARNING_METERS: f64 = 100.0;

/// GPS accuracy radius beyond which the fix is flagged as low quality.
pub const ACCURACY_WARNING_METERS: f64 = 50.0;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a coordinate pair, validating the WGS84 ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCoordinates`] when either component
    /// is not finite or falls outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TaskDomainError> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(TaskDomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// Admin-set reference location for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLocation {
    point: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl TaskLocation {
    /// Creates a task location from a coordinate pair.
    #[must_use]
    pub const fn new(point: GeoPoint) -> Self {
        Self {
            point,
            address: None,
            name: None,
        }
    }

    /// Sets the human-readable address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the display name of the location.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the coordinate pair.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        self.point
    }

    /// Returns the address, if set.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the display name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A worker's live GPS fix at check-in/out time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    point: GeoPoint,
    accuracy_meters: Option<f64>,
}

impl GeoFix {
    /// Creates a fix without accuracy information.
    #[must_use]
    pub const fn new(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy_meters: None,
        }
    }

    /// Attaches the reported accuracy radius in meters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidAccuracy`] when the radius is
    /// negative or not finite.
    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Result<Self, TaskDomainError> {
        if !accuracy_meters.is_finite() || accuracy_meters < 0.0 {
            return Err(TaskDomainError::InvalidAccuracy(accuracy_meters));
        }
        self.accuracy_meters = Some(accuracy_meters);
        Ok(self)
    }

    /// Returns the fix coordinates.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        self.point
    }

    /// Returns the reported accuracy radius, if any.
    #[must_use]
    pub const fn accuracy_meters(&self) -> Option<f64> {
        self.accuracy_meters
    }
}

/// Outcome of verifying a worker's fix against a task's reference location.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoVerification {
    distance_meters: Option<f64>,
    warnings: Vec<String>,
}

impl GeoVerification {
    /// Distance from the task's reference point, absent when the task has no
    /// location set.
    #[must_use]
    pub const fn distance_meters(&self) -> Option<f64> {
        self.distance_meters
    }

    /// Advisory warnings derived from the fix.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consumes the verification, returning the warning list.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// Great-circle distance in meters between two coordinates (haversine).
#[must_use]
pub fn haversine_distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let delta_phi = (b.latitude() - a.latitude()).to_radians();
    let delta_lambda = (b.longitude() - a.longitude()).to_radians();

    let half_chord = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let angular_distance = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
    EARTH_RADIUS_METERS * angular_distance
}

/// Verifies a worker's fix against an optional task reference point.
///
/// A task without a reference location skips the distance check entirely:
/// location-optional tasks are legal and produce no distance warning. A
/// distance of exactly [`DISTANCE_WARNING_METERS`] does not warn.
#[must_use]
pub fn verify(fix: &GeoFix, reference: Option<GeoPoint>) -> GeoVerification {
    let mut warnings = Vec::new();

    let distance_meters = reference.map(|point| haversine_distance_meters(fix.point(), point));
    if let Some(distance) = distance_meters {
        if distance > DISTANCE_WARNING_METERS {
            warnings.push(format!("worker is {distance:.0}m from task location"));
        }
    }

    if let Some(accuracy) = fix.accuracy_meters() {
        if accuracy > ACCURACY_WARNING_METERS {
            warnings.push("low GPS accuracy".to_owned());
        }
    }

    GeoVerification {
        distance_meters,
        warnings,
    }
}
