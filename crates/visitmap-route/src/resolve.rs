//! Coordinate resolution for visit lists.
//!
//! Each visit is placed either from a literal `"lat,lng"` location or through
//! the [`Geocoder`]. Visits are processed strictly in input order, one at a
//! time; a visit that cannot be placed is dropped and recorded as a
//! [`ResolutionFailure`] without affecting the rest of the pass.

use std::fmt;
use std::time::Duration;

use visitmap_core::{AppConfig, Visit};
use visitmap_geocode::{GeocodeOutcome, Geocoder};

use crate::coordinate::{parse_literal, LatLng, LiteralLocation, ResolvedCoordinate};
use crate::throttle::Throttle;

/// Pacing and timeout policy for one resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Minimum spacing between consecutive geocoder lookups in a pass.
    pub throttle_interval: Duration,
    /// Upper bound on a single lookup; on expiry the visit is dropped.
    pub lookup_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_secs(1),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            throttle_interval: Duration::from_millis(config.geocoder_throttle_ms),
            lookup_timeout: Duration::from_secs(config.geocoder_timeout_secs),
        }
    }
}

/// Why a visit was left off the map.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The location was a numeric pair outside the valid ranges.
    OutOfRange { latitude: f64, longitude: f64 },
    NotFound,
    Transport(String),
    TimedOut,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::OutOfRange {
                latitude,
                longitude,
            } => write!(f, "coordinate {latitude},{longitude} is out of range"),
            FailureReason::NotFound => write!(f, "address not found"),
            FailureReason::Transport(msg) => write!(f, "geocoder error: {msg}"),
            FailureReason::TimedOut => write!(f, "geocoder lookup timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub visit_id: i64,
    pub input_index: usize,
    pub reason: FailureReason,
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    /// Successfully placed visits, in input order.
    pub coordinates: Vec<ResolvedCoordinate>,
    /// Number of visits the pass was given.
    pub attempted: usize,
    pub failures: Vec<ResolutionFailure>,
}

impl ResolveReport {
    #[must_use]
    pub fn mapped(&self) -> usize {
        self.coordinates.len()
    }

    /// "N of M mapped".
    #[must_use]
    pub fn mapped_summary(&self) -> String {
        format!("{} of {} mapped", self.mapped(), self.attempted)
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<ResolvedCoordinate>, usize) {
        (self.coordinates, self.attempted)
    }
}

/// Turns visits into coordinates through literal parsing or geocoding.
pub struct Resolver<G> {
    geocoder: G,
    config: ResolverConfig,
}

impl<G: Geocoder> Resolver<G> {
    pub fn new(geocoder: G, config: ResolverConfig) -> Self {
        Self { geocoder, config }
    }

    #[must_use]
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Resolves every visit in order and reports what could be placed.
    ///
    /// Literal in-range pairs never touch the network or wait. Address
    /// lookups run one at a time, spaced by `throttle_interval`, each bounded
    /// by `lookup_timeout`. An empty input returns immediately.
    pub async fn resolve(&self, visits: &[Visit]) -> ResolveReport {
        let mut report = ResolveReport {
            coordinates: Vec::with_capacity(visits.len()),
            attempted: visits.len(),
            failures: Vec::new(),
        };
        if visits.is_empty() {
            return report;
        }

        let mut throttle = Throttle::new(self.config.throttle_interval);

        for (input_index, visit) in visits.iter().enumerate() {
            match self.resolve_one(visit, &mut throttle).await {
                Ok(point) => report.coordinates.push(ResolvedCoordinate {
                    latitude: point.lat,
                    longitude: point.lng,
                    input_index,
                    source_visit: visit.clone(),
                }),
                Err(reason) => {
                    tracing::warn!(
                        visit_id = visit.id,
                        location = %visit.location,
                        reason = %reason,
                        "visit could not be placed on the map"
                    );
                    report.failures.push(ResolutionFailure {
                        visit_id: visit.id,
                        input_index,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            mapped = report.mapped(),
            attempted = report.attempted,
            "resolution pass finished"
        );
        report
    }

    async fn resolve_one(
        &self,
        visit: &Visit,
        throttle: &mut Throttle,
    ) -> Result<LatLng, FailureReason> {
        let address = match parse_literal(&visit.location) {
            LiteralLocation::Coordinate(point) => return Ok(point),
            LiteralLocation::OutOfRange(point) => {
                return Err(FailureReason::OutOfRange {
                    latitude: point.lat,
                    longitude: point.lng,
                });
            }
            LiteralLocation::Address => visit.location.trim(),
        };

        throttle.acquire().await;
        let lookup = self.geocoder.geocode(address);
        match tokio::time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(GeocodeOutcome::Found {
                latitude,
                longitude,
            }) => Ok(LatLng::new(latitude, longitude)),
            Ok(GeocodeOutcome::NotFound) => Err(FailureReason::NotFound),
            Ok(GeocodeOutcome::TransportError(msg)) => Err(FailureReason::Transport(msg)),
            Err(_elapsed) => Err(FailureReason::TimedOut),
        }
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
