use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;

/// Result of a single best-match address lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found { latitude: f64, longitude: f64 },
    NotFound,
    /// Network, status, or parse failure. Callers treat it like `NotFound`.
    TransportError(String),
}

impl GeocodeOutcome {
    /// The coordinate pair when the lookup found a match.
    #[must_use]
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match self {
            GeocodeOutcome::Found {
                latitude,
                longitude,
            } => Some((*latitude, *longitude)),
            GeocodeOutcome::NotFound | GeocodeOutcome::TransportError(_) => None,
        }
    }
}

/// Free-text address to coordinate capability.
///
/// Implementations return at most one match and never fail: every transport
/// or decoding problem is folded into [`GeocodeOutcome::TransportError`].
pub trait Geocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = GeocodeOutcome> + Send;
}

impl<G: Geocoder + Send + Sync> Geocoder for Arc<G> {
    fn geocode(&self, address: &str) -> impl Future<Output = GeocodeOutcome> + Send {
        (**self).geocode(address)
    }
}

impl<G: Geocoder + Sync> Geocoder for &G {
    fn geocode(&self, address: &str) -> impl Future<Output = GeocodeOutcome> + Send {
        (**self).geocode(address)
    }
}

/// One entry of a Nominatim `/search?format=json` response.
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
