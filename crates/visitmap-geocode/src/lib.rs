//! Address-to-coordinate lookup for visit routes.
//!
//! [`Geocoder`] is the capability the route resolver depends on;
//! [`NominatimClient`] is the production implementation backed by an
//! OpenStreetMap Nominatim-compatible `/search` endpoint.

pub mod client;
pub mod error;
pub mod types;

pub use client::NominatimClient;
pub use error::GeocodeError;
pub use types::{GeocodeOutcome, Geocoder};
