//! Overlap spreading for coordinates that would render on top of each other.
//!
//! Coordinates are bucketed by a rounded location key (5 decimal places,
//! roughly 1.1 m). The first coordinate in a bucket stays put; later ones are
//! pushed out around it on a six-slot ring of radius `0.0001°` (about 11 m).

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::coordinate::{NormalizedCoordinate, ResolvedCoordinate};

/// Ring radius in decimal degrees.
pub const OVERLAP_OFFSET_DEGREES: f64 = 0.0001;

/// Slots per ring before the next, wider ring is used.
pub const RING_SLOTS: usize = 6;

/// Rounded location key: latitude and longitude to 5 decimal places.
#[must_use]
pub fn location_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.5},{longitude:.5}")
}

/// Offset for the `occurrence`-th coordinate (0-indexed) sharing a key.
///
/// Occurrences 1 through 6 sit on the first ring at angle `k · 2π/6`.
/// Beyond that the angles repeat, so every further group of six moves out by
/// one more radius to keep the markers apart.
fn ring_offset(occurrence: usize) -> (f64, f64) {
    if occurrence == 0 {
        return (0.0, 0.0);
    }
    let ring = (occurrence - 1) / RING_SLOTS;
    #[allow(clippy::cast_precision_loss)]
    let angle = occurrence as f64 * 2.0 * PI / RING_SLOTS as f64;
    #[allow(clippy::cast_precision_loss)]
    let radius = OVERLAP_OFFSET_DEGREES * (ring + 1) as f64;
    (radius * angle.cos(), radius * angle.sin())
}

/// Spread coordinates that share a rounded location key.
///
/// Order-preserving and deterministic: the same input always yields the same
/// output, bit for bit. Coordinates with a unique key are returned unchanged.
#[must_use]
pub fn normalize(coords: Vec<ResolvedCoordinate>) -> Vec<NormalizedCoordinate> {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(coords.len());

    coords
        .into_iter()
        .map(|coord| {
            let counter = seen
                .entry(location_key(coord.latitude, coord.longitude))
                .or_insert(0);
            let occurrence = *counter;
            *counter += 1;

            let (d_lat, d_lng) = ring_offset(occurrence);
            NormalizedCoordinate {
                latitude: coord.latitude + d_lat,
                longitude: coord.longitude + d_lng,
                input_index: coord.input_index,
                source_visit: coord.source_visit,
            }
        })
        .collect()
}
