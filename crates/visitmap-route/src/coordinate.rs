//! Coordinate types shared by the resolver, normalizer and presenter.

use serde::Serialize;
use visitmap_core::Visit;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A plain latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_in_range(&self) -> bool {
        (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.lat)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.lng)
    }
}

/// A visit placed on the map by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Position of `source_visit` in the resolver's input.
    pub input_index: usize,
    pub source_visit: Visit,
}

/// A resolved coordinate after overlap spreading. `source_visit` is untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub input_index: usize,
    pub source_visit: Visit,
}

impl NormalizedCoordinate {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// How a visit's `location` text reads before any network lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralLocation {
    /// Two finite decimals inside the valid latitude/longitude ranges.
    Coordinate(LatLng),
    /// Two finite decimals, at least one of them out of range.
    OutOfRange(LatLng),
    /// Anything else; treated as a free-text address.
    Address,
}

/// Classify a `location` field as a literal `"lat,lng"` pair or an address.
///
/// The text is split on `,` and both halves trimmed. Exactly two parts that
/// both parse as finite `f64` make a literal pair.
#[must_use]
pub fn parse_literal(location: &str) -> LiteralLocation {
    let parts: Vec<&str> = location.split(',').map(str::trim).collect();
    let [lat_raw, lng_raw] = *parts.as_slice() else {
        return LiteralLocation::Address;
    };

    let parse = |raw: &str| raw.parse::<f64>().ok().filter(|v| v.is_finite());
    let (Some(lat), Some(lng)) = (parse(lat_raw), parse(lng_raw)) else {
        return LiteralLocation::Address;
    };

    let point = LatLng::new(lat, lng);
    if point.is_in_range() {
        LiteralLocation::Coordinate(point)
    } else {
        LiteralLocation::OutOfRange(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_pair() {
        assert_eq!(
            parse_literal(" -6.2 , 106.8 "),
            LiteralLocation::Coordinate(LatLng::new(-6.2, 106.8))
        );
    }

    #[test]
    fn accepts_range_boundaries() {
        assert_eq!(
            parse_literal("90,-180"),
            LiteralLocation::Coordinate(LatLng::new(90.0, -180.0))
        );
        assert_eq!(
            parse_literal("-90,180"),
            LiteralLocation::Coordinate(LatLng::new(-90.0, 180.0))
        );
    }

    #[test]
    fn flags_out_of_range_pair() {
        assert_eq!(
            parse_literal("200,10"),
            LiteralLocation::OutOfRange(LatLng::new(200.0, 10.0))
        );
        assert_eq!(
            parse_literal("10,-180.5"),
            LiteralLocation::OutOfRange(LatLng::new(10.0, -180.5))
        );
    }

    #[test]
    fn address_text_is_not_literal() {
        assert_eq!(
            parse_literal("Jl. Sudirman 1, Jakarta"),
            LiteralLocation::Address
        );
        assert_eq!(parse_literal("Jakarta"), LiteralLocation::Address);
        assert_eq!(parse_literal("1,2,3"), LiteralLocation::Address);
        assert_eq!(parse_literal("1,"), LiteralLocation::Address);
    }

    #[test]
    fn non_finite_numbers_are_not_literal() {
        assert_eq!(parse_literal("NaN,1"), LiteralLocation::Address);
        assert_eq!(parse_literal("inf,1"), LiteralLocation::Address);
    }
}
