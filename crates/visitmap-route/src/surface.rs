//! The map rendering capability the presenter drives.

use serde::Serialize;

use crate::coordinate::LatLng;
use crate::popup::Popup;

/// Handle for a marker or polyline placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

/// Custom marker content: a short label drawn inside a round badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub label: String,
    pub class_name: String,
    pub size_px: u32,
}

impl MarkerIcon {
    pub const NUMBERED_CLASS: &'static str = "visit-route-marker";
    pub const NUMBERED_SIZE_PX: u32 = 28;

    /// Badge showing the 1-based stop number.
    #[must_use]
    pub fn numbered(number: usize) -> Self {
        Self {
            label: number.to_string(),
            class_name: Self::NUMBERED_CLASS.to_string(),
            size_px: Self::NUMBERED_SIZE_PX,
        }
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds {
                    south: p.lat,
                    west: p.lng,
                    north: p.lat,
                    east: p.lng,
                },
                Some(b) => Bounds {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lng),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lng),
                },
            })
        })
    }

    #[must_use]
    pub fn contains(&self, p: LatLng) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lng)
    }
}

/// A tile-map primitive: markers with custom icons, polylines, popups,
/// viewport fitting, and teardown.
pub trait MapSurface {
    fn add_marker(&mut self, position: LatLng, icon: MarkerIcon) -> LayerId;
    fn bind_popup(&mut self, layer: LayerId, popup: Popup);
    fn add_polyline(&mut self, path: &[LatLng]) -> LayerId;
    fn remove_layer(&mut self, layer: LayerId);
    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32);
    /// Releases the surface. No other method is called afterwards.
    fn teardown(&mut self);
}

/// Creates map surfaces on demand.
pub trait SurfaceFactory {
    type Surface: MapSurface;

    fn create_surface(&self) -> Self::Surface;
}

impl<S, F> SurfaceFactory for F
where
    S: MapSurface,
    F: Fn() -> S,
{
    type Surface = S;

    fn create_surface(&self) -> S {
        self()
    }
}
