//! In-memory map surface that renders to a GeoJSON `FeatureCollection`.
//!
//! Used wherever the route leaves the process as data (CLI output, HTTP
//! responses) rather than being drawn by a browser map library. Marker and
//! path layers become `Point` and `LineString` features; the fitted viewport
//! is carried as a `bbox` plus a `viewport` foreign member.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::coordinate::LatLng;
use crate::popup::Popup;
use crate::surface::{Bounds, LayerId, MapSurface, MarkerIcon};

/// Factory producing fresh [`GeoJsonSurface`]s.
pub type GeoJsonFactory = fn() -> GeoJsonSurface;

#[derive(Debug, Clone, PartialEq)]
enum Layer {
    Marker {
        position: LatLng,
        icon: MarkerIcon,
        popup: Option<Popup>,
    },
    Polyline {
        path: Vec<LatLng>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bounds: Bounds,
    pub padding_px: u32,
}

#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    next_id: u64,
    layers: BTreeMap<LayerId, Layer>,
    viewport: Option<Viewport>,
    torn_down: bool,
}

impl GeoJsonSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory function usable as a [`crate::SurfaceFactory`].
    #[must_use]
    pub fn factory() -> GeoJsonFactory {
        GeoJsonSurface::new
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Marker { .. }))
            .count()
    }

    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Polyline { .. }))
            .count()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Serialises the current layers in drawing order.
    #[must_use]
    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self.layers.values().map(layer_feature).collect();

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });

        if let Some(viewport) = self.viewport {
            let b = viewport.bounds;
            collection["bbox"] = json!([b.west, b.south, b.east, b.north]);
            collection["viewport"] = json!({
                "bounds": b,
                "padding_px": viewport.padding_px,
            });
        }

        collection
    }
}

fn lng_lat(p: LatLng) -> Value {
    json!([p.lng, p.lat])
}

fn layer_feature(layer: &Layer) -> Value {
    match layer {
        Layer::Marker {
            position,
            icon,
            popup,
        } => json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": lng_lat(*position) },
            "properties": {
                "kind": "marker",
                "label": icon.label,
                "class_name": icon.class_name,
                "size_px": icon.size_px,
                "popup": popup,
            },
        }),
        Layer::Polyline { path } => json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": path.iter().copied().map(lng_lat).collect::<Vec<_>>(),
            },
            "properties": { "kind": "route" },
        }),
    }
}

impl MapSurface for GeoJsonSurface {
    fn add_marker(&mut self, position: LatLng, icon: MarkerIcon) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(
            id,
            Layer::Marker {
                position,
                icon,
                popup: None,
            },
        );
        id
    }

    fn bind_popup(&mut self, layer: LayerId, popup: Popup) {
        if let Some(Layer::Marker { popup: slot, .. }) = self.layers.get_mut(&layer) {
            *slot = Some(popup);
        }
    }

    fn add_polyline(&mut self, path: &[LatLng]) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(
            id,
            Layer::Polyline {
                path: path.to_vec(),
            },
        );
        id
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
        // The viewport was fitted to the removed layers; an empty map has none.
        if self.layers.is_empty() {
            self.viewport = None;
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32) {
        self.viewport = Some(Viewport { bounds, padding_px });
    }

    fn teardown(&mut self) {
        self.layers.clear();
        self.viewport = None;
        self.torn_down = true;
    }
}
