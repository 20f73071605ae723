//! Draws a normalized route onto a map surface.

use crate::coordinate::{LatLng, NormalizedCoordinate};
use crate::popup::Popup;
use crate::surface::{Bounds, LayerId, MapSurface, MarkerIcon, SurfaceFactory};

pub const DEFAULT_PADDING_PX: u32 = 50;

/// What the host view should show after a [`RoutePresenter::present`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// No coordinates: show the "no coordinates" placeholder instead of a map.
    Placeholder,
    Route { markers: usize, segments: usize },
}

/// Owns the map surface of one mounted view.
///
/// The surface is created lazily on the first non-empty route and reused for
/// every later one. Each call to [`present`](Self::present) removes all
/// previously drawn layers before drawing the new route. Dropping the
/// presenter tears the surface down.
pub struct RoutePresenter<F: SurfaceFactory> {
    factory: F,
    surface: Option<F::Surface>,
    layers: Vec<LayerId>,
    padding_px: u32,
}

impl<F: SurfaceFactory> RoutePresenter<F> {
    pub fn new(factory: F, padding_px: u32) -> Self {
        Self {
            factory,
            surface: None,
            layers: Vec::new(),
            padding_px,
        }
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.surface.as_ref()
    }

    /// Replaces whatever is drawn with the given route.
    ///
    /// Markers are numbered by 1-based position; the path is drawn only for
    /// two or more stops; the viewport is fitted to every marker.
    pub fn present(&mut self, coords: &[NormalizedCoordinate]) -> Presentation {
        self.clear();

        if coords.is_empty() {
            return Presentation::Placeholder;
        }

        let factory = &self.factory;
        let surface = self.surface.get_or_insert_with(|| {
            tracing::debug!("creating map surface");
            factory.create_surface()
        });

        let path: Vec<LatLng> = coords.iter().map(NormalizedCoordinate::position).collect();

        for (i, coord) in coords.iter().enumerate() {
            let marker = surface.add_marker(coord.position(), MarkerIcon::numbered(i + 1));
            surface.bind_popup(marker, Popup::for_visit(&coord.source_visit));
            self.layers.push(marker);
        }

        let segments = path.len().saturating_sub(1);
        if segments > 0 {
            self.layers.push(surface.add_polyline(&path));
        }

        if let Some(bounds) = Bounds::from_points(path.iter().copied()) {
            surface.fit_bounds(bounds, self.padding_px);
        }

        Presentation::Route {
            markers: coords.len(),
            segments,
        }
    }

    /// Removes every marker and path this presenter has drawn.
    fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            for layer in self.layers.drain(..) {
                surface.remove_layer(layer);
            }
        }
        self.layers.clear();
    }

    /// Destroys the surface. A later `present` creates a fresh one.
    pub fn teardown(&mut self) {
        self.layers.clear();
        if let Some(mut surface) = self.surface.take() {
            tracing::debug!("tearing down map surface");
            surface.teardown();
        }
    }
}

impl<F: SurfaceFactory> Drop for RoutePresenter<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
