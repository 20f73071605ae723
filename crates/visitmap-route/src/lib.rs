//! Visit route mapping: resolve visit locations to coordinates, spread
//! overlapping points apart, and draw the numbered route on a map surface.
//!
//! Data flows one way:
//! visits → [`Resolver`] → [`normalize`] → [`RoutePresenter`].
//! [`RouteView`] hosts the pipeline for one mounted view and discards results
//! from superseded passes.

pub mod coordinate;
pub mod geojson;
pub mod normalize;
pub mod popup;
pub mod presenter;
pub mod resolve;
pub mod surface;
mod throttle;
pub mod view;

pub use coordinate::{
    parse_literal, LatLng, LiteralLocation, NormalizedCoordinate, ResolvedCoordinate,
};
pub use geojson::{GeoJsonFactory, GeoJsonSurface, Viewport};
pub use normalize::{location_key, normalize};
pub use popup::{format_time_range, Popup};
pub use presenter::{Presentation, RoutePresenter};
pub use resolve::{FailureReason, ResolutionFailure, ResolveReport, Resolver, ResolverConfig};
pub use surface::{Bounds, LayerId, MapSurface, MarkerIcon, SurfaceFactory};
pub use view::{refresh, PassOutcome, PassTicket, ResolvedCountCallback, RouteView, ViewState};
