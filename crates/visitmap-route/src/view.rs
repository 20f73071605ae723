//! Host-view state for one mounted route map.
//!
//! Every resolution pass is stamped with a generation number when it is
//! dispatched. A finished pass is applied only if its generation is still the
//! latest one; otherwise its result is dropped. Whichever input was requested
//! last wins, regardless of which pass finishes last.

use tokio::sync::Mutex;
use visitmap_core::Visit;
use visitmap_geocode::Geocoder;

use crate::normalize::normalize;
use crate::presenter::{Presentation, RoutePresenter};
use crate::resolve::{ResolutionFailure, ResolveReport, Resolver};
use crate::surface::SurfaceFactory;

/// Called with `(mapped, attempted)` each time a pass is applied.
pub type ResolvedCountCallback = Box<dyn FnMut(usize, usize) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing requested yet, or the view was torn down.
    Idle,
    Loading { generation: u64 },
    /// The last pass placed no visits; show the placeholder.
    Empty { attempted: usize },
    Ready {
        mapped: usize,
        attempted: usize,
        segments: usize,
    },
}

/// Proof of dispatch for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    generation: u64,
}

impl PassTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Applied(ViewState),
    /// A newer pass was dispatched (or the view torn down) meanwhile.
    Discarded { generation: u64, current: u64 },
}

pub struct RouteView<F: SurfaceFactory> {
    generation: u64,
    state: ViewState,
    presenter: RoutePresenter<F>,
    failures: Vec<ResolutionFailure>,
    on_resolved_count: Option<ResolvedCountCallback>,
}

impl<F: SurfaceFactory> RouteView<F> {
    pub fn new(factory: F, padding_px: u32) -> Self {
        Self {
            generation: 0,
            state: ViewState::Idle,
            presenter: RoutePresenter::new(factory, padding_px),
            failures: Vec::new(),
            on_resolved_count: None,
        }
    }

    #[must_use]
    pub fn with_resolved_count_callback(mut self, callback: ResolvedCountCallback) -> Self {
        self.on_resolved_count = Some(callback);
        self
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Visits left off the map by the last applied pass.
    pub fn failures(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    pub fn presenter(&self) -> &RoutePresenter<F> {
        &self.presenter
    }

    pub fn is_current(&self, ticket: PassTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Registers a new pass and supersedes any pass still in flight.
    pub fn begin_pass(&mut self) -> PassTicket {
        self.generation += 1;
        self.state = ViewState::Loading {
            generation: self.generation,
        };
        tracing::debug!(generation = self.generation, "route pass dispatched");
        PassTicket {
            generation: self.generation,
        }
    }

    /// Applies a finished pass if it is still the latest one.
    pub fn complete_pass(&mut self, ticket: PassTicket, report: ResolveReport) -> PassOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale route pass"
            );
            return PassOutcome::Discarded {
                generation: ticket.generation,
                current: self.generation,
            };
        }

        let mapped = report.mapped();
        let attempted = report.attempted;
        self.failures = report.failures;
        let normalized = normalize(report.coordinates);

        self.state = match self.presenter.present(&normalized) {
            Presentation::Placeholder => ViewState::Empty { attempted },
            Presentation::Route { markers, segments } => ViewState::Ready {
                mapped: markers,
                attempted,
                segments,
            },
        };

        if let Some(callback) = self.on_resolved_count.as_mut() {
            callback(mapped, attempted);
        }

        tracing::info!(
            generation = ticket.generation,
            mapped,
            attempted,
            "route pass applied"
        );
        PassOutcome::Applied(self.state)
    }

    /// Unmounts the view: destroys the surface and invalidates in-flight passes.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.state = ViewState::Idle;
        self.failures.clear();
        self.presenter.teardown();
    }
}

/// Runs one full pass for `visits` against a shared view.
///
/// The view lock is held only to dispatch and to apply, never across the
/// resolution itself, so a later call can supersede this one mid-flight.
pub async fn refresh<G, F>(
    view: &Mutex<RouteView<F>>,
    resolver: &Resolver<G>,
    visits: &[Visit],
) -> PassOutcome
where
    G: Geocoder,
    F: SurfaceFactory,
{
    let ticket = view.lock().await.begin_pass();
    let report = resolver.resolve(visits).await;
    view.lock().await.complete_pass(ticket, report)
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
