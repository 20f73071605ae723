//! The `route` command: visits file in, GeoJSON route out.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tokio::sync::Mutex;
use visitmap_core::{AppConfig, Visit};
use visitmap_geocode::NominatimClient;
use visitmap_route::{
    parse_literal, refresh, GeoJsonFactory, GeoJsonSurface, LiteralLocation, PassOutcome,
    Resolver, ResolverConfig, RouteView, ViewState,
};

/// How a single visit would be resolved, decided without any I/O.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlannedResolution {
    Literal { latitude: f64, longitude: f64 },
    OutOfRange,
    Geocode,
}

pub(crate) fn plan_resolution(visits: &[Visit]) -> Vec<(i64, PlannedResolution)> {
    visits
        .iter()
        .map(|visit| {
            let planned = match parse_literal(&visit.location) {
                LiteralLocation::Coordinate(p) => PlannedResolution::Literal {
                    latitude: p.lat,
                    longitude: p.lng,
                },
                LiteralLocation::OutOfRange(_) => PlannedResolution::OutOfRange,
                LiteralLocation::Address => PlannedResolution::Geocode,
            };
            (visit.id, planned)
        })
        .collect()
}

/// Resolve, normalize and draw `visits_path`, then write the GeoJSON.
///
/// Unresolvable visits are listed on stderr and left off the route; they
/// never fail the command.
///
/// # Errors
///
/// Returns an error if the visits file is unreadable or invalid, the
/// geocoder client cannot be built, or the output cannot be written.
pub(crate) async fn run_route(
    config: &AppConfig,
    visits_path: &Path,
    out: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let visits = visitmap_core::load_visits(visits_path)?;

    if dry_run {
        let plan = plan_resolution(&visits);
        let lookups = plan
            .iter()
            .filter(|(_, p)| matches!(p, PlannedResolution::Geocode))
            .count();
        for (visit_id, planned) in &plan {
            match planned {
                PlannedResolution::Literal {
                    latitude,
                    longitude,
                } => println!("visit {visit_id}: literal {latitude},{longitude}"),
                PlannedResolution::OutOfRange => {
                    println!("visit {visit_id}: out-of-range coordinate, will be skipped");
                }
                PlannedResolution::Geocode => println!("visit {visit_id}: needs geocoding"),
            }
        }
        println!(
            "dry-run: {} visits, {lookups} geocoding lookups (at least {}ms apart)",
            visits.len(),
            config.geocoder_throttle_ms
        );
        return Ok(());
    }

    let client = NominatimClient::new(
        &config.geocoder_url,
        &config.geocoder_user_agent,
        config.geocoder_timeout_secs,
    )
    .context("failed to build geocoding client")?;
    let resolver = Resolver::new(client, ResolverConfig::from_app_config(config));

    let view = build_route(&resolver, &visits, config.map_padding_px).await;
    let collection = route_collection(&view);

    match out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_collection(std::io::BufWriter::new(file), &collection)?;
            println!("wrote route to {}", path.display());
        }
        None => write_collection(std::io::stdout().lock(), &collection)?,
    }

    Ok(())
}

/// Run one pass to completion and report the outcome on stderr.
pub(crate) async fn build_route<G>(
    resolver: &Resolver<G>,
    visits: &[Visit],
    padding_px: u32,
) -> RouteView<GeoJsonFactory>
where
    G: visitmap_geocode::Geocoder,
{
    let view = Mutex::new(
        RouteView::new(GeoJsonSurface::factory(), padding_px).with_resolved_count_callback(
            Box::new(|mapped: usize, attempted: usize| {
                eprintln!("{mapped} of {attempted} mapped");
            }),
        ),
    );

    let outcome = refresh(&view, resolver, visits).await;
    let view = view.into_inner();

    for failure in view.failures() {
        eprintln!(
            "  visit {} (#{}): {}",
            failure.visit_id,
            failure.input_index + 1,
            failure.reason
        );
    }

    match outcome {
        PassOutcome::Applied(ViewState::Empty { .. }) => eprintln!("no coordinates to map"),
        PassOutcome::Applied(_) => {}
        PassOutcome::Discarded { generation, current } => {
            tracing::warn!(generation, current, "route pass unexpectedly superseded");
        }
    }

    view
}

/// The drawn route, or an empty collection when nothing was mapped.
pub(crate) fn route_collection(view: &RouteView<GeoJsonFactory>) -> serde_json::Value {
    view.presenter().surface().map_or_else(
        || GeoJsonSurface::new().to_feature_collection(),
        GeoJsonSurface::to_feature_collection,
    )
}

pub(crate) fn write_collection<W: Write>(
    mut writer: W,
    collection: &serde_json::Value,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
