// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config and logging, then plan or scrape coverage

mod config;
mod errors;
mod models;
mod services;

use anyhow::{bail, Context};
use config::Config;
use dotenv::dotenv;
use services::cache::{start_cleanup_task, SearchCache};
use services::export;
use services::geo::Coordinate;
use services::grid_planner::{self, BoundingBox};
use services::places_client::PlacesClient;
use services::regions;
use services::scrape_service::{ScrapeOutcome, ScrapeService, ScrapeStats};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        // We continue but log error, or we could panic
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    log::info!("Starting gridscout...");
    log::info!("Environment: {}", config.environment);

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("could not create output dir {}", config.output_dir))?;

    // 4. Dispatch mode
    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(String::as_str).unwrap_or("scrape");

    match mode {
        "plan" => {
            let region = region_arg(&args, &config);
            let bounds = lookup_bounds(&region)?;
            plan(&config, &region, &bounds)
        }
        "scrape" => {
            let names: Vec<String> = region_arg(&args, &config)
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if names.is_empty() {
                bail!("no region given");
            }

            scrape(&config, &names).await
        }
        "point" => {
            let latitude: f64 = args
                .get(2)
                .context("usage: gridscout point <lat> <lng> [radius_m]")?
                .parse()
                .context("latitude must be a number")?;
            let longitude: f64 = args
                .get(3)
                .context("usage: gridscout point <lat> <lng> [radius_m]")?
                .parse()
                .context("longitude must be a number")?;
            let radius = match args.get(4) {
                Some(r) => Some(r.parse::<f64>().context("radius must be a number")?),
                None => None,
            };

            point(&config, Coordinate::new(latitude, longitude), radius).await
        }
        other => bail!("unknown mode '{}' (expected 'plan', 'scrape' or 'point')", other),
    }
}

fn region_arg(args: &[String], config: &Config) -> String {
    args.get(2)
        .cloned()
        .unwrap_or_else(|| config.region.clone())
}

fn lookup_bounds(region: &str) -> anyhow::Result<BoundingBox> {
    regions::region_bounds(region).with_context(|| {
        format!(
            "unknown region '{}' (known regions: {})",
            region,
            regions::known_regions().join(", ")
        )
    })
}

/// Write the coverage plan as GeoJSON without touching the network
fn plan(config: &Config, region: &str, bounds: &BoundingBox) -> anyhow::Result<()> {
    let dims = grid_planner::bounds_dimensions(bounds);
    let base = grid_planner::generate_sub_grids(bounds)?;
    let cells = grid_planner::calculate_optimal_grid_system(bounds)?;

    let path = PathBuf::from(&config.output_dir).join(format!("grid-{}.geojson", region));
    export::write_feature_collection(&path, &export::cells_to_feature_collection(&cells))?;

    println!(
        "Region {}: {:.1} km x {:.1} km",
        region,
        dims.width_meters / 1000.0,
        dims.height_meters / 1000.0
    );
    println!(
        "Base grid {} cells, coverage plan {} cells -> {}",
        base.len(),
        cells.len(),
        path.display()
    );

    Ok(())
}

/// Full scrape of one or more named regions
async fn scrape(config: &Config, names: &[String]) -> anyhow::Result<()> {
    let (client, cache) = build_client(config)?;

    let outcomes = if names.len() == 1 {
        let bounds = lookup_bounds(&names[0])?;
        vec![
            ScrapeService::scrape_region(
                &client,
                &names[0],
                &bounds,
                config.place_type.as_deref(),
                config.keyword.as_deref(),
            )
            .await?,
        ]
    } else {
        ScrapeService::scrape_regions(
            &client,
            names,
            config.place_type.as_deref(),
            config.keyword.as_deref(),
        )
        .await
    };

    for outcome in &outcomes {
        write_outputs(config, outcome)?;
        print_summary(outcome);
    }

    if outcomes.len() > 1 {
        let all: Vec<ScrapeStats> = outcomes.iter().map(|o| o.stats.clone()).collect();
        let totals = ScrapeService::aggregate_stats(&all);
        println!(
            "\nTotals: {} unique businesses, {} API requests across {} regions",
            totals.unique_places,
            totals.api_requests,
            outcomes.len()
        );
    }

    let metrics = cache.metrics().await;
    log::debug!("Cache at exit: {} active entries", metrics.active_entries);

    Ok(())
}

/// Scrape the surroundings of a single coordinate
async fn point(
    config: &Config,
    center: Coordinate,
    radius_meters: Option<f64>,
) -> anyhow::Result<()> {
    let (client, _cache) = build_client(config)?;

    let outcome = ScrapeService::scrape_point(
        &client,
        "point",
        center,
        radius_meters,
        config.place_type.as_deref(),
        config.keyword.as_deref(),
    )
    .await?;

    write_outputs(config, &outcome)?;
    print_summary(&outcome);

    Ok(())
}

fn build_client(config: &Config) -> anyhow::Result<(PlacesClient, Arc<SearchCache>)> {
    if config.google_places_api_key.is_empty() {
        bail!("GOOGLE_PLACES_API_KEY is required for scraping");
    }

    // Response cache, cleaned up every 5 minutes for long batch runs
    let cache = Arc::new(SearchCache::new(config.cache_ttl_seconds));
    start_cleanup_task(cache.clone(), 300);

    let client = PlacesClient::new(
        config.google_places_api_key.clone(),
        config.requests_per_second,
    )
    .with_cache(cache.clone());

    Ok((client, cache))
}

fn write_outputs(config: &Config, outcome: &ScrapeOutcome) -> anyhow::Result<()> {
    let label = &outcome.stats.region;

    let report_path = PathBuf::from(&config.output_dir).join(format!("report-{}.json", label));
    std::fs::write(&report_path, serde_json::to_string_pretty(outcome)?)
        .with_context(|| format!("could not write {}", report_path.display()))?;

    let geojson_path =
        PathBuf::from(&config.output_dir).join(format!("businesses-{}.geojson", label));
    export::write_feature_collection(
        &geojson_path,
        &export::businesses_to_feature_collection(&outcome.businesses),
    )?;

    println!("Wrote {} and {}", report_path.display(), geojson_path.display());

    Ok(())
}

fn print_summary(outcome: &ScrapeOutcome) {
    let stats = &outcome.stats;

    println!("\nScrape summary for {}", stats.region);
    println!(
        "  Cells searched:     {}/{}",
        stats.cells_searched, stats.cells_planned
    );
    println!("  API requests:       {}", stats.api_requests);
    println!("  Places retrieved:   {}", stats.places_retrieved);
    println!("  Unique businesses:  {}", stats.unique_places);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Duration:           {}s", stats.duration_seconds);
    if !stats.errors.is_empty() {
        println!("  Errors:             {}", stats.errors.len());
    }
}
