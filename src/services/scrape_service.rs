// src/services/scrape_service.rs
// DOCUMENTATION: Grid scrape orchestration
// PURPOSE: Walk a region's coverage plan, search every cell, deduplicate
// discoveries by place id

use crate::errors::ScraperError;
use crate::models::Business;
use crate::services::geo::Coordinate;
use crate::services::grid_planner::{
    calculate_optimal_grid_system, split_large_grid, sub_grid_from_point, BoundingBox, SearchCell,
};
use crate::services::places_client::PlacesClient;
use crate::services::regions;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// Scrape statistics
/// DOCUMENTATION: Tracks results of one scrape operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeStats {
    /// Region that was scraped
    pub region: String,
    /// Search cells in the coverage plan
    pub cells_planned: u32,
    /// Cells that completed a search
    pub cells_searched: u32,
    /// Total number of API requests made
    pub api_requests: u32,
    /// Total places retrieved across all cells (before dedup)
    pub places_retrieved: u32,
    /// Unique places after dedup by place id
    pub unique_places: u32,
    /// Places dropped as duplicates of an earlier cell's results
    pub duplicates_skipped: u32,
    /// Error messages encountered
    pub errors: Vec<String>,
    /// Total scrape duration in seconds
    pub duration_seconds: u64,
    /// Timestamp when scrape started
    pub started_at: String,
    /// Timestamp when scrape completed
    pub completed_at: Option<String>,
}

impl ScrapeStats {
    /// Create new statistics tracker
    pub fn new(region: String) -> Self {
        Self {
            region,
            cells_planned: 0,
            cells_searched: 0,
            api_requests: 0,
            places_retrieved: 0,
            unique_places: 0,
            duplicates_skipped: 0,
            errors: Vec::new(),
            duration_seconds: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    /// Mark scrape as completed
    pub fn complete(&mut self, duration: u64) {
        self.duration_seconds = duration;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

/// Everything one scrape produced
#[derive(Debug, Serialize)]
pub struct ScrapeOutcome {
    pub stats: ScrapeStats,
    pub businesses: Vec<Business>,
}

/// Scrape service
/// DOCUMENTATION: Stateless orchestrator over the planner and the client
pub struct ScrapeService;

impl ScrapeService {
    /// Scrape a bounding region
    /// DOCUMENTATION: Main scrape method - plans the grid and searches each cell
    ///
    /// Process:
    /// 1. Plan coverage cells for the region
    /// 2. For each cell, run a paginated Nearby Search
    /// 3. Deduplicate results by google_place_id (first sighting wins)
    /// 4. Return unique businesses plus statistics
    ///
    /// Per-cell failures are recorded and the walk continues; quota
    /// exhaustion aborts the walk since every later cell would fail too.
    pub async fn scrape_region(
        client: &PlacesClient,
        region: &str,
        bounds: &BoundingBox,
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<ScrapeOutcome, ScraperError> {
        let cells = calculate_optimal_grid_system(bounds)?;
        Self::scrape_cells(client, region, &cells, place_type, keyword).await
    }

    /// Scrape the area around a known point of interest
    /// DOCUMENTATION: The requested radius may exceed the optimal cell size
    /// (up to the API maximum); oversized point cells are split into a
    /// compass-rose ring of optimal cells before searching.
    pub async fn scrape_point(
        client: &PlacesClient,
        label: &str,
        center: Coordinate,
        radius_meters: Option<f64>,
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<ScrapeOutcome, ScraperError> {
        let cell = sub_grid_from_point(center, radius_meters);
        let cells = split_large_grid(&cell);
        Self::scrape_cells(client, label, &cells, place_type, keyword).await
    }

    /// Scrape several named regions in sequence
    /// DOCUMENTATION: Batch operation; a failed region yields stats carrying
    /// its error rather than aborting the batch
    pub async fn scrape_regions(
        client: &PlacesClient,
        region_names: &[String],
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::new();

        for region in region_names {
            log::info!("Starting scrape for region: {}", region);

            let result = match regions::region_bounds(region) {
                Some(bounds) => {
                    Self::scrape_region(client, region, &bounds, place_type, keyword).await
                }
                None => Err(ScraperError::UnknownRegion(region.clone())),
            };

            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    log::error!("Failed to scrape region {}: {}", region, e);

                    let mut stats = ScrapeStats::new(region.clone());
                    stats.errors.push(format!("Scrape failed: {}", e));
                    stats.complete(0);
                    outcomes.push(ScrapeOutcome {
                        stats,
                        businesses: Vec::new(),
                    });
                }
            }

            // Courtesy pause between regions
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        }

        outcomes
    }

    /// Aggregate statistics from multiple scrapes
    pub fn aggregate_stats(stats_list: &[ScrapeStats]) -> ScrapeStats {
        let mut aggregated = ScrapeStats::new("all regions".to_string());

        for stats in stats_list {
            aggregated.cells_planned += stats.cells_planned;
            aggregated.cells_searched += stats.cells_searched;
            aggregated.api_requests += stats.api_requests;
            aggregated.places_retrieved += stats.places_retrieved;
            aggregated.unique_places += stats.unique_places;
            aggregated.duplicates_skipped += stats.duplicates_skipped;
            aggregated.duration_seconds += stats.duration_seconds;
            aggregated.errors.extend(stats.errors.clone());
        }

        aggregated.completed_at = Some(Utc::now().to_rfc3339());
        aggregated
    }

    async fn scrape_cells(
        client: &PlacesClient,
        region: &str,
        cells: &[SearchCell],
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<ScrapeOutcome, ScraperError> {
        let start_time = Instant::now();
        let mut stats = ScrapeStats::new(region.to_string());
        stats.cells_planned = cells.len() as u32;

        let mut seen: HashSet<String> = HashSet::new();
        let mut businesses: Vec<Business> = Vec::new();

        for (idx, cell) in cells.iter().enumerate() {
            log::debug!(
                "Searching cell {}/{}: lat={}, lng={}, radius={:.0}",
                idx + 1,
                cells.len(),
                cell.center.latitude,
                cell.center.longitude,
                cell.radius_meters
            );

            match client.nearby_search(cell, place_type, keyword).await {
                Ok(result) => {
                    stats.cells_searched += 1;
                    stats.api_requests += result.api_requests;
                    stats.places_retrieved += result.places.len() as u32;

                    for place in &result.places {
                        if seen.insert(place.place_id.clone()) {
                            businesses.push(client.to_business(place));
                        } else {
                            stats.duplicates_skipped += 1;
                        }
                    }
                }
                Err(e) => {
                    let error_msg = format!("Search failed for cell {}: {}", idx + 1, e);
                    log::error!("{}", error_msg);
                    stats.errors.push(error_msg);

                    if matches!(e, ScraperError::RateLimitExceeded) {
                        log::error!("Rate limit exceeded, stopping scrape");
                        break;
                    }
                }
            }
        }

        stats.unique_places = businesses.len() as u32;
        stats.complete(start_time.elapsed().as_secs());

        log::info!(
            "Scrape completed for {}: {} unique places from {} cells ({} duplicates, {} errors)",
            region,
            stats.unique_places,
            stats.cells_searched,
            stats.duplicates_skipped,
            stats.errors.len()
        );

        Ok(ScrapeOutcome { stats, businesses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_creation() {
        let stats = ScrapeStats::new("ottawa".to_string());

        assert_eq!(stats.region, "ottawa");
        assert_eq!(stats.cells_searched, 0);
        assert_eq!(stats.unique_places, 0);
        assert!(stats.completed_at.is_none());
    }

    #[test]
    fn test_stats_complete() {
        let mut stats = ScrapeStats::new("ottawa".to_string());
        stats.unique_places = 42;

        stats.complete(60);

        assert_eq!(stats.duration_seconds, 60);
        assert!(stats.completed_at.is_some());
    }

    #[test]
    fn test_aggregate_stats() {
        let mut stats1 = ScrapeStats::new("ottawa".to_string());
        stats1.cells_planned = 6;
        stats1.cells_searched = 6;
        stats1.api_requests = 14;
        stats1.places_retrieved = 95;
        stats1.unique_places = 70;
        stats1.duplicates_skipped = 25;
        stats1.duration_seconds = 60;
        stats1.errors.push("cell 3 timed out".to_string());

        let mut stats2 = ScrapeStats::new("gatineau".to_string());
        stats2.cells_planned = 4;
        stats2.cells_searched = 4;
        stats2.api_requests = 9;
        stats2.places_retrieved = 40;
        stats2.unique_places = 38;
        stats2.duplicates_skipped = 2;
        stats2.duration_seconds = 45;

        let aggregated = ScrapeService::aggregate_stats(&[stats1, stats2]);

        assert_eq!(aggregated.cells_planned, 10);
        assert_eq!(aggregated.cells_searched, 10);
        assert_eq!(aggregated.api_requests, 23);
        assert_eq!(aggregated.places_retrieved, 135);
        assert_eq!(aggregated.unique_places, 108);
        assert_eq!(aggregated.duplicates_skipped, 27);
        assert_eq!(aggregated.duration_seconds, 105);
        assert_eq!(aggregated.errors.len(), 1);
        assert!(aggregated.completed_at.is_some());
    }
}
