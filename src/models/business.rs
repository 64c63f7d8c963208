// src/models/business.rs
// DOCUMENTATION: Output record for a discovered business
// PURPOSE: The value the scraper emits per unique place, written to the
// report files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A business discovered during a grid scrape
/// DOCUMENTATION: Deduplicated by google_place_id; one record per place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    /// Google Places unique identifier (used for deduplication)
    pub google_place_id: String,

    /// Business name
    pub name: String,

    /// Coarse category: restaurant, bar, cafe, retail, lodging, other
    pub primary_category: String,

    /// Raw Google place types, generic markers filtered out
    pub categories: Vec<String>,

    /// Geographic coordinates - latitude
    pub latitude: f64,

    /// Geographic coordinates - longitude
    pub longitude: f64,

    /// Short address as reported by Nearby Search
    pub address: Option<String>,

    /// Rating from Google (0-5)
    pub google_rating: Option<f32>,

    /// Number of ratings on Google
    pub google_rating_count: Option<i32>,

    /// Price level from Google (0-4: free to very expensive)
    pub price_level: Option<i32>,

    /// Current operational status
    pub business_status: Option<String>,

    /// When this scrape first saw the place
    pub discovered_at: DateTime<Utc>,
}
