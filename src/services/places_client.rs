// src/services/places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Paginated Nearby Search against the Places API, one call per
// planned search cell

use crate::errors::ScraperError;
use crate::models::Business;
use crate::services::cache::SearchCache;
use crate::services::grid_planner::SearchCell;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Nearby Search returns at most 20 results per page, three pages deep
const MAX_PAGES: u32 = 3;
/// Next-page tokens take a moment to become valid server-side
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Google Places API client
/// DOCUMENTATION: Handles authentication, throttling and pagination
pub struct PlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Places API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
    /// Request throttle shared by all searches on this client
    limiter: DirectRateLimiter,
    /// Optional page cache
    cache: Option<Arc<SearchCache>>,
}

/// Response from Google Places Nearby Search
#[derive(Debug, Deserialize, Serialize)]
pub struct PlacesResponse {
    /// Results array from API
    pub results: Vec<GooglePlace>,
    /// Status of the API call
    pub status: String,
    /// Next page token (if more results available)
    pub next_page_token: Option<String>,
    /// Error message (if status is not OK)
    pub error_message: Option<String>,
}

/// Individual place from the Nearby Search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlace {
    /// Google's unique place identifier
    pub place_id: String,
    /// Place name
    pub name: String,
    /// Place types array (e.g., ["restaurant", "food", "point_of_interest"])
    pub types: Vec<String>,
    /// Geographic location
    pub geometry: GoogleGeometry,
    /// Vicinity (short address, from Nearby Search)
    pub vicinity: Option<String>,
    /// Rating (0-5)
    pub rating: Option<f32>,
    /// Number of user ratings
    pub user_ratings_total: Option<i32>,
    /// Price level (0-4: free to very expensive)
    pub price_level: Option<i32>,
    /// Business status (OPERATIONAL, CLOSED_TEMPORARILY, etc.)
    pub business_status: Option<String>,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleGeometry {
    /// Location coordinates
    pub location: GoogleLocation,
}

/// Coordinates from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// Outcome of walking every page of one cell's Nearby Search
#[derive(Debug)]
pub struct NearbySearchResult {
    /// All places across the pages, in API order
    pub places: Vec<GooglePlace>,
    /// HTTP requests actually issued (cache hits excluded)
    pub api_requests: u32,
}

impl PlacesClient {
    /// Create new Places API client
    /// DOCUMENTATION: Initializes client with API key and request throttle
    pub fn new(api_key: String, requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            limiter: RateLimiter::direct(Quota::per_second(rps)),
            cache: None,
        }
    }

    /// Attach a response cache
    pub fn with_cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Perform a full Nearby Search for one cell
    /// DOCUMENTATION: Follows next_page_token up to three pages, waiting for
    /// each token to activate before requesting the next page.
    ///
    /// # Arguments
    /// * `cell` - Search cell (center + radius) to query
    /// * `place_type` - Optional type filter (e.g., "restaurant", "bar")
    /// * `keyword` - Optional keyword search
    pub async fn nearby_search(
        &self,
        cell: &SearchCell,
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<NearbySearchResult, ScraperError> {
        let mut places = Vec::new();
        let mut api_requests = 0;
        let mut page_token: Option<String> = None;
        let mut page = 0;

        loop {
            if page_token.is_some() {
                tokio::time::sleep(PAGE_TOKEN_DELAY).await;
            }

            let (response, cached) = self
                .search_page(cell, place_type, keyword, page_token.as_deref())
                .await?;

            if !cached {
                api_requests += 1;
            }
            page += 1;
            places.extend(response.results);

            match response.next_page_token {
                Some(token) if page < MAX_PAGES => page_token = Some(token),
                _ => break,
            }
        }

        log::info!(
            "Nearby search at ({:.5}, {:.5}) r={:.0} m returned {} places over {} pages",
            cell.center.latitude,
            cell.center.longitude,
            cell.radius_meters,
            places.len(),
            page
        );

        Ok(NearbySearchResult {
            places,
            api_requests,
        })
    }

    /// Fetch one page of Nearby Search results
    /// Returns the parsed response and whether it came from the cache.
    async fn search_page(
        &self,
        cell: &SearchCell,
        place_type: Option<&str>,
        keyword: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<(PlacesResponse, bool), ScraperError> {
        let cache_key = SearchCache::request_key(cell, place_type, keyword, page_token);

        if let Some(cache) = &self.cache {
            if let Some(raw) = cache.get(&cache_key).await {
                if let Ok(response) = serde_json::from_str::<PlacesResponse>(&raw) {
                    return Ok((response, true));
                }
            }
        }

        self.limiter.until_ready().await;

        let url = format!("{}/nearbysearch/json", self.base_url);

        let mut params = HashMap::new();
        params.insert("key", self.api_key.clone());

        // With a page token Google ignores the other parameters
        if let Some(token) = page_token {
            params.insert("pagetoken", token.to_string());
        } else {
            params.insert(
                "location",
                format!("{},{}", cell.center.latitude, cell.center.longitude),
            );
            params.insert("radius", format!("{}", cell.radius_meters.round() as u32));

            if let Some(pt) = place_type {
                params.insert("type", pt.to_string());
            }

            if let Some(kw) = keyword {
                params.insert("keyword", kw.to_string());
            }
        }

        log::debug!(
            "Places nearby search: lat={}, lng={}, radius={:.0}, page_token={}",
            cell.center.latitude,
            cell.center.longitude,
            cell.radius_meters,
            page_token.is_some()
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Places API request failed: {}", e);
                ScraperError::ExternalApi(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Places API error {}: {}", status, body);
            return Err(ScraperError::ExternalApi(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let api_response: PlacesResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Places response: {}", e);
            ScraperError::ExternalApi(format!("Parse error: {}", e))
        })?;

        // Check API response status
        match api_response.status.as_str() {
            "OK" | "ZERO_RESULTS" => {
                if let Some(cache) = &self.cache {
                    if let Ok(raw) = serde_json::to_string(&api_response) {
                        cache.set(cache_key, raw).await;
                    }
                }
                Ok((api_response, false))
            }
            "OVER_QUERY_LIMIT" => {
                log::error!("Places API quota exceeded");
                Err(ScraperError::RateLimitExceeded)
            }
            "REQUEST_DENIED" | "INVALID_REQUEST" => {
                let msg = api_response
                    .error_message
                    .unwrap_or_else(|| "Unknown error".to_string());
                log::error!("Places API request denied: {}", msg);
                Err(ScraperError::ExternalApi(msg))
            }
            other => {
                let msg = api_response
                    .error_message
                    .unwrap_or_else(|| format!("Unknown status: {}", other));
                log::error!("Places API unexpected status: {}", msg);
                Err(ScraperError::ExternalApi(msg))
            }
        }
    }

    /// Convert a Nearby Search result to a Business record
    /// DOCUMENTATION: Maps the wire format to the scraper's output model
    pub fn to_business(&self, place: &GooglePlace) -> Business {
        let categories: Vec<String> = place
            .types
            .iter()
            .filter(|t| {
                !t.starts_with("point_of_interest")
                    && !t.starts_with("establishment")
                    && *t != "geocode"
            })
            .cloned()
            .collect();

        Business {
            google_place_id: place.place_id.clone(),
            name: place.name.clone(),
            primary_category: primary_category(&place.types),
            categories,
            latitude: place.geometry.location.lat,
            longitude: place.geometry.location.lng,
            address: place.vicinity.clone(),
            google_rating: place.rating,
            google_rating_count: place.user_ratings_total,
            price_level: place.price_level,
            business_status: place.business_status.clone(),
            discovered_at: chrono::Utc::now(),
        }
    }
}

/// Map Google place types to a single coarse category
/// Priority order: restaurant > bar > cafe > retail > lodging > other
fn primary_category(types: &[String]) -> String {
    let type_map: Vec<(&str, &str)> = vec![
        ("restaurant", "restaurant"),
        ("food", "restaurant"),
        ("meal_takeaway", "restaurant"),
        ("meal_delivery", "restaurant"),
        ("bar", "bar"),
        ("night_club", "bar"),
        ("cafe", "cafe"),
        ("bakery", "cafe"),
        ("store", "retail"),
        ("shopping_mall", "retail"),
        ("supermarket", "retail"),
        ("lodging", "lodging"),
    ];

    for (google_type, category) in type_map {
        if types.iter().any(|t| t == google_type) {
            return category.to_string();
        }
    }

    "other".to_string()
}
