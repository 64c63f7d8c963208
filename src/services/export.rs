// src/services/export.rs
// DOCUMENTATION: GeoJSON output
// PURPOSE: Write coverage plans and scrape results as FeatureCollections for
// inspection in any GIS viewer

use crate::errors::ScraperError;
use crate::models::Business;
use crate::services::grid_planner::SearchCell;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use std::path::Path;

/// One Point feature per planned cell, radius carried as a property
pub fn cells_to_feature_collection(cells: &[SearchCell]) -> FeatureCollection {
    let features = cells
        .iter()
        .map(|cell| {
            let point: geo_types::Point<f64> = cell.center.into();

            let mut properties = JsonObject::new();
            properties.insert(
                "radius_meters".to_string(),
                JsonValue::from(cell.radius_meters),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new((&point).into())),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// One Point feature per discovered business
pub fn businesses_to_feature_collection(businesses: &[Business]) -> FeatureCollection {
    let features = businesses
        .iter()
        .map(|business| {
            let point = geo_types::Point::new(business.longitude, business.latitude);

            let mut properties = JsonObject::new();
            properties.insert(
                "google_place_id".to_string(),
                JsonValue::from(business.google_place_id.clone()),
            );
            properties.insert("name".to_string(), JsonValue::from(business.name.clone()));
            properties.insert(
                "primary_category".to_string(),
                JsonValue::from(business.primary_category.clone()),
            );
            if let Some(rating) = business.google_rating {
                properties.insert("google_rating".to_string(), JsonValue::from(rating));
            }
            if let Some(status) = &business.business_status {
                properties.insert("business_status".to_string(), JsonValue::from(status.clone()));
            }

            Feature {
                bbox: None,
                geometry: Some(Geometry::new((&point).into())),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Pretty-print a FeatureCollection to disk
pub fn write_feature_collection(
    path: &Path,
    collection: &FeatureCollection,
) -> Result<(), ScraperError> {
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json)?;

    log::info!(
        "Wrote {} features to {}",
        collection.features.len(),
        path.display()
    );

    Ok(())
}
