// src/services/regions.rs
// DOCUMENTATION: Named scrape regions
// PURPOSE: Bounding boxes for the regions this deployment covers

use crate::services::geo::Coordinate;
use crate::services::grid_planner::BoundingBox;

/// Look up the bounding box for a known region (case-insensitive)
///
/// Boxes are city-core scale on purpose: the planner's edge-based
/// dimensioning is only accurate for regions a few kilometers across.
pub fn region_bounds(name: &str) -> Option<BoundingBox> {
    let region = name.to_lowercase();

    match region.as_str() {
        "ottawa" => Some(BoundingBox::new(
            Coordinate::new(45.4500, -75.6500),
            Coordinate::new(45.3900, -75.7500),
        )),
        "gatineau" => Some(BoundingBox::new(
            Coordinate::new(45.4900, -75.6900),
            Coordinate::new(45.4250, -75.7800),
        )),
        "kingston" => Some(BoundingBox::new(
            Coordinate::new(44.2600, -76.4600),
            Coordinate::new(44.2150, -76.5400),
        )),
        "toronto-downtown" => Some(BoundingBox::new(
            Coordinate::new(43.6700, -79.3600),
            Coordinate::new(43.6350, -79.4100),
        )),
        _ => {
            log::warn!("Unknown region: {}", name);
            None
        }
    }
}

/// Names accepted by region_bounds, for help output
pub fn known_regions() -> &'static [&'static str] {
    &["ottawa", "gatineau", "kingston", "toronto-downtown"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_region() {
        let bounds = region_bounds("ottawa").unwrap();
        assert!(bounds.northeast.latitude > bounds.southwest.latitude);
        assert!(bounds.northeast.longitude > bounds.southwest.longitude);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(region_bounds("Ottawa").is_some());
        assert!(region_bounds("OTTAWA").is_some());
    }

    #[test]
    fn test_lookup_unknown_region() {
        assert!(region_bounds("atlantis").is_none());
    }

    #[test]
    fn test_every_known_region_resolves() {
        for name in known_regions() {
            assert!(region_bounds(name).is_some(), "missing bounds for {}", name);
        }
    }
}
