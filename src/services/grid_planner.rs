// src/services/grid_planner.rs
// DOCUMENTATION: Geographic grid-search coverage planning
// PURPOSE: Tile a bounding region into overlapping search cells sized for the
// Places API radius limits

use crate::errors::ScraperError;
use crate::services::geo::{
    distance_meters, point_at_distance_and_bearing, Coordinate,
};
use serde::{Deserialize, Serialize};

/// Largest radius worth sending to the Places API in practice
pub const MAX_SEARCH_RADIUS_METERS: f64 = 5_000.0;
/// Preferred search cell radius
pub const OPTIMAL_RADIUS_METERS: f64 = 1_000.0;
/// Smallest useful search cell radius
pub const MIN_RADIUS_METERS: f64 = 500.0;
/// Fractional shrinkage of cell spacing so adjacent circles intersect at seams
pub const OVERLAP_FRACTION: f64 = 0.20;

/// Rectangular geographic region
/// DOCUMENTATION: Defined by its northeast and southwest corners.
/// Longitude wraparound across the antimeridian is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northeast corner
    pub northeast: Coordinate,
    /// Southwest corner
    pub southwest: Coordinate,
}

impl BoundingBox {
    pub fn new(northeast: Coordinate, southwest: Coordinate) -> Self {
        Self {
            northeast,
            southwest,
        }
    }

    /// Reject boxes the planner cannot tile: non-finite corners, inverted
    /// corners, or zero area
    fn validate(&self) -> Result<(), ScraperError> {
        if !self.northeast.is_finite() || !self.southwest.is_finite() {
            return Err(ScraperError::InvalidBoundingBox(
                "corner coordinates must be finite".to_string(),
            ));
        }

        if self.northeast.latitude <= self.southwest.latitude {
            return Err(ScraperError::InvalidBoundingBox(format!(
                "northeast latitude {} must exceed southwest latitude {}",
                self.northeast.latitude, self.southwest.latitude
            )));
        }

        if self.northeast.longitude <= self.southwest.longitude {
            return Err(ScraperError::InvalidBoundingBox(format!(
                "northeast longitude {} must exceed southwest longitude {}",
                self.northeast.longitude, self.southwest.longitude
            )));
        }

        Ok(())
    }
}

/// One circular query unit handed to the search API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchCell {
    /// Center point
    pub center: Coordinate,
    /// Search radius in meters
    pub radius_meters: f64,
}

/// Physical extent of a bounding box in meters
#[derive(Debug, Clone, Copy)]
pub struct BoundsDimensions {
    pub width_meters: f64,
    pub height_meters: f64,
}

/// Cell counts needed to cover a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub cols: usize,
    pub rows: usize,
}

/// Planner policy knobs
/// DOCUMENTATION: Defaults to the module constants. The planning operations
/// are methods here so tests can exercise edge policies; the free functions
/// below apply the default policy.
#[derive(Debug, Clone, Copy)]
pub struct GridPlannerConfig {
    pub max_radius_meters: f64,
    pub optimal_radius_meters: f64,
    pub min_radius_meters: f64,
    pub overlap_fraction: f64,
}

impl Default for GridPlannerConfig {
    fn default() -> Self {
        Self {
            max_radius_meters: MAX_SEARCH_RADIUS_METERS,
            optimal_radius_meters: OPTIMAL_RADIUS_METERS,
            min_radius_meters: MIN_RADIUS_METERS,
            overlap_fraction: OVERLAP_FRACTION,
        }
    }
}

/// Measure a box's width and height in meters
/// DOCUMENTATION: Width is taken along the southern edge, height along the
/// western edge. Adequate for city-scale regions; skews for boxes spanning
/// many degrees of latitude.
pub fn bounds_dimensions(bounds: &BoundingBox) -> BoundsDimensions {
    let sw = bounds.southwest;
    let se = Coordinate::new(bounds.southwest.latitude, bounds.northeast.longitude);
    let nw = Coordinate::new(bounds.northeast.latitude, bounds.southwest.longitude);

    BoundsDimensions {
        width_meters: distance_meters(sw, se),
        height_meters: distance_meters(sw, nw),
    }
}

impl GridPlannerConfig {
    /// Number of columns and rows of cells needed to cover the given extent
    ///
    /// Cell spacing is the optimal diameter reduced by the overlap fraction,
    /// so adjacent circles still intersect along shared edges.
    pub fn grid_dimensions(&self, dims: &BoundsDimensions) -> GridDimensions {
        let effective_radius = self.optimal_radius_meters * (1.0 - self.overlap_fraction);
        let spacing = 2.0 * effective_radius;

        GridDimensions {
            cols: ((dims.width_meters / spacing).ceil() as usize).max(1),
            rows: ((dims.height_meters / spacing).ceil() as usize).max(1),
        }
    }

    /// Generate the basic coverage grid for a bounding box
    /// DOCUMENTATION: Emits rows x cols cells in row-major order, each
    /// centered in its grid square. Cell radius shrinks toward half the
    /// smaller square dimension but stays within [min, optimal].
    pub fn generate_sub_grids(
        &self,
        bounds: &BoundingBox,
    ) -> Result<Vec<SearchCell>, ScraperError> {
        bounds.validate()?;

        let dims = bounds_dimensions(bounds);
        let grid = self.grid_dimensions(&dims);

        let cell_width = dims.width_meters / grid.cols as f64;
        let cell_height = dims.height_meters / grid.rows as f64;

        let cell_radius = (cell_width.min(cell_height) / 2.0)
            .max(self.min_radius_meters)
            .min(self.optimal_radius_meters);

        let lat_span = bounds.northeast.latitude - bounds.southwest.latitude;
        let lng_span = bounds.northeast.longitude - bounds.southwest.longitude;

        let mut cells = Vec::with_capacity(grid.rows * grid.cols);

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                // Half-cell offset so the point is the cell's center, not its corner
                let latitude = bounds.southwest.latitude
                    + lat_span * ((row as f64 + 0.5) / grid.rows as f64);
                let longitude = bounds.southwest.longitude
                    + lng_span * ((col as f64 + 0.5) / grid.cols as f64);

                cells.push(SearchCell {
                    center: Coordinate::new(latitude, longitude),
                    radius_meters: cell_radius,
                });
            }
        }

        log::info!(
            "Planned {} search cells ({} cols x {} rows, radius {:.0} m)",
            cells.len(),
            grid.cols,
            grid.rows,
            cell_radius
        );

        Ok(cells)
    }

    /// Split an oversized cell into sub-cells within the optimal radius
    /// DOCUMENTATION: Cells at or below the optimal radius pass through
    /// unchanged. Oversized cells yield one centered sub-cell, plus a fixed
    /// 8-point compass ring at 0.7x the original radius when the original
    /// exceeds 1.5x the optimal radius. Single pass, no recursion.
    pub fn split_large_grid(&self, cell: &SearchCell) -> Vec<SearchCell> {
        if cell.radius_meters <= self.optimal_radius_meters {
            return vec![*cell];
        }

        let num_splits = (cell.radius_meters / self.optimal_radius_meters).ceil() as u32;
        let new_radius = self.optimal_radius_meters.min(cell.radius_meters / 2.0);

        let mut cells = vec![SearchCell {
            center: cell.center,
            radius_meters: new_radius,
        }];

        if cell.radius_meters > self.optimal_radius_meters * 1.5 {
            let ring_distance = 0.7 * cell.radius_meters;

            for i in 0..8 {
                let bearing = i as f64 * 45.0;
                cells.push(SearchCell {
                    center: point_at_distance_and_bearing(cell.center, ring_distance, bearing),
                    radius_meters: new_radius,
                });
            }
        }

        log::debug!(
            "Split {:.0} m cell into {} sub-cells of {:.0} m (suggested splits: {})",
            cell.radius_meters,
            cells.len(),
            new_radius,
            num_splits
        );

        cells
    }

    /// Plan full coverage for a bounding box
    /// DOCUMENTATION: Basic grid with every oversized cell replaced by its
    /// splits, flattened in original cell order. Overlap between cells is
    /// intentional; deduplication of discovered places by identifier is the
    /// consumer's job.
    pub fn calculate_optimal_grid_system(
        &self,
        bounds: &BoundingBox,
    ) -> Result<Vec<SearchCell>, ScraperError> {
        let base = self.generate_sub_grids(bounds)?;

        let mut cells = Vec::with_capacity(base.len());
        for cell in &base {
            if cell.radius_meters > self.optimal_radius_meters {
                cells.extend(self.split_large_grid(cell));
            } else {
                cells.push(*cell);
            }
        }

        log::info!("Coverage plan contains {} search cells", cells.len());

        Ok(cells)
    }

    /// Build a single search cell around a known point of interest
    /// DOCUMENTATION: Radius defaults to the optimal radius and is clamped
    /// into [min, max] either way.
    pub fn sub_grid_from_point(
        &self,
        center: Coordinate,
        radius_meters: Option<f64>,
    ) -> SearchCell {
        let radius = radius_meters
            .unwrap_or(self.optimal_radius_meters)
            .clamp(self.min_radius_meters, self.max_radius_meters);

        SearchCell {
            center,
            radius_meters: radius,
        }
    }
}

/// Default-policy basic grid generation
pub fn generate_sub_grids(bounds: &BoundingBox) -> Result<Vec<SearchCell>, ScraperError> {
    GridPlannerConfig::default().generate_sub_grids(bounds)
}

/// Default-policy oversized-cell splitting
pub fn split_large_grid(cell: &SearchCell) -> Vec<SearchCell> {
    GridPlannerConfig::default().split_large_grid(cell)
}

/// Default-policy full coverage plan
pub fn calculate_optimal_grid_system(
    bounds: &BoundingBox,
) -> Result<Vec<SearchCell>, ScraperError> {
    GridPlannerConfig::default().calculate_optimal_grid_system(bounds)
}

/// Default-policy single-cell constructor
pub fn sub_grid_from_point(center: Coordinate, radius_meters: Option<f64>) -> SearchCell {
    GridPlannerConfig::default().sub_grid_from_point(center, radius_meters)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Roughly 3 km x 2.3 km around downtown Ottawa
    fn ottawa_box() -> BoundingBox {
        BoundingBox::new(
            Coordinate::new(45.43, -75.66),
            Coordinate::new(45.40, -75.70),
        )
    }

    #[test]
    fn test_bounds_dimensions_ottawa() {
        let dims = bounds_dimensions(&ottawa_box());

        // ~3.1 km wide, ~3.3 km tall
        assert!(dims.width_meters > 2_000.0 && dims.width_meters < 4_000.0);
        assert!(dims.height_meters > 2_500.0 && dims.height_meters < 4_000.0);
    }

    #[test]
    fn test_grid_dimensions_floor_at_one() {
        let dims = BoundsDimensions {
            width_meters: 10.0,
            height_meters: 10.0,
        };

        let grid = GridPlannerConfig::default().grid_dimensions(&dims);
        assert_eq!(grid, GridDimensions { cols: 1, rows: 1 });
    }

    #[test]
    fn test_grid_dimensions_overlap_adds_cells() {
        let dims = BoundsDimensions {
            width_meters: 8_000.0,
            height_meters: 8_000.0,
        };

        let with_overlap = GridPlannerConfig::default().grid_dimensions(&dims);
        let without = GridPlannerConfig {
            overlap_fraction: 0.0,
            ..GridPlannerConfig::default()
        }
        .grid_dimensions(&dims);

        // 8000 / 1600 = 5 vs 8000 / 2000 = 4
        assert_eq!(with_overlap, GridDimensions { cols: 5, rows: 5 });
        assert_eq!(without, GridDimensions { cols: 4, rows: 4 });
    }

    #[test]
    fn test_generate_sub_grids_ottawa() {
        let bounds = ottawa_box();
        let dims = bounds_dimensions(&bounds);
        let grid = GridPlannerConfig::default().grid_dimensions(&dims);
        let cells = generate_sub_grids(&bounds).unwrap();

        assert!(grid.cols >= 2);
        assert!(grid.rows >= 2);
        assert_eq!(cells.len(), grid.cols * grid.rows);

        for cell in &cells {
            assert!(cell.radius_meters >= MIN_RADIUS_METERS);
            assert!(cell.radius_meters <= OPTIMAL_RADIUS_METERS);

            assert!(cell.center.latitude > bounds.southwest.latitude);
            assert!(cell.center.latitude < bounds.northeast.latitude);
            assert!(cell.center.longitude > bounds.southwest.longitude);
            assert!(cell.center.longitude < bounds.northeast.longitude);
        }
    }

    #[test]
    fn test_generate_sub_grids_tiny_box_yields_one_cell() {
        // ~100 m square
        let bounds = BoundingBox::new(
            Coordinate::new(45.4010, -75.6990),
            Coordinate::new(45.4000, -75.7000),
        );

        let cells = generate_sub_grids(&bounds).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].radius_meters, MIN_RADIUS_METERS);
    }

    #[test]
    fn test_generate_sub_grids_rejects_inverted_box() {
        let inverted = BoundingBox::new(
            Coordinate::new(45.40, -75.70),
            Coordinate::new(45.43, -75.66),
        );

        assert!(matches!(
            generate_sub_grids(&inverted),
            Err(ScraperError::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn test_generate_sub_grids_rejects_zero_area_box() {
        let corner = Coordinate::new(45.40, -75.70);
        let degenerate = BoundingBox::new(corner, corner);

        assert!(matches!(
            generate_sub_grids(&degenerate),
            Err(ScraperError::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn test_generate_sub_grids_rejects_nan() {
        let bounds = BoundingBox::new(
            Coordinate::new(f64::NAN, -75.66),
            Coordinate::new(45.40, -75.70),
        );

        assert!(matches!(
            generate_sub_grids(&bounds),
            Err(ScraperError::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn test_split_small_cell_passes_through() {
        let cell = SearchCell {
            center: Coordinate::new(45.4, -75.7),
            radius_meters: 800.0,
        };

        assert_eq!(split_large_grid(&cell), vec![cell]);
    }

    #[test]
    fn test_split_slightly_oversized_cell_yields_center_only() {
        let cell = SearchCell {
            center: Coordinate::new(45.4, -75.7),
            radius_meters: 1_400.0,
        };

        let split = split_large_grid(&cell);
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].center, cell.center);
        assert_eq!(split[0].radius_meters, 700.0);
    }

    #[test]
    fn test_split_large_cell_yields_compass_ring() {
        let cell = SearchCell {
            center: Coordinate::new(45.4, -75.7),
            radius_meters: 4_000.0,
        };

        let split = split_large_grid(&cell);
        assert_eq!(split.len(), 9);

        for sub in &split {
            assert_eq!(sub.radius_meters, OPTIMAL_RADIUS_METERS);
        }

        // First sub-cell keeps the original center; ring sits at 0.7x radius
        assert_eq!(split[0].center, cell.center);
        for sub in &split[1..] {
            let d = distance_meters(cell.center, sub.center);
            assert!((d - 2_800.0).abs() < 1.0, "ring offset {}", d);
        }
    }

    #[test]
    fn test_split_never_exceeds_optimal_radius() {
        for radius in [1_100.0, 1_600.0, 2_500.0, 10_000.0] {
            let cell = SearchCell {
                center: Coordinate::new(45.4, -75.7),
                radius_meters: radius,
            };

            for sub in split_large_grid(&cell) {
                assert!(sub.radius_meters <= OPTIMAL_RADIUS_METERS);
            }
        }
    }

    #[test]
    fn test_optimal_grid_system_ottawa() {
        let cells = calculate_optimal_grid_system(&ottawa_box()).unwrap();

        assert!(!cells.is_empty());
        for cell in &cells {
            assert!(cell.radius_meters <= OPTIMAL_RADIUS_METERS);
            assert!(cell.radius_meters >= MIN_RADIUS_METERS);
        }
    }

    #[test]
    fn test_optimal_grid_system_splits_with_relaxed_policy() {
        // A policy that makes the basic grid emit 3 km cells, which the
        // default splitting pass must then bring back under 1 km
        let relaxed = GridPlannerConfig {
            optimal_radius_meters: 4_000.0,
            min_radius_meters: 3_000.0,
            ..GridPlannerConfig::default()
        };

        let base = relaxed.generate_sub_grids(&ottawa_box()).unwrap();
        assert!(base.iter().all(|c| c.radius_meters == 3_000.0));

        let strict = GridPlannerConfig::default();
        let mut cells = Vec::new();
        for cell in &base {
            cells.extend(strict.split_large_grid(cell));
        }

        // 3 km exceeds 1.5x the strict optimal radius: full compass ring
        assert_eq!(cells.len(), base.len() * 9);
        for cell in &cells {
            assert!(cell.radius_meters <= strict.optimal_radius_meters);
        }
    }

    #[test]
    fn test_sub_grid_from_point_clamps_low() {
        let cell = sub_grid_from_point(Coordinate::new(45.4, -75.7), Some(50.0));
        assert_eq!(cell.radius_meters, MIN_RADIUS_METERS);
    }

    #[test]
    fn test_sub_grid_from_point_clamps_high() {
        let cell = sub_grid_from_point(Coordinate::new(45.4, -75.7), Some(50_000.0));
        assert_eq!(cell.radius_meters, MAX_SEARCH_RADIUS_METERS);
    }

    #[test]
    fn test_sub_grid_from_point_default_radius() {
        let cell = sub_grid_from_point(Coordinate::new(45.4, -75.7), None);
        assert_eq!(cell.radius_meters, OPTIMAL_RADIUS_METERS);
    }
}
