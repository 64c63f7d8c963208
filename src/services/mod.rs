// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod export;
pub mod geo;
pub mod grid_planner;
pub mod places_client;
pub mod regions;
pub mod scrape_service;

pub use cache::*;
pub use export::*;
pub use geo::*;
pub use grid_planner::*;
pub use places_client::*;
pub use regions::*;
pub use scrape_service::*;
