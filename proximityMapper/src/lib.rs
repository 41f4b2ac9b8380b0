// Module declarations for the proximity mapper

// Matching engine and session orchestration
pub mod core {
    pub mod distance;
    pub mod proximity;
    pub mod zones;
    pub mod session;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod app_config;
}

// Model definitions
pub mod models {
    pub mod coordinate;
    pub mod location_record;
    pub mod secured_zone;
}

// Data ingestion
pub mod data {
    pub mod location_parser;
    pub mod records_loader;
    pub mod file_chooser;
}

// Map output
pub mod render {
    pub mod map_document;
    pub mod proximity_layers;
    pub mod tooltip;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
    pub mod traits;
    pub mod workspace;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used items
pub use crate::core::distance::DistanceOracle;
pub use crate::core::proximity::{MatchOutcome, ProximityMatcher, ProximityResult, Route};
pub use crate::data::location_parser::{LocationParser, RawLocation};
pub use crate::models::coordinate::Coordinate;
pub use crate::models::location_record::{EntityRole, EntitySet, LocationRecord};
pub use crate::models::secured_zone::SecuredZone;
