//! Core pipeline stages

pub mod extent;
pub mod join;
pub mod quality;
pub mod rasterize;
pub mod zones;

// Re-export main operations
pub use extent::snap_to_grid;
pub use join::join_population;
pub use quality::{summarize_raster, RasterSummary};
pub use rasterize::{rasterize_zones, translate_to_ascii_grid};
pub use zones::{assign_identifiers, check_contiguous};
