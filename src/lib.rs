//! zonegrid: zone-boundary rasterisation for urban and land-use models
//!
//! This library converts vector zone-boundary polygons into a zone-identity
//! grid aligned to a kilometre-rounded bounding box, together with a per-zone
//! population lookup table keyed by the same dense identifiers.

pub mod types;
pub mod config;
pub mod io;
pub mod core;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, GridExtent, IdAssignment, PopulationRecord, PopulationRow, RasterDataType,
    SortKey, VectorFormat, ZoneError, ZoneRecord, ZoneResult,
};

pub use config::PipelineConfig;
pub use pipeline::{PipelineArtifacts, ZonePipeline};
