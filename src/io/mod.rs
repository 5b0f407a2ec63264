//! I/O modules for reading zone boundaries and population tables

pub mod population;
pub mod vector;

pub use population::{read_population, write_population};
pub use vector::{discover_zone_inputs, write_extent_polygon, ZoneLayer};
