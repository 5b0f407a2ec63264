use crate::types::{IdAssignment, RasterDataType, VectorFormat};
use std::fs;
use std::path::PathBuf;

/// Default data root when `DATA_PATH` is not set
pub const DEFAULT_DATA_PATH: &str = "/data";

/// Default cell size of the zone-identity grid in metres
pub const DEFAULT_RESOLUTION: f64 = 100.0;

/// Configuration for one pipeline run
///
/// The layout under `data_path` is fixed: `inputs/zones/` holds the boundary
/// dataset, `inputs/population/population.csv` the population table, `temp/`
/// the intermediate products and `outputs/` the deliverables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Data root, from `--data-path` or `DATA_PATH`
    pub data_path: PathBuf,
    /// Attribute field that orders the zones and keys the population join
    pub sort_field: String,
    /// Zone identifier assignment policy
    pub id_assignment: IdAssignment,
    /// Restrict input discovery to one format; `None` accepts both
    pub format: Option<VectorFormat>,
    /// Cell size of the output grid in metres
    pub resolution: f64,
    /// Cell type of the output grid
    pub data_type: RasterDataType,
    /// Nodata value assigned to the translated grid
    pub nodata: f64,
}

impl PipelineConfig {
    pub fn new(data_path: impl Into<PathBuf>, sort_field: impl Into<String>) -> Self {
        PipelineConfig {
            data_path: data_path.into(),
            sort_field: sort_field.into(),
            id_assignment: IdAssignment::Rank,
            format: None,
            resolution: DEFAULT_RESOLUTION,
            data_type: RasterDataType::UInt16,
            nodata: 0.0,
        }
    }

    pub fn inputs_dir(&self) -> PathBuf {
        self.data_path.join("inputs")
    }

    pub fn zones_dir(&self) -> PathBuf {
        self.inputs_dir().join("zones")
    }

    pub fn population_csv(&self) -> PathBuf {
        self.inputs_dir().join("population").join("population.csv")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.data_path.join("temp")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.data_path.join("outputs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.outputs_dir().join("zonegrid.log")
    }

    /// Identified boundary copy consumed by the rasterisation stage
    pub fn boundaries_shapefile(&self) -> PathBuf {
        self.temp_dir().join("boundaries.shp")
    }

    pub fn extent_file(&self) -> PathBuf {
        self.outputs_dir().join("extents.txt")
    }

    pub fn extent_shapefile(&self) -> PathBuf {
        self.outputs_dir().join("extent.shp")
    }

    pub fn population_output(&self) -> PathBuf {
        self.outputs_dir().join("population.csv")
    }

    pub fn raster_temp(&self) -> PathBuf {
        self.temp_dir().join("zone_identity.tif")
    }

    pub fn raster_output(&self) -> PathBuf {
        self.outputs_dir()
            .join(format!("zone_identity_{}m.asc", self.resolution.round() as i64))
    }

    /// Create `temp/` and `outputs/`; the inputs tree must already exist
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.temp_dir())?;
        fs::create_dir_all(self.outputs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_anchored_at_the_data_root() {
        let config = PipelineConfig::new("/data", "zone_code");
        assert_eq!(config.zones_dir(), PathBuf::from("/data/inputs/zones"));
        assert_eq!(
            config.population_csv(),
            PathBuf::from("/data/inputs/population/population.csv")
        );
        assert_eq!(config.boundaries_shapefile(), PathBuf::from("/data/temp/boundaries.shp"));
        assert_eq!(config.raster_output(), PathBuf::from("/data/outputs/zone_identity_100m.asc"));
    }

    #[test]
    fn raster_output_name_tracks_resolution() {
        let mut config = PipelineConfig::new("/data", "zone_code");
        config.resolution = 50.0;
        assert_eq!(config.raster_output(), PathBuf::from("/data/outputs/zone_identity_50m.asc"));
    }
}
