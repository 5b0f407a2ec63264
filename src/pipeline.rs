use crate::config::PipelineConfig;
use crate::core::extent::snap_to_grid;
use crate::core::join::join_population;
use crate::core::quality::summarize_raster;
use crate::core::rasterize::{rasterize_zones, translate_to_ascii_grid};
use crate::core::zones::assign_identifiers;
use crate::io::population::{read_population, write_population};
use crate::io::vector::{discover_zone_inputs, write_extent_polygon, ZoneLayer};
use crate::types::{GridExtent, ZoneResult};
use std::fs;
use std::path::PathBuf;

/// Paths of the artifacts a completed run leaves in `outputs/`
#[derive(Debug, Clone)]
pub struct PipelineArtifacts {
    pub extent: GridExtent,
    pub extent_file: PathBuf,
    pub extent_shapefile: PathBuf,
    pub population_csv: PathBuf,
    pub raster: PathBuf,
}

/// The zone rasterisation pipeline
///
/// Runs the stages strictly in sequence: discovery, extent snapping,
/// identifier assignment, population join, rasterisation, translation and
/// the final grid summary. Any failed stage aborts the run.
pub struct ZonePipeline {
    config: PipelineConfig,
}

impl ZonePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        ZonePipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> ZoneResult<PipelineArtifacts> {
        let config = &self.config;

        let candidates = discover_zone_inputs(&config.zones_dir(), config.format)?;
        if candidates.len() > 1 {
            log::info!(
                "Found {} candidate boundary files, using {}",
                candidates.len(),
                candidates[0].display()
            );
        }
        let layer = ZoneLayer::open(&candidates[0], config.format)?;

        log::info!("Calculating extents from {}", layer.path().display());
        let extent = snap_to_grid(&layer.extent()?)?;
        fs::write(config.extent_file(), extent.to_string())?;
        log::info!("Extents calculated: {}", extent);

        log::info!("Creating bounding box for {}", layer.path().display());
        write_extent_polygon(&config.extent_shapefile(), &extent)?;
        log::info!("Bounding box created");

        let records = layer.read_records(&config.sort_field)?;
        log::info!(
            "Read {} zones keyed by {}",
            records.len(),
            config.sort_field
        );
        let ids = assign_identifiers(&records, config.id_assignment);
        self.warn_on_nodata_collision(&ids);
        layer.write_identified_copy(&config.boundaries_shapefile(), &ids)?;

        let population = read_population(&config.population_csv(), &config.sort_field)?;
        let rows = join_population(&records, &ids, &population)?;
        write_population(&config.population_output(), &rows)?;

        log::info!("Rasterizing {}", layer.path().display());
        rasterize_zones(&config.boundaries_shapefile(), &config.raster_temp(), &extent, config)?;
        log::info!("Rasterizing completed");

        log::info!("Translating raster");
        translate_to_ascii_grid(&config.raster_temp(), &config.raster_output(), config.nodata)?;
        log::info!("Translating completed");

        self.summarize(&extent, &ids)?;

        Ok(PipelineArtifacts {
            extent,
            extent_file: config.extent_file(),
            extent_shapefile: config.extent_shapefile(),
            population_csv: config.population_output(),
            raster: config.raster_output(),
        })
    }

    /// Burning an identifier equal to the nodata value erases that zone from
    /// the final grid; the original toolchain did this silently for zone 0.
    fn warn_on_nodata_collision(&self, ids: &[u32]) {
        let nodata = self.config.nodata;
        if nodata >= 0.0 && nodata.fract() == 0.0 && ids.contains(&(nodata as u32)) {
            log::warn!(
                "Nodata value {} collides with an assigned zone identifier; that zone will read as background",
                nodata
            );
        }
    }

    fn summarize(&self, extent: &GridExtent, ids: &[u32]) -> ZoneResult<()> {
        let summary = summarize_raster(&self.config.raster_temp(), self.config.nodata, ids)?;
        log::info!(
            "Grid {}x{} ({} expected), {} zones registered, {:.1}% of cells populated",
            summary.columns,
            summary.rows,
            format!(
                "{}x{}",
                extent.columns(self.config.resolution),
                extent.rows(self.config.resolution)
            ),
            summary.zone_cells.len(),
            summary.populated_fraction() * 100.0
        );
        Ok(())
    }
}
