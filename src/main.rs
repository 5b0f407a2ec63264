use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use env_logger::Env;

use zonegrid::types::{IdAssignment, RasterDataType, VectorFormat};
use zonegrid::{PipelineConfig, ZonePipeline};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[clap(name = "zonegrid", about = "Rasterise zone boundaries into a zone-identity grid")]
pub struct Opt {
    /// Data root holding inputs/, temp/ and outputs/
    #[arg(long = "data-path", env = "DATA_PATH", default_value = "/data")]
    pub data_path: PathBuf,

    /// Attribute field that orders the zones and keys the population join
    #[arg(long = "sort-field", env = "SORT_FIELD")]
    pub sort_field: String,

    #[arg(long = "id-assignment", value_name = "rank|positional", default_value = "rank")]
    pub id_assignment: String,

    /// Restrict input discovery to one format; both are accepted by default
    #[arg(long = "format", value_name = "shapefile|geopackage")]
    pub format: Option<String>,

    /// Cell size of the output grid in metres
    #[arg(long = "resolution", default_value_t = 100.0)]
    pub resolution: f64,

    #[arg(long = "data-type", value_name = "UInt16|UInt32", default_value = "UInt16")]
    pub data_type: String,

    /// Nodata value assigned to the translated grid
    #[arg(long = "nodata", default_value_t = 0.0)]
    pub nodata: f64,

    /// Log to stderr instead of outputs/zonegrid.log
    #[arg(long = "log-stderr")]
    pub log_stderr: bool,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let mut config = PipelineConfig::new(&opt.data_path, opt.sort_field.as_str());
    config.id_assignment = IdAssignment::from_str(&opt.id_assignment)?;
    config.format = opt.format.as_deref().map(VectorFormat::from_str).transpose()?;
    config.resolution = opt.resolution;
    config.data_type = RasterDataType::from_str(&opt.data_type)?;
    config.nodata = opt.nodata;

    if config.resolution <= 0.0 {
        anyhow::bail!("Resolution must be positive, got {}", config.resolution);
    }

    config.ensure_directories()?;

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if !opt.log_stderr {
        let log_file = File::create(config.log_file())?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();

    let pipeline = ZonePipeline::new(config);
    let artifacts = pipeline.run()?;

    println!("xmin,ymin,xmax,ymax");
    println!("{}", artifacts.extent);
    println!("{}", artifacts.raster.display());

    Ok(())
}
