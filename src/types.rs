use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Grid alignment for the rasterisation window (1 km in projected metres)
pub const GRID_ALIGNMENT: f64 = 1000.0;

/// Raw layer envelope in projected coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        BoundingBox { xmin, ymin, xmax, ymax }
    }

    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite() && self.ymin.is_finite() && self.xmax.is_finite() && self.ymax.is_finite()
    }
}

/// Kilometre-aligned rasterisation window
///
/// Coordinates are whole metres, multiples of [`GRID_ALIGNMENT`], so they
/// serialise without a fractional part the way downstream models expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl GridExtent {
    pub fn width(&self) -> i64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> i64 {
        self.ymax - self.ymin
    }

    /// Raster columns at the given cell size, rounded up when the cell size
    /// does not divide the extent evenly
    pub fn columns(&self, resolution: f64) -> usize {
        (self.width() as f64 / resolution).ceil() as usize
    }

    pub fn rows(&self, resolution: f64) -> usize {
        (self.height() as f64 / resolution).ceil() as usize
    }
}

impl std::fmt::Display for GridExtent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

/// Supported zone-boundary input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    Shapefile,
    GeoPackage,
}

impl VectorFormat {
    /// GDAL driver used when opening inputs of this format
    pub fn driver_name(&self) -> &'static str {
        match self {
            VectorFormat::Shapefile => "ESRI Shapefile",
            VectorFormat::GeoPackage => "GPKG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            VectorFormat::Shapefile => "shp",
            VectorFormat::GeoPackage => "gpkg",
        }
    }
}

impl std::str::FromStr for VectorFormat {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shapefile" | "shp" => Ok(VectorFormat::Shapefile),
            "geopackage" | "gpkg" => Ok(VectorFormat::GeoPackage),
            _ => Err(ZoneError::InvalidFormat(format!(
                "Unknown vector format: {} (expected shapefile or geopackage)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorFormat::Shapefile => write!(f, "shapefile"),
            VectorFormat::GeoPackage => write!(f, "geopackage"),
        }
    }
}

/// Policy for assigning the dense zone identifier to boundary records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdAssignment {
    /// Identifier is the record's zero-based rank under the sort field
    Rank,
    /// Identifier is the record's zero-based position in file order
    Positional,
}

impl std::str::FromStr for IdAssignment {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rank" => Ok(IdAssignment::Rank),
            "positional" => Ok(IdAssignment::Positional),
            _ => Err(ZoneError::InvalidFormat(format!(
                "Unknown identifier assignment policy: {} (expected rank or positional)",
                s
            ))),
        }
    }
}

/// Output raster cell types accepted by the rasterisation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterDataType {
    UInt16,
    UInt32,
}

impl RasterDataType {
    /// Type name as understood by the GDAL `-ot` option
    pub fn gdal_name(&self) -> &'static str {
        match self {
            RasterDataType::UInt16 => "UInt16",
            RasterDataType::UInt32 => "UInt32",
        }
    }
}

impl std::str::FromStr for RasterDataType {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uint16" => Ok(RasterDataType::UInt16),
            "uint32" => Ok(RasterDataType::UInt32),
            _ => Err(ZoneError::InvalidFormat(format!(
                "Unknown raster data type: {} (expected UInt16 or UInt32)",
                s
            ))),
        }
    }
}

/// Join/sort key read from the zone layer or the population table
///
/// Numeric and text keys never mix within one run (the field type is fixed
/// per layer), but the ordering is total so mixed comparisons stay defined:
/// numbers sort before text.
#[derive(Debug, Clone)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Canonicalise a textual value: numeric strings become `Number` so CSV
    /// keys compare equal to numeric field values ("7" matches 7)
    pub fn parse(value: &str) -> SortKey {
        let trimmed = value.trim();
        match trimmed.parse::<f64>() {
            Ok(n) => SortKey::Number(n),
            Err(_) => SortKey::Text(trimmed.to_string()),
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl Hash for SortKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SortKey::Number(n) => n.to_bits().hash(state),
            SortKey::Text(s) => s.hash(state),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Number(n) => write!(f, "{}", n),
            SortKey::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One boundary record read from the zone layer
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    pub fid: u64,
    pub key: SortKey,
}

/// One row of the input population table
#[derive(Debug, Clone)]
pub struct PopulationRecord {
    pub key: SortKey,
    pub initial_population: f64,
    pub final_population: f64,
}

/// One row of the output population lookup table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRow {
    pub zone_identity: u32,
    pub initial_value: f64,
    pub final_value: f64,
}

/// Error types for the rasterisation pipeline
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Zone identifiers are not contiguous: {0}")]
    Contiguity(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for pipeline operations
pub type ZoneResult<T> = Result<T, ZoneError>;
