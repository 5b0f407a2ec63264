use crate::types::{BoundingBox, GridExtent, SortKey, VectorFormat, ZoneError, ZoneRecord, ZoneResult};
use gdal::vector::{Feature, Geometry, LayerAccess, OGRFieldType, OGRwkbGeometryType};
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags, LayerOptions};
use std::path::{Path, PathBuf};

/// Find candidate zone-boundary datasets under the zones directory
///
/// Matches `.shp` and `.gpkg` files (case-insensitive), or only the
/// configured format's extension when one is given. The result is sorted by
/// file name so the selection is deterministic across platforms.
pub fn discover_zone_inputs(dir: &Path, format: Option<VectorFormat>) -> ZoneResult<Vec<PathBuf>> {
    let extensions: Vec<&str> = match format {
        Some(f) => vec![f.extension()],
        None => vec![VectorFormat::Shapefile.extension(), VectorFormat::GeoPackage.extension()],
    };

    let entries = std::fs::read_dir(dir).map_err(|e| {
        ZoneError::Processing(format!("Cannot read zones directory {}: {}", dir.display(), e))
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|wanted| e.eq_ignore_ascii_case(wanted)))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    if candidates.is_empty() {
        return Err(ZoneError::Processing(format!(
            "No zone boundary files found in {}",
            dir.display()
        )));
    }

    Ok(candidates)
}

/// Zone-boundary layer reader
///
/// Wraps the opened GDAL dataset; all operations address the first layer,
/// which is the only layer the supported inputs carry.
pub struct ZoneLayer {
    dataset: Dataset,
    path: PathBuf,
}

impl ZoneLayer {
    /// Open a boundary dataset, restricted to the configured format's driver
    /// when one is given
    pub fn open<P: AsRef<Path>>(path: P, format: Option<VectorFormat>) -> ZoneResult<Self> {
        let path = path.as_ref();
        log::info!("Opening zone boundaries: {}", path.display());

        let dataset = match format {
            Some(f) => {
                let drivers = [f.driver_name()];
                Dataset::open_ex(
                    path,
                    DatasetOptions {
                        open_flags: GdalOpenFlags::GDAL_OF_VECTOR,
                        allowed_drivers: Some(&drivers),
                        ..Default::default()
                    },
                )?
            }
            None => Dataset::open(path)?,
        };

        Ok(ZoneLayer {
            dataset,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn feature_count(&self) -> ZoneResult<u64> {
        Ok(self.dataset.layer(0)?.feature_count())
    }

    /// Raw layer envelope, computed over all features
    pub fn extent(&self) -> ZoneResult<BoundingBox> {
        let layer = self.dataset.layer(0)?;
        let envelope = layer.get_extent()?;
        Ok(BoundingBox::new(envelope.MinX, envelope.MinY, envelope.MaxX, envelope.MaxY))
    }

    /// Read one record per feature, keyed by the sort field
    ///
    /// Integer and real fields yield numeric keys, string fields are
    /// canonicalised through [`SortKey::parse`] so they match population
    /// keys read from CSV text.
    pub fn read_records(&self, sort_field: &str) -> ZoneResult<Vec<ZoneRecord>> {
        let mut layer = self.dataset.layer(0)?;
        let field_type = field_type_by_name(&layer, sort_field, &self.path)?;
        let numeric = matches!(
            field_type,
            OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 | OGRFieldType::OFTReal
        );

        let mut records = Vec::with_capacity(layer.feature_count() as usize);
        for (index, feature) in layer.features().enumerate() {
            let fid = feature.fid().unwrap_or(index as u64);
            let key = if numeric {
                feature
                    .field_as_double_by_name(sort_field)?
                    .map(SortKey::Number)
            } else {
                feature
                    .field_as_string_by_name(sort_field)?
                    .map(|s| SortKey::parse(&s))
            };

            match key {
                Some(key) => records.push(ZoneRecord { fid, key }),
                None => {
                    return Err(ZoneError::MissingField(format!(
                        "{} is null on feature {} of {}",
                        sort_field,
                        fid,
                        self.path.display()
                    )))
                }
            }
        }

        Ok(records)
    }

    /// Write a copy of the boundaries with an added integer `zone_id` field
    ///
    /// `ids` must be aligned with file order, as produced by
    /// [`crate::core::zones::assign_identifiers`]. Attribute fields other
    /// than integer/real/string are not representable here and are skipped.
    pub fn write_identified_copy(&self, target: &Path, ids: &[u32]) -> ZoneResult<()> {
        log::info!("Writing identified boundaries: {}", target.display());
        remove_shapefile(target)?;

        let mut source = self.dataset.layer(0)?;

        let mut copied_fields: Vec<(String, u32)> = Vec::new();
        for field in source.defn().fields() {
            let name = field.name();
            if name == "zone_id" {
                log::debug!("Input already carries a zone_id field; it will be replaced");
                continue;
            }
            match field.field_type() {
                OGRFieldType::OFTInteger
                | OGRFieldType::OFTInteger64
                | OGRFieldType::OFTReal
                | OGRFieldType::OFTString => copied_fields.push((name, field.field_type())),
                other => log::debug!("Skipping field {} with unsupported type {}", name, other),
            }
        }

        let geometry_type = source
            .defn()
            .geom_fields()
            .next()
            .map(|g| g.field_type())
            .unwrap_or(OGRwkbGeometryType::wkbUnknown);
        let srs = source.spatial_ref();

        let driver = DriverManager::get_driver_by_name(VectorFormat::Shapefile.driver_name())?;
        let mut output = driver.create_vector_only(target)?;
        let layer = output.create_layer(LayerOptions {
            name: "boundaries",
            srs: srs.as_ref(),
            ty: geometry_type,
            ..Default::default()
        })?;

        let mut field_defs: Vec<(&str, u32)> =
            copied_fields.iter().map(|(name, ty)| (name.as_str(), *ty)).collect();
        field_defs.push(("zone_id", OGRFieldType::OFTInteger));
        layer.create_defn_fields(&field_defs)?;

        for (index, feature) in source.features().enumerate() {
            let id = *ids.get(index).ok_or_else(|| {
                ZoneError::Processing(format!(
                    "{} identifiers for at least {} features",
                    ids.len(),
                    index + 1
                ))
            })?;

            let geometry = feature
                .geometry()
                .ok_or_else(|| ZoneError::MissingField(format!("Geometry on feature {}", index)))?;

            let mut copy = Feature::new(layer.defn())?;
            copy.set_geometry(geometry.clone())?;
            for (name, field_type) in &copied_fields {
                match *field_type {
                    OGRFieldType::OFTInteger => {
                        if let Some(value) = feature.field_as_integer_by_name(name)? {
                            copy.set_field_integer(name, value)?;
                        }
                    }
                    OGRFieldType::OFTInteger64 => {
                        if let Some(value) = feature.field_as_integer64_by_name(name)? {
                            copy.set_field_integer64(name, value)?;
                        }
                    }
                    OGRFieldType::OFTReal => {
                        if let Some(value) = feature.field_as_double_by_name(name)? {
                            copy.set_field_double(name, value)?;
                        }
                    }
                    _ => {
                        if let Some(value) = feature.field_as_string_by_name(name)? {
                            copy.set_field_string(name, &value)?;
                        }
                    }
                }
            }
            copy.set_field_integer("zone_id", id as i32)?;
            copy.create(&layer)?;
        }

        Ok(())
    }
}

/// Write the snapped extent as a single-feature bounding-box shapefile
///
/// One polygon tracing the window corners, with an integer field `id = 1`,
/// matching what downstream clipping steps expect.
pub fn write_extent_polygon(target: &Path, extent: &GridExtent) -> ZoneResult<()> {
    log::info!("Writing extent polygon: {}", target.display());
    remove_shapefile(target)?;

    let (xmin, ymin) = (extent.xmin as f64, extent.ymin as f64);
    let (xmax, ymax) = (extent.xmax as f64, extent.ymax as f64);

    let mut ring = Geometry::empty(OGRwkbGeometryType::wkbLinearRing)?;
    ring.add_point_2d((xmin, ymin));
    ring.add_point_2d((xmax, ymin));
    ring.add_point_2d((xmax, ymax));
    ring.add_point_2d((xmin, ymax));
    ring.add_point_2d((xmin, ymin));
    let mut polygon = Geometry::empty(OGRwkbGeometryType::wkbPolygon)?;
    polygon.add_geometry(ring)?;

    let driver = DriverManager::get_driver_by_name(VectorFormat::Shapefile.driver_name())?;
    let mut output = driver.create_vector_only(target)?;
    let layer = output.create_layer(LayerOptions {
        name: "extent",
        ty: OGRwkbGeometryType::wkbPolygon,
        ..Default::default()
    })?;
    layer.create_defn_fields(&[("id", OGRFieldType::OFTInteger)])?;

    let mut feature = Feature::new(layer.defn())?;
    feature.set_geometry(polygon)?;
    feature.set_field_integer("id", 1)?;
    feature.create(&layer)?;

    Ok(())
}

/// Shapefile sidecar extensions removed together with the `.shp` member
const SHAPEFILE_SIDECARS: [&str; 4] = ["shp", "shx", "dbf", "prj"];

/// Remove a possibly pre-existing shapefile so the driver can recreate it
fn remove_shapefile(path: &Path) -> std::io::Result<()> {
    for ext in SHAPEFILE_SIDECARS {
        let member = path.with_extension(ext);
        if member.exists() {
            std::fs::remove_file(member)?;
        }
    }
    Ok(())
}

fn field_type_by_name(layer: &gdal::vector::Layer, name: &str, path: &Path) -> ZoneResult<u32> {
    layer
        .defn()
        .fields()
        .find(|field| field.name() == name)
        .map(|field| field.field_type())
        .ok_or_else(|| {
            ZoneError::MissingField(format!("Field {} not present in {}", name, path.display()))
        })
}
