use crate::config::PipelineConfig;
use crate::types::{GridExtent, ZoneError, ZoneResult};
use gdal::cpl::CslStringList;
use gdal::Dataset;
use std::ffi::{c_int, CString};
use std::path::Path;

/// Burn the `zone_id` attribute of the identified boundaries into a GeoTIFF
/// covering the snapped extent
///
/// The options mirror the `gdal_rasterize` command line: attribute burn,
/// target resolution, target extent, output type and LZW-compressed GeoTIFF
/// creation options.
pub fn rasterize_zones(
    boundaries: &Path,
    target: &Path,
    extent: &GridExtent,
    config: &PipelineConfig,
) -> ZoneResult<()> {
    let layer = boundaries
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ZoneError::InvalidFormat(format!("Bad boundaries path: {}", boundaries.display())))?;

    let options = rasterize_options(layer, extent, config);
    log::debug!("gdal_rasterize options: {:?}", options);

    let source = Dataset::open(boundaries)?;
    rasterize_to_disk(&source, target, &options)?;

    Ok(())
}

/// Translate the rasterized grid to an Arc/Info ASCII grid, assigning the
/// configured nodata value
pub fn translate_to_ascii_grid(source: &Path, target: &Path, nodata: f64) -> ZoneResult<()> {
    let options = vec![
        "-of".to_string(),
        "AAIGrid".to_string(),
        "-a_nodata".to_string(),
        format_coordinate(nodata),
    ];
    log::debug!("gdal_translate options: {:?}", options);

    let dataset = Dataset::open(source)?;
    translate_to_disk(&dataset, target, &options)?;

    Ok(())
}

fn rasterize_options(layer: &str, extent: &GridExtent, config: &PipelineConfig) -> Vec<String> {
    let resolution = format_coordinate(config.resolution);
    [
        "-l", layer,
        "-a", "zone_id",
        "-tr", &resolution, &resolution,
        "-te",
        &extent.xmin.to_string(),
        &extent.ymin.to_string(),
        &extent.xmax.to_string(),
        &extent.ymax.to_string(),
        "-ot", config.data_type.gdal_name(),
        "-of", "GTiff",
        "-co", "COMPRESS=LZW",
        "-co", "NUM_THREADS=ALL_CPUS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Render a numeric option without a trailing `.0` for whole values
fn format_coordinate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Run the library-level `GDALRasterize` with command-style options, writing
/// the result to `target`
fn rasterize_to_disk(source: &Dataset, target: &Path, options: &[String]) -> ZoneResult<Dataset> {
    let target_c = path_to_cstring(target)?;
    let gdal_options = RasterizeOptions::new(options)?;

    let mut usage_error: c_int = 0;
    let handle = unsafe {
        gdal_sys::GDALRasterize(
            target_c.as_ptr(),
            std::ptr::null_mut(),
            source.c_dataset(),
            gdal_options.c_options(),
            &mut usage_error,
        )
    };

    if usage_error == 1 {
        return Err(ZoneError::Processing("Rasterize: invalid arguments".to_string()));
    }
    if handle.is_null() {
        return Err(ZoneError::Processing(format!(
            "Rasterize failed for {}",
            target.display()
        )));
    }

    Ok(unsafe { Dataset::from_c_dataset(handle) })
}

/// Run the library-level `GDALTranslate` with command-style options
fn translate_to_disk(source: &Dataset, target: &Path, options: &[String]) -> ZoneResult<Dataset> {
    let target_c = path_to_cstring(target)?;
    let gdal_options = TranslateOptions::new(options)?;

    let mut usage_error: c_int = 0;
    let handle = unsafe {
        gdal_sys::GDALTranslate(
            target_c.as_ptr(),
            source.c_dataset(),
            gdal_options.c_options(),
            &mut usage_error,
        )
    };

    if usage_error == 1 {
        return Err(ZoneError::Processing("Translate: invalid arguments".to_string()));
    }
    if handle.is_null() {
        return Err(ZoneError::Processing(format!(
            "Translate failed for {}",
            target.display()
        )));
    }

    Ok(unsafe { Dataset::from_c_dataset(handle) })
}

fn path_to_cstring(path: &Path) -> ZoneResult<CString> {
    CString::new(path.to_string_lossy().as_ref())
        .map_err(|_| ZoneError::InvalidFormat(format!("Path contains NUL: {}", path.display())))
}

struct RasterizeOptions {
    options: *mut gdal_sys::GDALRasterizeOptions,
}

impl RasterizeOptions {
    fn new(opts: &[String]) -> ZoneResult<Self> {
        let mut c_opts = CslStringList::new();
        for opt in opts {
            c_opts.add_string(opt)?;
        }

        let options = unsafe { gdal_sys::GDALRasterizeOptionsNew(c_opts.as_ptr(), std::ptr::null_mut()) };
        if options.is_null() {
            return Err(ZoneError::Processing("Failed to create rasterize options".to_string()));
        }

        Ok(Self { options })
    }

    fn c_options(&self) -> *mut gdal_sys::GDALRasterizeOptions {
        self.options
    }
}

impl Drop for RasterizeOptions {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALRasterizeOptionsFree(self.c_options()) };
    }
}

struct TranslateOptions {
    options: *mut gdal_sys::GDALTranslateOptions,
}

impl TranslateOptions {
    fn new(opts: &[String]) -> ZoneResult<Self> {
        let mut c_opts = CslStringList::new();
        for opt in opts {
            c_opts.add_string(opt)?;
        }

        let options = unsafe { gdal_sys::GDALTranslateOptionsNew(c_opts.as_ptr(), std::ptr::null_mut()) };
        if options.is_null() {
            return Err(ZoneError::Processing("Failed to create translate options".to_string()));
        }

        Ok(Self { options })
    }

    fn c_options(&self) -> *mut gdal_sys::GDALTranslateOptions {
        self.options
    }
}

impl Drop for TranslateOptions {
    fn drop(&mut self) {
        unsafe { gdal_sys::GDALTranslateOptionsFree(self.c_options()) };
    }
}
