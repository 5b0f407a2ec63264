use gdal::vector::{Feature, Geometry, LayerAccess, OGRFieldType, OGRwkbGeometryType};
use gdal::{DriverManager, LayerOptions};
use std::fs;
use std::path::Path;

use zonegrid::core::quality::summarize_raster;
use zonegrid::types::{IdAssignment, ZoneError};
use zonegrid::{PipelineConfig, ZonePipeline};

/// Three 820 m squares in a row, deliberately off the kilometre grid so the
/// snapped window is (0,0)-(3000,1000). Cell centres at 100 m resolution fall
/// strictly inside the squares, giving 9x9 cells per zone.
const SQUARES: [(f64, f64); 3] = [(140.0, 140.0), (1140.0, 140.0), (2140.0, 140.0)];
const SQUARE_SIZE: f64 = 820.0;

/// Zone codes in file order; rank order is a, b, c
const CODES: [&str; 3] = ["c", "a", "b"];

fn write_zones_fixture(zones_dir: &Path) {
    fs::create_dir_all(zones_dir).unwrap();

    let driver = DriverManager::get_driver_by_name("ESRI Shapefile").unwrap();
    let mut dataset = driver
        .create_vector_only(zones_dir.join("zones.shp"))
        .unwrap();
    let layer = dataset
        .create_layer(LayerOptions {
            name: "zones",
            ty: OGRwkbGeometryType::wkbPolygon,
            ..Default::default()
        })
        .unwrap();
    layer
        .create_defn_fields(&[("code", OGRFieldType::OFTString)])
        .unwrap();

    for ((x, y), code) in SQUARES.iter().zip(CODES) {
        let wkt = format!(
            "POLYGON(({x} {y},{xmax} {y},{xmax} {ymax},{x} {ymax},{x} {y}))",
            x = x,
            y = y,
            xmax = x + SQUARE_SIZE,
            ymax = y + SQUARE_SIZE,
        );
        let geometry = Geometry::from_wkt(&wkt).unwrap();

        let mut feature = Feature::new(layer.defn()).unwrap();
        feature.set_geometry(geometry).unwrap();
        feature.set_field_string("code", code).unwrap();
        feature.create(&layer).unwrap();
    }
}

fn write_population_fixture(data_path: &Path, rows: &[(&str, f64, f64)]) {
    let population_dir = data_path.join("inputs").join("population");
    fs::create_dir_all(&population_dir).unwrap();

    let mut contents = String::from("code,initial_population,final_population\n");
    for (code, initial, fin) in rows {
        contents.push_str(&format!("{},{},{}\n", code, initial, fin));
    }
    fs::write(population_dir.join("population.csv"), contents).unwrap();
}

fn fixture_config(data_path: &Path) -> PipelineConfig {
    write_zones_fixture(&data_path.join("inputs").join("zones"));
    let mut config = PipelineConfig::new(data_path, "code");
    config.ensure_directories().unwrap();
    config
}

#[test]
fn pipeline_produces_grid_and_lookup_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write_population_fixture(
        dir.path(),
        &[("a", 100.0, 110.0), ("b", 200.0, 190.0), ("c", 300.0, 330.0)],
    );

    let artifacts = ZonePipeline::new(config).run().unwrap();

    // Snapped window: minima floored, maxima ceiled to the kilometre.
    let extents = fs::read_to_string(&artifacts.extent_file).unwrap();
    assert_eq!(extents, "0,0,3000,1000");

    // Rank identifiers follow the code order a < b < c.
    let table = fs::read_to_string(&artifacts.population_csv).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines,
        vec![
            "zone_identity,initial_value,final_value",
            "0,100.0,110.0",
            "1,200.0,190.0",
            "2,300.0,330.0",
        ]
    );

    // The translated grid covers 30x10 cells at 100 m; zones 1 and 2 each
    // register 9x9 cells, zone 0 is swallowed by the default nodata value.
    assert!(artifacts.raster.exists());
    let summary = summarize_raster(&artifacts.raster, 0.0, &[0, 1, 2]).unwrap();
    assert_eq!((summary.columns, summary.rows), (30, 10));
    assert_eq!(summary.zone_cells.get(&1), Some(&81));
    assert_eq!(summary.zone_cells.get(&2), Some(&81));
    assert_eq!(summary.nodata_cells, 300 - 162);

    // The extent polygon is a valid dataset covering the snapped window.
    let extent_ds = gdal::Dataset::open(&artifacts.extent_shapefile).unwrap();
    let envelope = extent_ds.layer(0).unwrap().get_extent().unwrap();
    assert_eq!(envelope.MinX, 0.0);
    assert_eq!(envelope.MaxX, 3000.0);
    assert_eq!(envelope.MaxY, 1000.0);
}

#[test]
fn positional_policy_numbers_zones_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixture_config(dir.path());
    config.id_assignment = IdAssignment::Positional;
    write_population_fixture(
        dir.path(),
        &[("a", 100.0, 110.0), ("b", 200.0, 190.0), ("c", 300.0, 330.0)],
    );

    let artifacts = ZonePipeline::new(config).run().unwrap();

    // File order is c, a, b, so zone 0 carries c's population.
    let table = fs::read_to_string(&artifacts.population_csv).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[1], "0,300.0,330.0");
    assert_eq!(lines[2], "1,100.0,110.0");
    assert_eq!(lines[3], "2,200.0,190.0");
}

#[test]
fn missing_population_row_aborts_before_rasterisation() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    write_population_fixture(dir.path(), &[("a", 100.0, 110.0), ("c", 300.0, 330.0)]);

    let raster_temp = config.raster_temp();
    let result = ZonePipeline::new(config).run();

    assert!(matches!(result, Err(ZoneError::Contiguity(_))));
    assert!(!raster_temp.exists());
}

#[test]
fn empty_zones_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path();
    fs::create_dir_all(data_path.join("inputs").join("zones")).unwrap();
    let config = PipelineConfig::new(data_path, "code");
    config.ensure_directories().unwrap();
    write_population_fixture(data_path, &[("a", 1.0, 1.0)]);

    let result = ZonePipeline::new(config).run();
    assert!(matches!(result, Err(ZoneError::Processing(_))));
}

#[test]
fn unknown_sort_field_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixture_config(dir.path());
    config.sort_field = "no_such_field".to_string();
    write_population_fixture(dir.path(), &[("a", 1.0, 1.0)]);

    let result = ZonePipeline::new(config).run();
    assert!(matches!(result, Err(ZoneError::MissingField(_))));
}
