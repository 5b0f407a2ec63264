use crate::types::{PopulationRecord, PopulationRow, SortKey, ZoneError, ZoneResult};
use csv::ReaderBuilder;
use std::io::BufReader;
use std::path::Path;

const INITIAL_COLUMN: &str = "initial_population";
const FINAL_COLUMN: &str = "final_population";

/// Read the population table, keyed by the named zone column
///
/// The file must carry a header row containing `key_field`,
/// `initial_population` and `final_population`; other columns are ignored.
pub fn read_population(path: &Path, key_field: &str) -> ZoneResult<Vec<PopulationRecord>> {
    log::info!("Reading population table: {}", path.display());

    let file = std::fs::File::open(path).map_err(|e| {
        ZoneError::Processing(format!("Cannot open population table {}: {}", path.display(), e))
    })?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let key_idx = column_index(&headers, key_field, path)?;
    let initial_idx = column_index(&headers, INITIAL_COLUMN, path)?;
    let final_idx = column_index(&headers, FINAL_COLUMN, path)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let key = SortKey::parse(record.get(key_idx).unwrap_or(""));
        let initial_population = parse_count(&record, initial_idx, row)?;
        let final_population = parse_count(&record, final_idx, row)?;
        records.push(PopulationRecord {
            key,
            initial_population,
            final_population,
        });
    }

    log::info!("Read {} population rows", records.len());
    Ok(records)
}

/// Write the joined lookup table with the output schema
/// `zone_identity,initial_value,final_value`
pub fn write_population(path: &Path, rows: &[PopulationRow]) -> ZoneResult<()> {
    log::info!("Writing population lookup table: {}", path.display());

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> ZoneResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            ZoneError::MissingField(format!("Column {} not present in {}", name, path.display()))
        })
}

fn parse_count(record: &csv::StringRecord, index: usize, row: usize) -> ZoneResult<f64> {
    let raw = record.get(index).unwrap_or("").trim();
    raw.parse::<f64>().map_err(|_| {
        ZoneError::InvalidFormat(format!(
            "Population value {:?} on data row {} is not numeric",
            raw,
            row + 1
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("population.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_keyed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "code,initial_population,final_population\nE08000003,1000,1200\nE08000019,500,480\n",
        );

        let records = read_population(&path, "code").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, SortKey::parse("E08000003"));
        assert_eq!(records[0].initial_population, 1000.0);
        assert_eq!(records[1].final_population, 480.0);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "name,code,initial_population,final_population\nLeeds,1,10,20\n",
        );

        let records = read_population(&path, "code").unwrap();
        assert_eq!(records[0].key, SortKey::parse("1"));
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "initial_population,final_population\n10,20\n");

        assert!(matches!(
            read_population(&path, "code"),
            Err(ZoneError::MissingField(_))
        ));
    }

    #[test]
    fn non_numeric_population_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "code,initial_population,final_population\nA,lots,20\n",
        );

        assert!(matches!(
            read_population(&path, "code"),
            Err(ZoneError::InvalidFormat(_))
        ));
    }

    #[test]
    fn output_schema_uses_renamed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            PopulationRow { zone_identity: 0, initial_value: 10.0, final_value: 12.0 },
            PopulationRow { zone_identity: 1, initial_value: 20.0, final_value: 18.0 },
        ];

        write_population(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("zone_identity,initial_value,final_value"));
        assert_eq!(lines.next(), Some("0,10.0,12.0"));
    }
}
