use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Row, Sex, Species};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to produce the startup dataset. Always fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' has unsupported type {found}")]
    ColumnType { column: String, found: String },

    #[error("row {row} is not a record object")]
    InvalidRecord { row: usize },

    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no complete rows left after dropping missing values")]
    Empty,
}

type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean the penguins dataset.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – palmerpenguins layout, `NA` / empty cells are missing
/// * `.json`    – `[{ "species": "Adelie", "island": ..., ... }, ...]`
/// * `.parquet` – flat columns, nulls are missing
///
/// Rows with a missing value in any tracked column are dropped.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?)?,
        "json" => read_json(&std::fs::read_to_string(path)?)?,
        "parquet" | "pq" => read_parquet(std::fs::File::open(path)?)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let total = records.len();
    let rows = clean(records)?;
    log::info!(
        "Loaded {} rows from {} ({} dropped for missing values)",
        rows.len(),
        path.display(),
        total - rows.len()
    );

    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Dataset::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Raw records and cleaning
// ---------------------------------------------------------------------------

const SPECIES: &str = "species";
const ISLAND: &str = "island";
const BILL_LENGTH: &str = "bill_length_mm";
const BILL_DEPTH: &str = "bill_depth_mm";
const FLIPPER_LENGTH: &str = "flipper_length_mm";
const BODY_MASS: &str = "body_mass_g";
const SEX: &str = "sex";
const YEAR: &str = "year";

/// One source record before cleaning; `None` marks a missing cell.
#[derive(Debug, Default, Clone, PartialEq)]
struct RawRecord {
    species: Option<String>,
    island: Option<String>,
    bill_length_mm: Option<f64>,
    bill_depth_mm: Option<f64>,
    flipper_length_mm: Option<f64>,
    body_mass_g: Option<f64>,
    sex: Option<String>,
    year: Option<i64>,
}

/// Drop incomplete records and validate the rest.
fn clean(records: Vec<RawRecord>) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(records.len());
    for (row_no, rec) in records.into_iter().enumerate() {
        if let Some(row) = rec.into_row(row_no)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

impl RawRecord {
    fn into_row(self, row: usize) -> Result<Option<Row>> {
        let (
            Some(species),
            Some(island),
            Some(bill_length_mm),
            Some(bill_depth_mm),
            Some(flipper_length_mm),
            Some(body_mass_g),
            Some(sex),
            Some(year),
        ) = (
            self.species,
            self.island,
            self.bill_length_mm,
            self.bill_depth_mm,
            self.flipper_length_mm,
            self.body_mass_g,
            self.sex,
            self.year,
        )
        else {
            return Ok(None);
        };

        let species: Species = species.parse().map_err(|_| LoadError::InvalidValue {
            row,
            column: SPECIES,
            value: species.clone(),
        })?;
        let sex: Sex = sex.parse().map_err(|_| LoadError::InvalidValue {
            row,
            column: SEX,
            value: sex.clone(),
        })?;
        let year = i32::try_from(year).map_err(|_| LoadError::InvalidValue {
            row,
            column: YEAR,
            value: year.to_string(),
        })?;

        for (column, value) in [
            (BILL_LENGTH, bill_length_mm),
            (BILL_DEPTH, bill_depth_mm),
            (FLIPPER_LENGTH, flipper_length_mm),
            (BODY_MASS, body_mass_g),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LoadError::InvalidValue {
                    row,
                    column,
                    value: value.to_string(),
                });
            }
        }

        Ok(Some(Row {
            species,
            island: island.trim().to_string(),
            bill_length_mm,
            bill_depth_mm,
            flipper_length_mm,
            body_mass_g,
            sex,
            year,
        }))
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns (e.g. `rowid`) are ignored.
fn read_csv<R: Read>(source: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();
    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };

    let species_idx = index_of(SPECIES)?;
    let island_idx = index_of(ISLAND)?;
    let bill_length_idx = index_of(BILL_LENGTH)?;
    let bill_depth_idx = index_of(BILL_DEPTH)?;
    let flipper_idx = index_of(FLIPPER_LENGTH)?;
    let mass_idx = index_of(BODY_MASS)?;
    let sex_idx = index_of(SEX)?;
    let year_idx = index_of(YEAR)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let text = |idx: usize| csv_cell(record.get(idx).unwrap_or(""));
        let number = |idx: usize, column: &'static str| -> Result<Option<f64>> {
            text(idx)
                .map(|s| {
                    s.parse::<f64>().map_err(|_| LoadError::InvalidValue {
                        row: row_no,
                        column,
                        value: s.clone(),
                    })
                })
                .transpose()
                .map(|v| v.filter(|v| !v.is_nan()))
        };

        records.push(RawRecord {
            species: text(species_idx),
            island: text(island_idx),
            bill_length_mm: number(bill_length_idx, BILL_LENGTH)?,
            bill_depth_mm: number(bill_depth_idx, BILL_DEPTH)?,
            flipper_length_mm: number(flipper_idx, FLIPPER_LENGTH)?,
            body_mass_g: number(mass_idx, BODY_MASS)?,
            sex: text(sex_idx),
            year: text(year_idx)
                .map(|s| {
                    s.parse::<i64>().map_err(|_| LoadError::InvalidValue {
                        row: row_no,
                        column: YEAR,
                        value: s.clone(),
                    })
                })
                .transpose()?,
        });
    }
    Ok(records)
}

/// Normalise a CSV cell, mapping the usual missing-value markers to `None`.
fn csv_cell(s: &str) -> Option<String> {
    let s = s.trim();
    match s {
        "" | "NA" | "NaN" | "nan" | "null" | "None" => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "species": "Adelie", "island": "Torgersen", "bill_length_mm": 39.1,
///     "bill_depth_mm": 18.7, "flipper_length_mm": 181, "body_mass_g": 3750,
///     "sex": "male", "year": 2007 },
///   ...
/// ]
/// ```
fn read_json(text: &str) -> Result<Vec<RawRecord>> {
    let root: JsonValue = serde_json::from_str(text)?;
    let Some(items) = root.as_array() else {
        return Err(LoadError::InvalidRecord { row: 0 });
    };

    items
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let obj = item.as_object().ok_or(LoadError::InvalidRecord { row })?;
            let text = |column: &'static str| -> Result<Option<String>> {
                match obj.get(column) {
                    None | Some(JsonValue::Null) => Ok(None),
                    Some(JsonValue::String(s)) => Ok(csv_cell(s)),
                    Some(other) => Err(LoadError::InvalidValue {
                        row,
                        column,
                        value: other.to_string(),
                    }),
                }
            };
            let number = |column: &'static str| -> Result<Option<f64>> {
                match obj.get(column) {
                    None | Some(JsonValue::Null) => Ok(None),
                    Some(JsonValue::Number(n)) => Ok(n.as_f64().filter(|v| !v.is_nan())),
                    Some(other) => Err(LoadError::InvalidValue {
                        row,
                        column,
                        value: other.to_string(),
                    }),
                }
            };

            Ok(RawRecord {
                species: text(SPECIES)?,
                island: text(ISLAND)?,
                bill_length_mm: number(BILL_LENGTH)?,
                bill_depth_mm: number(BILL_DEPTH)?,
                flipper_length_mm: number(FLIPPER_LENGTH)?,
                body_mass_g: number(BODY_MASS)?,
                sex: text(SEX)?,
                year: number(YEAR)?.map(|y| y as i64),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat schema, one column per attribute. Categorical columns may be plain
/// or dictionary-encoded strings (what Pandas writes for `category`), numeric
/// columns any integer or float width.
fn read_parquet(file: std::fs::File) -> Result<Vec<RawRecord>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let column = |name: &str| {
            batch
                .column_by_name(name)
                .cloned()
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        let species = string_column(column(SPECIES)?, SPECIES)?;
        let island = string_column(column(ISLAND)?, ISLAND)?;
        let bill_length = float_column(column(BILL_LENGTH)?, BILL_LENGTH)?;
        let bill_depth = float_column(column(BILL_DEPTH)?, BILL_DEPTH)?;
        let flipper = float_column(column(FLIPPER_LENGTH)?, FLIPPER_LENGTH)?;
        let mass = float_column(column(BODY_MASS)?, BODY_MASS)?;
        let sex = string_column(column(SEX)?, SEX)?;
        let year = cast(&column(YEAR)?, &DataType::Int64)?;

        let species = species.as_string::<i32>();
        let island = island.as_string::<i32>();
        let sex = sex.as_string::<i32>();
        let bill_length = bill_length.as_primitive::<Float64Type>();
        let bill_depth = bill_depth.as_primitive::<Float64Type>();
        let flipper = flipper.as_primitive::<Float64Type>();
        let mass = mass.as_primitive::<Float64Type>();
        let year = year.as_primitive::<Int64Type>();

        let float_at = |arr: &arrow::array::Float64Array, row: usize| {
            (!arr.is_null(row))
                .then(|| arr.value(row))
                .filter(|v| !v.is_nan())
        };
        let text_at = |arr: &arrow::array::StringArray, row: usize| {
            (!arr.is_null(row))
                .then(|| arr.value(row))
                .and_then(csv_cell)
        };

        for row in 0..batch.num_rows() {
            records.push(RawRecord {
                species: text_at(species, row),
                island: text_at(island, row),
                bill_length_mm: float_at(bill_length, row),
                bill_depth_mm: float_at(bill_depth, row),
                flipper_length_mm: float_at(flipper, row),
                body_mass_g: float_at(mass, row),
                sex: text_at(sex, row),
                year: (!year.is_null(row)).then(|| year.value(row)),
            });
        }
    }
    Ok(records)
}

fn string_column(col: ArrayRef, name: &str) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => {
            Ok(cast(&col, &DataType::Utf8)?)
        }
        other => Err(LoadError::ColumnType {
            column: name.to_string(),
            found: format!("{other:?}"),
        }),
    }
}

fn float_column(col: ArrayRef, name: &str) -> Result<ArrayRef> {
    if col.data_type().is_numeric() {
        Ok(cast(&col, &DataType::Float64)?)
    } else {
        Err(LoadError::ColumnType {
            column: name.to_string(),
            found: format!("{:?}", col.data_type()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const CSV: &str = "\
rowid,species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year
1,Adelie,Torgersen,39.1,18.7,181,3750,male,2007
2,Adelie,Torgersen,NA,NA,NA,NA,NA,2007
3,Gentoo,Biscoe,46.1,13.2,211,4500,female,2007
4,Chinstrap,Dream,46.5,17.9,192,3500,,2007
";

    #[test]
    fn csv_drops_rows_with_missing_cells() {
        let rows = clean(read_csv(CSV.as_bytes()).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].species, Species::Adelie);
        assert_eq!(rows[0].body_mass_g, 3750.0);
        assert_eq!(rows[1].species, Species::Gentoo);
        assert_eq!(rows[1].sex, Sex::Female);
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let csv = "species,island\nAdelie,Dream\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == BILL_LENGTH));
    }

    #[test]
    fn csv_non_numeric_measurement_is_an_error() {
        let csv = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year
Adelie,Dream,long,18.7,181,3750,male,2007
";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { row: 0, column: BILL_LENGTH, .. }
        ));
    }

    #[test]
    fn unknown_species_is_an_error() {
        let csv = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year
Emperor,Dream,40.0,18.7,181,3750,male,2007
";
        let err = clean(read_csv(csv.as_bytes()).unwrap()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: SPECIES, .. }));
    }

    #[test]
    fn non_positive_measurement_is_an_error() {
        let csv = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year
Adelie,Dream,40.0,18.7,181,0,male,2007
";
        let err = clean(read_csv(csv.as_bytes()).unwrap()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: BODY_MASS, .. }));
    }

    #[test]
    fn json_records_with_nulls_are_dropped() {
        let json = r#"[
            {"species": "Adelie", "island": "Torgersen", "bill_length_mm": 39.1,
             "bill_depth_mm": 18.7, "flipper_length_mm": 181, "body_mass_g": 3750,
             "sex": "male", "year": 2007},
            {"species": "Adelie", "island": "Torgersen", "bill_length_mm": null,
             "bill_depth_mm": 18.7, "flipper_length_mm": 181, "body_mass_g": 3750,
             "sex": "male", "year": 2007},
            {"species": "Gentoo", "island": "Biscoe", "bill_length_mm": 46.1,
             "bill_depth_mm": 13.2, "flipper_length_mm": 211, "body_mass_g": 4500,
             "year": 2008}
        ]"#;
        let rows = clean(read_json(json).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].island, "Torgersen");
        assert_eq!(rows[0].flipper_length_mm, 181.0);
    }

    #[test]
    fn json_top_level_must_be_an_array() {
        let err = read_json(r#"{"species": "Adelie"}"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRecord { row: 0 }));
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penguins.csv");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(CSV.as_bytes())
            .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.islands, vec!["Torgersen", "Biscoe"]);
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penguins.xlsx");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn load_file_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn load_file_with_only_incomplete_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penguins.csv");
        std::fs::write(
            &path,
            "species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year\n\
             Adelie,Torgersen,NA,NA,NA,NA,NA,2007\n",
        )
        .unwrap();
        assert!(matches!(load_file(&path), Err(LoadError::Empty)));
    }

    #[test]
    fn load_file_reads_parquet_with_integer_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(SPECIES, DataType::Utf8, true),
            Field::new(ISLAND, DataType::Utf8, true),
            Field::new(BILL_LENGTH, DataType::Float64, true),
            Field::new(BILL_DEPTH, DataType::Float64, true),
            Field::new(FLIPPER_LENGTH, DataType::Int64, true),
            Field::new(BODY_MASS, DataType::Int64, true),
            Field::new(SEX, DataType::Utf8, true),
            Field::new(YEAR, DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Adelie"), Some("Gentoo")])),
                Arc::new(StringArray::from(vec![Some("Torgersen"), Some("Biscoe")])),
                Arc::new(Float64Array::from(vec![Some(39.1), None])),
                Arc::new(Float64Array::from(vec![Some(18.7), Some(13.2)])),
                Arc::new(Int64Array::from(vec![Some(181), Some(211)])),
                Arc::new(Int64Array::from(vec![Some(3750), Some(4500)])),
                Arc::new(StringArray::from(vec![Some("male"), Some("female")])),
                Arc::new(Int64Array::from(vec![Some(2007), Some(2008)])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penguins.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0].flipper_length_mm, 181.0);
        assert_eq!(ds.rows[0].year, 2007);
    }
}
