use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Columns every dataset file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["country", "carbon-intensity", "low-carbon", "renewable"];

/// Per-country energy metrics as loaded from the dataset file.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub country: String,
    /// gCO2/kWh.
    pub carbon_intensity: f64,
    pub low_carbon_pct: f64,
    pub renewable_pct: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    country: String,
    #[serde(rename = "carbon-intensity")]
    carbon_intensity: f64,
    #[serde(rename = "low-carbon")]
    low_carbon: f64,
    renewable: f64,
}

impl From<CsvRow> for CountryRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            country: row.country,
            carbon_intensity: row.carbon_intensity,
            low_carbon_pct: row.low_carbon,
            renewable_pct: row.renewable,
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column `{column}`")]
    MissingColumn { column: &'static str },
    #[error("row {row}: country name is blank")]
    BlankCountry { row: usize },
    #[error("row {row}: `{column}` for {country} is {value}, expected {expected}")]
    OutOfRange {
        row: usize,
        country: String,
        column: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("row {row}: duplicate country {country}")]
    DuplicateCountry { row: usize, country: String },
    #[error("dataset contains no countries")]
    Empty,
}

/// Requested country is not part of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("country {country:?} is not present in the dataset")]
pub struct LookupError {
    pub country: String,
}

/// Immutable per-country table, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<CountryRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    pub fn from_records(records: Vec<CountryRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            // Header occupies line 1 of the source file.
            let row = position + 2;
            validate_record(row, record)?;
            if index.insert(record.country.clone(), position).is_some() {
                return Err(DatasetError::DuplicateCountry {
                    row,
                    country: record.country.clone(),
                });
            }
        }

        Ok(Self { records, index })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(DatasetError::MissingColumn { column });
            }
        }

        let records = reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(CountryRecord::from))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_records(records)
    }

    pub fn from_csv_str(data: &str) -> Result<Self, DatasetError> {
        Self::from_reader(data.as_bytes())
    }

    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            target: "carbon_dashboard::dataset",
            path = %path.display(),
            countries = dataset.len(),
            "dataset.loaded"
        );
        Ok(dataset)
    }

    pub fn get(&self, country: &str) -> Option<&CountryRecord> {
        self.index.get(country).map(|&position| &self.records[position])
    }

    pub fn lookup(&self, country: &str) -> Result<&CountryRecord, LookupError> {
        self.get(country).ok_or_else(|| LookupError {
            country: country.to_string(),
        })
    }

    pub fn contains(&self, country: &str) -> bool {
        self.index.contains_key(country)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in file order.
    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter()
    }
}

fn validate_record(row: usize, record: &CountryRecord) -> Result<(), DatasetError> {
    if record.country.trim().is_empty() {
        return Err(DatasetError::BlankCountry { row });
    }

    let out_of_range = |column: &'static str, value: f64, expected: &'static str| {
        DatasetError::OutOfRange {
            row,
            country: record.country.clone(),
            column,
            value,
            expected,
        }
    };

    if !record.carbon_intensity.is_finite() || record.carbon_intensity < 0.0 {
        return Err(out_of_range(
            "carbon-intensity",
            record.carbon_intensity,
            "a non-negative number",
        ));
    }
    for (column, value) in [
        ("low-carbon", record.low_carbon_pct),
        ("renewable", record.renewable_pct),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(out_of_range(column, value, "a percentage in [0, 100]"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
country,carbon-intensity,low-carbon,renewable
Belgium,120,45.0,30.0
France, 56 ,91.2,27.5
Poland,662,23.4,22.9
";

    #[test]
    fn parses_rows_in_file_order() {
        let dataset = Dataset::from_csv_str(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 3);
        let names: Vec<_> = dataset.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, ["Belgium", "France", "Poland"]);

        let france = dataset.get("France").unwrap();
        assert_eq!(france.carbon_intensity, 56.0);
        assert_eq!(france.low_carbon_pct, 91.2);
    }

    #[test]
    fn percentages_stay_within_bounds() {
        let dataset = Dataset::from_csv_str(SAMPLE).unwrap();
        for record in dataset.iter() {
            assert!((0.0..=100.0).contains(&record.low_carbon_pct));
            assert!((0.0..=100.0).contains(&record.renewable_pct));
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let data = "country,iso,carbon-intensity,low-carbon,renewable\nSpain,ES,150,60.0,50.1\n";
        let dataset = Dataset::from_csv_str(data).unwrap();
        assert_eq!(dataset.lookup("Spain").unwrap().renewable_pct, 50.1);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let data = "country,carbon-intensity,low-carbon\nSpain,150,60.0\n";
        let err = Dataset::from_csv_str(data).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: "renewable"
            }
        ));
    }

    #[test]
    fn rejects_percentage_above_hundred() {
        let data = "country,carbon-intensity,low-carbon,renewable\nSpain,150,160.0,50.0\n";
        match Dataset::from_csv_str(data).unwrap_err() {
            DatasetError::OutOfRange {
                row,
                column,
                country,
                ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, "low-carbon");
                assert_eq!(country, "Spain");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_intensity_and_duplicates() {
        let negative = "country,carbon-intensity,low-carbon,renewable\nSpain,-1,60,50\n";
        assert!(matches!(
            Dataset::from_csv_str(negative).unwrap_err(),
            DatasetError::OutOfRange {
                column: "carbon-intensity",
                ..
            }
        ));

        let duplicate =
            "country,carbon-intensity,low-carbon,renewable\nSpain,1,60,50\nSpain,2,61,51\n";
        assert!(matches!(
            Dataset::from_csv_str(duplicate).unwrap_err(),
            DatasetError::DuplicateCountry { row: 3, .. }
        ));
    }

    #[test]
    fn non_numeric_cell_is_a_csv_error() {
        let data = "country,carbon-intensity,low-carbon,renewable\nSpain,lots,60,50\n";
        assert!(matches!(
            Dataset::from_csv_str(data).unwrap_err(),
            DatasetError::Csv(_)
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let data = "country,carbon-intensity,low-carbon,renewable\n";
        assert!(matches!(
            Dataset::from_csv_str(data).unwrap_err(),
            DatasetError::Empty
        ));
    }

    #[test]
    fn lookup_reports_unknown_country() {
        let dataset = Dataset::from_csv_str(SAMPLE).unwrap();
        let err = dataset.lookup("Atlantis").unwrap_err();
        assert_eq!(err.country, "Atlantis");
        assert!(!dataset.contains("Atlantis"));
    }

    #[test]
    fn unreadable_file_keeps_path() {
        let err = Dataset::from_file(Path::new("/nonexistent/carbon.csv")).unwrap_err();
        match err {
            DatasetError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/carbon.csv"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
