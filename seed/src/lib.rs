//! Survey form importer
//!
//! Reads the CSV export of the salary survey form, normalizes the answers
//! and saves them as the JSON data set served by the API.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use common::SalaryRecord;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Record field a survey question is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Title,
    CompanySize,
    Accoms,
    Experience,
    Currency,
    PayRange,
    Area,
    CompanyOrigin,
    WorkStyle,
    WorkArea,
}

/// Form question headers, exactly as the export writes them.
const COLUMNS: [(&str, Field); 11] = [
    ("Zaman damgası", Field::Date),
    ("Kendinizi ne olarak tanımlarsınız?", Field::Title),
    ("Şirket  kadar büyük?", Field::CompanySize),
    ("Yan haklar var mı?", Field::Accoms),
    ("Tecrübe yılınız ?", Field::Experience),
    ("Maaşınızın para birimi?", Field::Currency),
    ("Maaş aralığınız?", Field::PayRange),
    ("Çalıştığınız Sektör?", Field::Area),
    ("Şirket Menşei", Field::CompanyOrigin),
    ("Çalışma Şekli?", Field::WorkStyle),
    ("Göreviniz nedir?", Field::WorkArea),
];

const DATE_TIME_FORMATS: [&str; 5] = [
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Trims a text answer. Blank answers become `None`.
pub fn clean_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Converts a free-text size or experience answer to a number.
///
/// - `"startup"` counts as 10-15 people
/// - anything with a `-` is a range: the mean of every number in it
/// - otherwise the whole answer must be a number
///
/// ```
/// assert_eq!(seed::convert_range("16-25 kişi"), Some(20.5));
/// assert_eq!(seed::convert_range("3000 uzeri"), None);
/// ```
pub fn convert_range(value: &str) -> Option<f64> {
    let value = value.trim().to_lowercase();

    if value == "startup" {
        return Some((10.0 + 15.0) / 2.0);
    }

    if value.contains('-') {
        let re = Regex::new(r"\d+\.?\d*").ok()?;
        let numbers: Vec<f64> = re
            .find_iter(&value)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        if numbers.is_empty() {
            return None;
        }
        return Some(numbers.iter().sum::<f64>() / numbers.len() as f64);
    }

    let re = Regex::new(r"^\d+\.?\d*$").ok()?;
    if re.is_match(&value) {
        value.parse().ok()
    } else {
        None
    }
}

/// Parses the form timestamp, day first.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn apply(record: &mut SalaryRecord, field: Field, value: &str) {
    match field {
        Field::Date => record.date = parse_date(value),
        Field::Title => record.title = clean_string(value),
        Field::CompanySize => record.company_size = convert_range(value),
        Field::Accoms => record.accoms = clean_string(value),
        Field::Experience => record.experience = convert_range(value),
        Field::Currency => record.currency = clean_string(value),
        Field::PayRange => record.pay_range = clean_string(value),
        Field::Area => record.area = clean_string(value),
        Field::CompanyOrigin => record.company_origin = clean_string(value),
        Field::WorkStyle => record.work_style = clean_string(value),
        Field::WorkArea => record.work_area = clean_string(value),
    }
}

/// Reads every survey answer from a CSV export. Ids start at 1 in file order.
pub fn read_survey<R: io::Read>(reader: R) -> Result<Vec<SalaryRecord>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    // Map known question headers to their column index, skip the rest
    let columns: Vec<(usize, Field)> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            let header = header.trim_start_matches('\u{feff}').trim();
            COLUMNS
                .iter()
                .find(|(name, _)| *name == header)
                .map(|(_, field)| (index, *field))
        })
        .collect();
    debug!("Mapped {} of {} known columns", columns.len(), COLUMNS.len());

    // Build one record per row
    let mut records = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let row_values = result?;
        let mut record = SalaryRecord {
            id: row as i64 + 1,
            ..Default::default()
        };
        for (index, field) in &columns {
            if let Some(value) = row_values.get(*index) {
                apply(&mut record, *field, value);
            }
        }
        records.push(record);
    }

    Ok(records)
}

/// Imports `csv_path` into `out_path`, creating the parent directory if needed.
pub fn import(csv_path: &Path, out_path: &Path) -> Result<usize, SeedError> {
    // Read and normalize the export
    let file = fs::File::open(csv_path)?;
    let records = read_survey(file)?;
    info!("📄 Read {} answers from {:?}", records.len(), csv_path);

    if let Some(dir) = out_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("📁 Created {:?}", dir);
        }
    }

    // Save to JSON file
    let json_output = serde_json::to_string_pretty(&records)?;
    fs::write(out_path, json_output)?;
    info!("💾 Saved {} records to {:?}", records.len(), out_path);

    Ok(records.len())
}
