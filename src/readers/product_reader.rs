use crate::error::{ProcessingError, Result};
use crate::fetch::ClimateParameter;
use crate::readers::station_reader::parse_compact_date;
use crate::utils::constants::{DWD_PRODUCT_PREFIX, MISSING_VALUE_SENTINEL};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// One day of a station's product file, reduced to the requested parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub date: NaiveDate,
    pub quality: Option<f64>,
    /// Values in degrees Celsius; `None` where the provider reported missing data
    pub values: Vec<(ClimateParameter, Option<f64>)>,
}

/// Reader for `produkt_klima_tag_*.txt` members of the per-station archives
pub struct ProductReader {
    parameters: Vec<ClimateParameter>,
}

impl ProductReader {
    pub fn new(parameters: Vec<ClimateParameter>) -> Self {
        Self { parameters }
    }

    /// Locate the product member inside a zip archive held in memory and parse it
    pub fn read_archive(&self, archive_bytes: &[u8]) -> Result<Vec<ProductRecord>> {
        let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;

        let member = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .find(|name| name.starts_with(DWD_PRODUCT_PREFIX))
            .ok_or_else(|| {
                ProcessingError::Provider(format!(
                    "Archive has no member starting with '{}'",
                    DWD_PRODUCT_PREFIX
                ))
            })?;

        let mut bytes = Vec::new();
        archive.by_name(&member)?.read_to_end(&mut bytes)?;

        let (text, _, _) = WINDOWS_1252.decode(&bytes);
        self.parse_product(&text)
    }

    /// Parse the `;`-separated product table
    pub fn parse_product(&self, text: &str) -> Result<Vec<ProductRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let date_index = column_index(&headers, "MESS_DATUM")?;
        let quality_index = self
            .parameters
            .first()
            .and_then(|p| headers.iter().position(|h| h == p.quality_column()));

        let value_indices = self
            .parameters
            .iter()
            .map(|p| Ok((*p, column_index(&headers, p.column())?)))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;

            // Trailing blank lines come through as single empty fields
            let Some(date_field) = row.get(date_index).filter(|f| !f.is_empty()) else {
                continue;
            };

            let date = parse_compact_date(date_field)?;
            let quality = quality_index.and_then(|i| parse_field(row.get(i)));
            let values = value_indices
                .iter()
                .map(|(parameter, index)| (*parameter, parse_field(row.get(*index))))
                .collect();

            records.push(ProductRecord {
                date,
                quality,
                values,
            });
        }

        Ok(records)
    }
}

fn column_index(headers: &StringRecord, column: &str) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        ProcessingError::Provider(format!("Product file has no '{}' column", column))
    })
}

/// Numeric field with the provider's missing marker mapped to `None`
fn parse_field(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|f| f.parse::<f64>().ok())
        .filter(|v| *v != MISSING_VALUE_SENTINEL)
}
