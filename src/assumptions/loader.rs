//! Load the assumption feed from CSV

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{AssumptionRow, BusinessType, MovementCode};
use crate::error::Result;

/// Raw CSV row matching the assumption feed columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Cohort")]
    cohort: i32,
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Sub-Product")]
    sub_product: String,
    #[serde(rename = "BusinessType")]
    business_type: String,
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Gross_BE")]
    be: Option<f64>,
    #[serde(rename = "Gross_RA")]
    ra: Option<f64>,
    #[serde(rename = "Gross_CSM")]
    csm: Option<f64>,
    #[serde(rename = "Gross_LossC_BE")]
    loss_be: Option<f64>,
    #[serde(rename = "Gross_LossC_RA")]
    loss_ra: Option<f64>,
    #[serde(rename = "Gross_BECFPV")]
    be_cf_pv: Option<f64>,
    #[serde(rename = "Gross_RACFPV")]
    ra_cf_pv: Option<f64>,
    #[serde(rename = "Gross_Actual")]
    actual: Option<f64>,
}

impl CsvRow {
    /// Convert to a typed row, returning the number of blank amount cells
    fn to_row(self) -> Result<(AssumptionRow, usize)> {
        let business_type: BusinessType = self.business_type.parse()?;
        let key: MovementCode = self.key.parse()?;

        let amounts = [
            self.be,
            self.ra,
            self.csm,
            self.loss_be,
            self.loss_ra,
            self.be_cf_pv,
            self.ra_cf_pv,
            self.actual,
        ];
        let missing = amounts.iter().filter(|v| v.is_none()).count();

        let row = AssumptionRow {
            cohort: self.cohort,
            product: self.product.trim().to_string(),
            sub_product: self.sub_product.trim().to_string(),
            business_type,
            key,
            be: self.be.unwrap_or(0.0),
            ra: self.ra.unwrap_or(0.0),
            csm: self.csm.unwrap_or(0.0),
            loss_be: self.loss_be.unwrap_or(0.0),
            loss_ra: self.loss_ra.unwrap_or(0.0),
            be_cf_pv: self.be_cf_pv.unwrap_or(0.0),
            ra_cf_pv: self.ra_cf_pv.unwrap_or(0.0),
            actual: self.actual.unwrap_or(0.0),
        };

        Ok((row, missing))
    }
}

/// Assumption rows as loaded, plus what the loader had to fill in
#[derive(Debug, Clone, Default)]
pub struct LoadedAssumptions {
    pub rows: Vec<AssumptionRow>,
    /// Blank amount cells, loaded as zero
    pub missing_values: usize,
}

impl LoadedAssumptions {
    pub fn from_rows(rows: Vec<AssumptionRow>) -> Self {
        Self {
            rows,
            missing_values: 0,
        }
    }
}

/// Load the assumption feed from a CSV file
pub fn load_assumptions<P: AsRef<Path>>(path: P) -> Result<LoadedAssumptions> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load the assumption feed from any reader (e.g., string buffer, upload stream)
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> Result<LoadedAssumptions> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut reader: Reader<R>) -> Result<LoadedAssumptions> {
    let mut loaded = LoadedAssumptions::default();

    for result in reader.deserialize() {
        let raw: CsvRow = result?;
        let (row, missing) = raw.to_row()?;
        loaded.rows.push(row);
        loaded.missing_values += missing;
    }

    log::debug!(
        "loaded {} assumption rows ({} blank amounts)",
        loaded.rows.len(),
        loaded.missing_values
    );
    Ok(loaded)
}
