//! Result tables handed to the surrounding application, and flat-file writers
//!
//! The engine returns [`GmmResults`] in memory. Writing CSV or JSON is optional and
//! only offered for the command-line tools.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::measurement::{GroupResult, LedgerRow, MeasurementComponentRow, RemainingCoverageRow};

pub const BEL_FILE: &str = "Reconciliation_of_BEL.csv";
pub const RA_FILE: &str = "Reconciliation_of_RA.csv";
pub const CSM_FILE: &str = "Reconciliation_of_CSM.csv";
pub const TCL_FILE: &str = "Reconciliation_of_TCL.csv";
pub const MEASUREMENT_COMPONENT_FILE: &str = "Analysis_by_measurement_component.csv";
pub const REMAINING_COVERAGE_FILE: &str = "Analysis_by_remaining_coverage.csv";
pub const JSON_FILE: &str = "ifrs17_results.json";

/// All output tables of a run, groups concatenated in (product, sub-product) order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GmmResults {
    #[serde(rename = "Reconciliation_of_BEL")]
    pub bel: Vec<LedgerRow>,
    #[serde(rename = "Reconciliation_of_RA")]
    pub ra: Vec<LedgerRow>,
    #[serde(rename = "Reconciliation_of_CSM")]
    pub csm: Vec<LedgerRow>,
    #[serde(rename = "Reconciliation_of_TCL")]
    pub tcl: Vec<LedgerRow>,
    #[serde(rename = "Analysis_by_measurement_component")]
    pub measurement_component: Vec<MeasurementComponentRow>,
    #[serde(rename = "Analysis_by_remaining_coverage")]
    pub remaining_coverage: Vec<RemainingCoverageRow>,
}

impl GmmResults {
    pub fn from_groups(groups: Vec<GroupResult>) -> Self {
        let mut results = Self::default();
        for group in groups {
            results.bel.extend(group.ledgers.bel);
            results.ra.extend(group.ledgers.ra);
            results.csm.extend(group.ledgers.csm);
            results.tcl.extend(group.ledgers.tcl);
            results.measurement_component.extend(group.measurement_component);
            results.remaining_coverage.extend(group.remaining_coverage);
        }
        results
    }

    /// Write the six tables as CSV files into `dir`, returning the paths written
    pub fn write_csv<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let written = vec![
            write_table(dir.join(BEL_FILE), &self.bel)?,
            write_table(dir.join(RA_FILE), &self.ra)?,
            write_table(dir.join(CSM_FILE), &self.csm)?,
            write_table(dir.join(TCL_FILE), &self.tcl)?,
            write_table(dir.join(MEASUREMENT_COMPONENT_FILE), &self.measurement_component)?,
            write_table(dir.join(REMAINING_COVERAGE_FILE), &self.remaining_coverage)?,
        ];
        log::info!("wrote {} CSV tables to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Write all tables into a single JSON document in `dir`
    pub fn write_json<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(JSON_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }
}

fn write_table<T: Serialize>(path: PathBuf, rows: &[T]) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{AmountField, AssumptionRow, BusinessType, MovementCode};
    use crate::measurement::{EngineConfig, GmmEngine};
    use crate::parameters::{Parameters, RecognitionMode, TransitionApproach};

    fn sample_results() -> GmmResults {
        let rows = vec![
            AssumptionRow::new(2020, "Term", "Level", BusinessType::NewBusiness, MovementCode::Map004)
                .with(AmountField::Csm, 100.0),
        ];
        let params = Parameters::for_years(2020, 2020, 2022, RecognitionMode::Input, TransitionApproach::Other).unwrap();
        GmmEngine::new(params, EngineConfig::sequential()).run(&rows).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ifrs17_gmm_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_write_csv_tables() {
        let results = sample_results();
        let dir = scratch_dir("csv");

        let written = results.write_csv(&dir).unwrap();
        assert_eq!(written.len(), 6);

        let csm = fs::read_to_string(dir.join(CSM_FILE)).unwrap();
        let mut lines = csm.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Period,Product,Sub-Product,Opening Balance,New Business,Changes in Assumptions,\
             Insurance Service Expense,Release from Experience,Changes Relating to Past Service,Closing Balance"
        );
        assert_eq!(lines.next().unwrap(), "2020,Term,Level,0.0,-100.0,0.0,0.0,0.0,0.0,-100.0");
        assert_eq!(csm.lines().count(), 4);

        let coverage = fs::read_to_string(dir.join(REMAINING_COVERAGE_FILE)).unwrap();
        assert!(coverage.contains("Liabilities for incurred claims"));
        assert_eq!(coverage.lines().count(), 1 + 3 * 4);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_json_round_trip() {
        let results = sample_results();
        let dir = scratch_dir("json");

        let path = results.write_json(&dir).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let parsed: GmmResults = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.csm, results.csm);
        assert_eq!(parsed.measurement_component.len(), 12);

        fs::remove_dir_all(&dir).unwrap();
    }
}
