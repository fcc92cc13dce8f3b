//! Load the parameter feed (ordered rows with a `Selection` column)

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::Parameters;
use crate::error::Result;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Selection", default)]
    selection: Option<String>,
}

/// Load and validate parameters from a CSV file
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<Parameters> {
    let reader = Reader::from_path(path)?;
    read_parameters(reader)
}

/// Load and validate parameters from any reader
pub fn load_parameters_from_reader<R: Read>(reader: R) -> Result<Parameters> {
    read_parameters(Reader::from_reader(reader))
}

fn read_parameters<R: Read>(mut reader: Reader<R>) -> Result<Parameters> {
    let mut selections = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        selections.push(row.selection.unwrap_or_default());
    }

    let params = Parameters::from_selections(&selections)?;
    log::info!(
        "parameters: inception {}, window {}..={}, {:?} recognition, {:?} transition",
        params.inception_year(),
        params.start_year(),
        params.end_year(),
        params.recognition_mode,
        params.transition_approach
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GmmError;
    use crate::parameters::{RecognitionMode, TransitionApproach};

    #[test]
    fn test_load_from_reader_ignores_extra_columns() {
        let data = "Parameter,Selection\n\
                    Inception Date,01/01/2020\n\
                    Start Date,01/01/2020\n\
                    End Date,31/12/2024\n\
                    New Business CSM,Calculation\n\
                    Currency,\n\
                    Reporting Basis,\n\
                    Transition Approach,Modified Retrospective Approach\n";
        let params = load_parameters_from_reader(data.as_bytes()).unwrap();

        assert_eq!(params.end_year(), 2024);
        assert_eq!(params.recognition_mode, RecognitionMode::Calculation);
        assert_eq!(params.transition_approach, TransitionApproach::ModifiedRetrospective);
    }

    #[test]
    fn test_short_feed_reports_missing_position() {
        let data = "Selection\n01/01/2020\n01/01/2020\n";
        let err = load_parameters_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, GmmError::MissingParameter { position: 2 }));
    }
}
