//! Run parameters: projection window, initial-recognition mode and transition approach
//!
//! The parameter feed is an ordered list of selections. Recognized positions:
//! - `[0]` inception date
//! - `[1]` projection start date
//! - `[2]` projection end date
//! - `[3]` initial-recognition mode (`Input` / `Calculation`)
//! - `[6]` transition approach
//!
//! Every selection is validated here, once, so the engine only ever sees closed enums.

pub mod loader;

pub use loader::{load_parameters, load_parameters_from_reader};

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GmmError, Result};

pub const INCEPTION_DATE: usize = 0;
pub const PROJECTION_START: usize = 1;
pub const PROJECTION_END: usize = 2;
pub const RECOGNITION_MODE: usize = 3;
pub const TRANSITION_APPROACH: usize = 6;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// How the CSM / loss component at initial recognition is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionMode {
    /// Taken as supplied on the MAP004 row
    Input,
    /// Derived from the present values of expected cash flows
    Calculation,
}

impl FromStr for RecognitionMode {
    type Err = GmmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Input" => Ok(RecognitionMode::Input),
            "Calculation" => Ok(RecognitionMode::Calculation),
            other => Err(GmmError::UnrecognizedParameterSelection {
                position: RECOGNITION_MODE,
                value: other.to_string(),
            }),
        }
    }
}

/// IFRS 17 transition approach; selects the remaining-coverage transition column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionApproach {
    ModifiedRetrospective,
    FairValue,
    Other,
}

impl FromStr for TransitionApproach {
    type Err = GmmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Modified Retrospective Approach" => Ok(TransitionApproach::ModifiedRetrospective),
            "Fair Value Approach" => Ok(TransitionApproach::FairValue),
            "Other" => Ok(TransitionApproach::Other),
            other => Err(GmmError::UnrecognizedParameterSelection {
                position: TRANSITION_APPROACH,
                value: other.to_string(),
            }),
        }
    }
}

/// Validated run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub inception_date: NaiveDate,
    pub projection_start: NaiveDate,
    pub projection_end: NaiveDate,
    pub recognition_mode: RecognitionMode,
    pub transition_approach: TransitionApproach,
}

impl Parameters {
    /// Parse the ordered `Selection` values of the parameter feed
    pub fn from_selections<S: AsRef<str>>(selections: &[S]) -> Result<Self> {
        let params = Self {
            inception_date: parse_date(selections, INCEPTION_DATE)?,
            projection_start: parse_date(selections, PROJECTION_START)?,
            projection_end: parse_date(selections, PROJECTION_END)?,
            recognition_mode: selection(selections, RECOGNITION_MODE)?.parse()?,
            transition_approach: selection(selections, TRANSITION_APPROACH)?.parse()?,
        };

        if params.start_year() > params.end_year() {
            return Err(GmmError::InvalidProjectionWindow {
                start: params.start_year(),
                end: params.end_year(),
            });
        }

        Ok(params)
    }

    /// Parameters for a window given in whole years, mostly for tests and fixtures
    pub fn for_years(
        inception_year: i32,
        start_year: i32,
        end_year: i32,
        recognition_mode: RecognitionMode,
        transition_approach: TransitionApproach,
    ) -> Result<Self> {
        let jan_first = |year: i32, position: usize| {
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| GmmError::InvalidDate {
                position,
                value: year.to_string(),
            })
        };
        if start_year > end_year {
            return Err(GmmError::InvalidProjectionWindow {
                start: start_year,
                end: end_year,
            });
        }
        Ok(Self {
            inception_date: jan_first(inception_year, INCEPTION_DATE)?,
            projection_start: jan_first(start_year, PROJECTION_START)?,
            projection_end: jan_first(end_year, PROJECTION_END)?,
            recognition_mode,
            transition_approach,
        })
    }

    pub fn inception_year(&self) -> i32 {
        self.inception_date.year()
    }

    pub fn start_year(&self) -> i32 {
        self.projection_start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.projection_end.year()
    }

    /// Projection periods in increasing order
    pub fn periods(&self) -> impl Iterator<Item = i32> {
        self.start_year()..=self.end_year()
    }
}

fn selection<S: AsRef<str>>(selections: &[S], position: usize) -> Result<&str> {
    selections
        .get(position)
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .ok_or(GmmError::MissingParameter { position })
}

fn parse_date<S: AsRef<str>>(selections: &[S], position: usize) -> Result<NaiveDate> {
    let value = selection(selections, position)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| GmmError::InvalidDate {
        position,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selections(mode: &str, approach: &str) -> Vec<String> {
        vec![
            "01/01/2020".into(),
            "01/01/2020".into(),
            "31/12/2022".into(),
            mode.into(),
            "".into(),
            "".into(),
            approach.into(),
        ]
    }

    #[test]
    fn test_parse_full_selection() {
        let params = Parameters::from_selections(&selections("Input", "Fair Value Approach")).unwrap();

        assert_eq!(params.inception_year(), 2020);
        assert_eq!(params.start_year(), 2020);
        assert_eq!(params.end_year(), 2022);
        assert_eq!(params.recognition_mode, RecognitionMode::Input);
        assert_eq!(params.transition_approach, TransitionApproach::FairValue);
        assert_eq!(params.periods().collect::<Vec<_>>(), vec![2020, 2021, 2022]);
    }

    #[test]
    fn test_unrecognized_mode_fails_fast() {
        let err = Parameters::from_selections(&selections("Manual", "Other")).unwrap_err();
        assert!(matches!(
            err,
            GmmError::UnrecognizedParameterSelection { position: 3, ref value } if value == "Manual"
        ));
    }

    #[test]
    fn test_unrecognized_transition_fails_fast() {
        let err = Parameters::from_selections(&selections("Calculation", "Full Retrospective")).unwrap_err();
        assert!(matches!(err, GmmError::UnrecognizedParameterSelection { position: 6, .. }));
    }

    #[test]
    fn test_missing_transition_position() {
        let mut sel = selections("Input", "Other");
        sel.truncate(4);
        let err = Parameters::from_selections(&sel).unwrap_err();
        assert!(matches!(err, GmmError::MissingParameter { position: 6 }));
    }

    #[test]
    fn test_bad_date() {
        let mut sel = selections("Input", "Other");
        sel[1] = "2020-01-01".into();
        let err = Parameters::from_selections(&sel).unwrap_err();
        assert!(matches!(err, GmmError::InvalidDate { position: 1, .. }));
    }

    #[test]
    fn test_reversed_window_rejected() {
        let mut sel = selections("Input", "Other");
        sel[1] = "01/01/2023".into();
        let err = Parameters::from_selections(&sel).unwrap_err();
        assert!(matches!(err, GmmError::InvalidProjectionWindow { start: 2023, end: 2022 }));
    }

    #[test]
    fn test_for_years() {
        let params = Parameters::for_years(2019, 2020, 2021, RecognitionMode::Calculation, TransitionApproach::Other)
            .unwrap();
        assert_eq!(params.inception_year(), 2019);
        assert_eq!(params.periods().count(), 2);
    }
}
