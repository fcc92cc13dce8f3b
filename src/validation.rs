//! Plausibility checks on the assumption feed before a run
//!
//! Checks never abort anything; they produce a [`ValidationReport`] that callers log or
//! display. Sign conventions: premiums are inflows (positive), claims and acquisition
//! cash flows are outflows (zero or negative).

use std::fmt;

use serde::Serialize;

use crate::assumptions::{AmountField, AssumptionRow, LoadedAssumptions, MovementCode, MovementIndex};
use crate::measurement::group_by_product;
use crate::parameters::{Parameters, RecognitionMode};

const BALANCE_TOLERANCE: f64 = 1e-6;

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub check: String,
    pub passed: bool,
    pub detail: String,
}

impl Finding {
    fn pass(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(check: &str, detail: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "Checked" } else { "Re-check inputs" };
        write!(f, "{}: {} -- {}", self.check, self.detail, status)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.findings.iter().all(|f| f.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.passed)
    }

    /// Log every finding, failures at warn level
    pub fn log(&self) {
        for finding in &self.findings {
            if finding.passed {
                log::info!("{finding}");
            } else {
                log::warn!("{finding}");
            }
        }
    }
}

/// Expected sign of an amount for a sign check
#[derive(Debug, Clone, Copy)]
enum Sign {
    Positive,
    NonPositive,
}

impl Sign {
    fn holds(self, value: f64) -> bool {
        match self {
            Sign::Positive => value > 0.0,
            Sign::NonPositive => value <= 0.0,
        }
    }
}

const SIGN_CHECKS: [(&str, MovementCode, AmountField, Sign); 7] = [
    ("Expected premiums", MovementCode::Map003, AmountField::BeCfPv, Sign::Positive),
    ("Actual premiums", MovementCode::Map002, AmountField::Actual, Sign::Positive),
    ("Actual cash outflows", MovementCode::Map012, AmountField::Actual, Sign::NonPositive),
    ("Expected cash outflows (BE)", MovementCode::Map013, AmountField::BeCfPv, Sign::NonPositive),
    ("Expected cash outflows (RA)", MovementCode::Map013, AmountField::RaCfPv, Sign::NonPositive),
    ("Actual acquisition cash flows", MovementCode::Map015, AmountField::Actual, Sign::NonPositive),
    ("Expected acquisition cash flows", MovementCode::Map016, AmountField::BeCfPv, Sign::NonPositive),
];

/// Run every check against a loaded feed
pub fn validate(loaded: &LoadedAssumptions, parameters: &Parameters) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.findings.push(check_missing(loaded.missing_values));
    for &(label, code, field, sign) in &SIGN_CHECKS {
        report.findings.push(check_sign(&loaded.rows, label, code, field, sign));
    }
    report.findings.push(check_be_ra_signs(&loaded.rows));
    report.findings.extend(check_new_business_csm(&loaded.rows, parameters));

    report
}

fn check_missing(missing: usize) -> Finding {
    if missing == 0 {
        Finding::pass("Missing values", "no blank amounts")
    } else {
        Finding::fail("Missing values", format!("{missing} blank amounts loaded as zero"))
    }
}

fn check_sign(rows: &[AssumptionRow], label: &str, code: MovementCode, field: AmountField, sign: Sign) -> Finding {
    let check = format!("{label} sign ({code})");
    let offending = rows
        .iter()
        .filter(|row| row.key == code && !sign.holds(row.amount(field)))
        .count();

    if offending == 0 {
        Finding::pass(&check, "correct sign")
    } else {
        Finding::fail(&check, format!("{offending} rows with incorrect sign"))
    }
}

fn check_be_ra_signs(rows: &[AssumptionRow]) -> Finding {
    let opposite = rows
        .iter()
        .filter(|row| row.be * row.ra != 0.0)
        .filter(|row| row.be.signum() != row.ra.signum())
        .count();

    if opposite == 0 {
        Finding::pass("BEL and RA signage", "BE and RA agree in sign")
    } else {
        Finding::fail(
            "BEL and RA signage",
            format!("{opposite} rows where Gross BE and Gross RA have opposite signs"),
        )
    }
}

/// New-business balance at inception: premiums + acquisition + MAP004 components net to zero
fn check_new_business_csm(rows: &[AssumptionRow], parameters: &Parameters) -> Vec<Finding> {
    const CHECK: &str = "New business CSM";

    if parameters.recognition_mode == RecognitionMode::Calculation {
        return vec![Finding::pass(CHECK, "validated by the engine run in Calculation mode")];
    }

    let year = parameters.inception_year();
    group_by_product(rows)
        .into_iter()
        .map(|((product, sub_product), members)| {
            let check = format!("{CHECK} ({product}/{sub_product})");
            let balance = MovementIndex::build(members).and_then(|index| {
                let map004 = index.row(year, MovementCode::Map004, None)?;
                let recognised = map004.map_or(0.0, |r| r.be + r.ra + r.loss_be + r.loss_ra + r.csm);
                Ok(index.lookup(year, MovementCode::Map002, None, AmountField::Actual)?
                    + index.lookup(year, MovementCode::Map015, None, AmountField::Actual)?
                    + recognised)
            });

            match balance {
                Ok(b) if b.abs() <= BALANCE_TOLERANCE => Finding::pass(&check, "balances to zero"),
                Ok(b) => Finding::fail(&check, format!("out of balance by {b:.6}")),
                Err(e) => Finding::fail(&check, e.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::BusinessType;
    use crate::parameters::TransitionApproach;

    fn nb(key: MovementCode) -> AssumptionRow {
        AssumptionRow::new(2020, "Term", "Level", BusinessType::NewBusiness, key)
    }

    fn params(mode: RecognitionMode) -> Parameters {
        Parameters::for_years(2020, 2020, 2021, mode, TransitionApproach::Other).unwrap()
    }

    fn balanced_feed() -> LoadedAssumptions {
        LoadedAssumptions::from_rows(vec![
            nb(MovementCode::Map002).with(AmountField::Actual, 500.0),
            nb(MovementCode::Map015).with(AmountField::Actual, -50.0),
            nb(MovementCode::Map004)
                .with(AmountField::Be, -300.0)
                .with(AmountField::Ra, -50.0)
                .with(AmountField::Csm, -100.0),
            nb(MovementCode::Map003).with(AmountField::BeCfPv, 800.0),
            nb(MovementCode::Map013)
                .with(AmountField::BeCfPv, -600.0)
                .with(AmountField::RaCfPv, -40.0),
        ])
    }

    #[test]
    fn test_clean_feed_passes() {
        let report = validate(&balanced_feed(), &params(RecognitionMode::Input));
        assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.findings.len(), 1 + SIGN_CHECKS.len() + 1 + 1);
    }

    #[test]
    fn test_missing_values_flagged() {
        let mut feed = balanced_feed();
        feed.missing_values = 2;
        let report = validate(&feed, &params(RecognitionMode::Input));
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].check, "Missing values");
    }

    #[test]
    fn test_sign_checks() {
        let mut feed = balanced_feed();
        feed.rows.push(
            AssumptionRow::new(2021, "Term", "Level", BusinessType::InForce, MovementCode::Map012)
                .with(AmountField::Actual, 10.0),
        );
        feed.rows.push(
            AssumptionRow::new(2021, "Term", "Level", BusinessType::InForce, MovementCode::Map006)
                .with(AmountField::Be, 5.0)
                .with(AmountField::Ra, -1.0),
        );
        let report = validate(&feed, &params(RecognitionMode::Input));
        let failed: Vec<_> = report.failures().map(|f| f.check.as_str()).collect();
        assert_eq!(failed, vec!["Actual cash outflows sign (MAP012)", "BEL and RA signage"]);
    }

    #[test]
    fn test_new_business_out_of_balance() {
        let mut feed = balanced_feed();
        feed.rows[0].actual = 510.0;
        let report = validate(&feed, &params(RecognitionMode::Input));
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.check, "New business CSM (Term/Level)");
        assert!(failure.detail.contains("10.000000"));
    }

    #[test]
    fn test_new_business_checked_per_product_group() {
        let mut feed = balanced_feed();
        feed.rows.push(
            AssumptionRow::new(2020, "Annuity", "Deferred", BusinessType::NewBusiness, MovementCode::Map002)
                .with(AmountField::Actual, 40.0),
        );
        let report = validate(&feed, &params(RecognitionMode::Input));

        let checks: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.check.starts_with("New business CSM"))
            .map(|f| (f.check.as_str(), f.passed))
            .collect();
        assert_eq!(
            checks,
            vec![
                ("New business CSM (Annuity/Deferred)", false),
                ("New business CSM (Term/Level)", true),
            ]
        );
    }

    #[test]
    fn test_new_business_check_deferred_in_calculation_mode() {
        let mut feed = balanced_feed();
        feed.rows[0].actual = 510.0;
        let report = validate(&feed, &params(RecognitionMode::Calculation));
        assert!(report.passed());
    }
}
