//! Initial recognition: CSM or onerous loss component at a cohort's inception year

use serde::{Deserialize, Serialize};

use crate::assumptions::{AmountField, BusinessType, MovementCode, MovementIndex};
use crate::error::Result;
use crate::parameters::RecognitionMode;

/// Initial recognition amounts for one cohort year
///
/// Only the inception year carries non-zero values; every other year is
/// [`InitialRecognition::default()`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialRecognition {
    pub pv_premium: f64,
    pub pv_claims: f64,
    pub pv_risk_adj: f64,
    pub pv_acquisition_expense: f64,
    pub csm_at_recognition: f64,
    pub loss_component_be: f64,
    pub loss_component_ra: f64,
}

impl InitialRecognition {
    /// Amounts supplied directly on the MAP004 row
    pub fn from_input(csm: f64, loss_be: f64, loss_ra: f64) -> Self {
        Self {
            csm_at_recognition: csm,
            loss_component_be: loss_be,
            loss_component_ra: loss_ra,
            ..Default::default()
        }
    }

    /// Derive CSM or loss component from present values of expected cash flows
    ///
    /// A positive net present value is deferred as CSM. Otherwise the loss is split
    /// between BE and RA in proportion to PV claims vs. PV risk adjustment; if that
    /// denominator is zero the split is zero.
    pub fn calculate(pv_premium: f64, pv_claims: f64, pv_risk_adj: f64, pv_acquisition_expense: f64) -> Self {
        let total = pv_premium + pv_claims + pv_risk_adj + pv_acquisition_expense;

        let (csm, loss_be, loss_ra) = if total > 0.0 {
            (total, 0.0, 0.0)
        } else {
            let denominator = pv_claims + pv_risk_adj;
            if denominator == 0.0 {
                if total != 0.0 {
                    log::warn!(
                        "degenerate loss proration: PV claims + PV risk adjustment is zero, \
                         loss of {:.2} not allocated",
                        total
                    );
                }
                (0.0, 0.0, 0.0)
            } else {
                (0.0, total * pv_claims / denominator, total * pv_risk_adj / denominator)
            }
        };

        Self {
            pv_premium,
            pv_claims,
            pv_risk_adj,
            pv_acquisition_expense,
            csm_at_recognition: csm,
            loss_component_be: loss_be,
            loss_component_ra: loss_ra,
        }
    }

    /// Combined BE + RA loss component
    pub fn loss_component(&self) -> f64 {
        self.loss_component_be + self.loss_component_ra
    }
}

/// Computes [`InitialRecognition`] per period for one group
#[derive(Debug, Clone, Copy)]
pub struct RecognitionCalculator {
    mode: RecognitionMode,
    inception_year: i32,
}

impl RecognitionCalculator {
    pub fn new(mode: RecognitionMode, inception_year: i32) -> Self {
        Self { mode, inception_year }
    }

    /// Initial recognition for `period`, zero outside the inception year
    ///
    /// `business_type` restricts every lookup, e.g. to new business for the
    /// remaining-coverage pass.
    pub fn recognise(
        &self,
        index: &MovementIndex<'_>,
        period: i32,
        business_type: Option<BusinessType>,
    ) -> Result<InitialRecognition> {
        if period != self.inception_year {
            return Ok(InitialRecognition::default());
        }

        let lookup = |code, field| index.lookup(period, code, business_type, field);

        let recognition = match self.mode {
            RecognitionMode::Input => match index.row(period, MovementCode::Map004, business_type)? {
                Some(row) => InitialRecognition::from_input(row.csm, row.loss_be, row.loss_ra),
                None => InitialRecognition::default(),
            },
            RecognitionMode::Calculation => InitialRecognition::calculate(
                lookup(MovementCode::Map003, AmountField::BeCfPv)?,
                lookup(MovementCode::Map013, AmountField::BeCfPv)?,
                lookup(MovementCode::Map013, AmountField::RaCfPv)?,
                lookup(MovementCode::Map016, AmountField::BeCfPv)?,
            ),
        };

        log::debug!(
            "initial recognition {} ({:?}): csm {:.2}, loss BE {:.2}, loss RA {:.2}",
            period,
            self.mode,
            recognition.csm_at_recognition,
            recognition.loss_component_be,
            recognition.loss_component_ra
        );
        Ok(recognition)
    }
}
