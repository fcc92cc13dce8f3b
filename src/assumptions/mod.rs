//! Assumption feed: per-cohort, per-movement-code actuarial amounts

pub mod codes;
mod index;
pub mod loader;

pub use codes::{Movement, MovementCode};
pub use index::MovementIndex;
pub use loader::{load_assumptions, load_assumptions_from_reader, LoadedAssumptions};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GmmError;

/// New business written in the period vs. previously written in-force business
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BusinessType {
    NewBusiness,
    InForce,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::NewBusiness => "NB",
            BusinessType::InForce => "IF",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessType {
    type Err = GmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NB" | "New Business" | "NewBusiness" => Ok(BusinessType::NewBusiness),
            "IF" | "In Force" | "InForce" | "In-Force" => Ok(BusinessType::InForce),
            other => Err(GmmError::UnknownBusinessType(other.to_string())),
        }
    }
}

/// Numeric amount columns of an assumption row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountField {
    Be,
    Ra,
    Csm,
    LossBe,
    LossRa,
    BeCfPv,
    RaCfPv,
    Actual,
}

/// One row of the assumption feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionRow {
    /// Inception year of the cohort
    pub cohort: i32,
    pub product: String,
    pub sub_product: String,
    pub business_type: BusinessType,
    pub key: MovementCode,

    /// Gross best estimate movement
    pub be: f64,
    /// Gross risk adjustment movement
    pub ra: f64,
    /// Gross CSM movement
    pub csm: f64,
    /// Loss component share of the BE movement
    pub loss_be: f64,
    /// Loss component share of the RA movement
    pub loss_ra: f64,
    /// Present value of BE cash flows
    pub be_cf_pv: f64,
    /// Present value of RA cash flows
    pub ra_cf_pv: f64,
    /// Actual cash flow
    pub actual: f64,
}

impl AssumptionRow {
    /// Row with every amount at zero
    pub fn new(
        cohort: i32,
        product: &str,
        sub_product: &str,
        business_type: BusinessType,
        key: MovementCode,
    ) -> Self {
        Self {
            cohort,
            product: product.to_string(),
            sub_product: sub_product.to_string(),
            business_type,
            key,
            be: 0.0,
            ra: 0.0,
            csm: 0.0,
            loss_be: 0.0,
            loss_ra: 0.0,
            be_cf_pv: 0.0,
            ra_cf_pv: 0.0,
            actual: 0.0,
        }
    }

    pub fn amount(&self, field: AmountField) -> f64 {
        match field {
            AmountField::Be => self.be,
            AmountField::Ra => self.ra,
            AmountField::Csm => self.csm,
            AmountField::LossBe => self.loss_be,
            AmountField::LossRa => self.loss_ra,
            AmountField::BeCfPv => self.be_cf_pv,
            AmountField::RaCfPv => self.ra_cf_pv,
            AmountField::Actual => self.actual,
        }
    }

    /// Builder-style setter, mostly for tests and fixtures
    pub fn with(mut self, field: AmountField, value: f64) -> Self {
        let slot = match field {
            AmountField::Be => &mut self.be,
            AmountField::Ra => &mut self.ra,
            AmountField::Csm => &mut self.csm,
            AmountField::LossBe => &mut self.loss_be,
            AmountField::LossRa => &mut self.loss_ra,
            AmountField::BeCfPv => &mut self.be_cf_pv,
            AmountField::RaCfPv => &mut self.ra_cf_pv,
            AmountField::Actual => &mut self.actual,
        };
        *slot = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_type_spellings() {
        assert_eq!("NB".parse::<BusinessType>().unwrap(), BusinessType::NewBusiness);
        assert_eq!("New Business".parse::<BusinessType>().unwrap(), BusinessType::NewBusiness);
        assert_eq!(" IF ".parse::<BusinessType>().unwrap(), BusinessType::InForce);
        assert_eq!("InForce".parse::<BusinessType>().unwrap(), BusinessType::InForce);
        assert!("Renewal".parse::<BusinessType>().is_err());
    }

    #[test]
    fn test_with_sets_only_named_field() {
        let row = AssumptionRow::new(2020, "Term", "Level", BusinessType::NewBusiness, MovementCode::Map004)
            .with(AmountField::Csm, 100.0)
            .with(AmountField::LossRa, -3.0);

        assert_eq!(row.amount(AmountField::Csm), 100.0);
        assert_eq!(row.amount(AmountField::LossRa), -3.0);
        assert_eq!(row.amount(AmountField::Be), 0.0);
        assert_eq!(row.amount(AmountField::Actual), 0.0);
    }
}
