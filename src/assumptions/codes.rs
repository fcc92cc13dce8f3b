//! Standardized movement codes and the code sets each disclosure line is built from
//!
//! Every roll-forward and analysis column that sums assumption amounts does so over one
//! [`Movement`] category. The category-to-code mapping lives in [`Movement::codes`] and is
//! the only place code sets are spelled out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GmmError;

/// Movement code (MAP001..MAP018) supplied with every assumption row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MovementCode {
    Map001,
    /// Actual premiums received
    Map002,
    /// Expected premiums
    Map003,
    /// New business at initial recognition
    Map004,
    Map005,
    Map006,
    Map007,
    Map008,
    Map009,
    Map010,
    Map011,
    /// Actual claims and expenses paid
    Map012,
    /// Expected claims and expenses released
    Map013,
    Map014,
    /// Actual insurance acquisition cash flows
    Map015,
    /// Expected insurance acquisition cash flows
    Map016,
    /// Changes relating to past service
    Map017,
    /// Onerous contract changes
    Map018,
}

impl MovementCode {
    pub const ALL: [MovementCode; 18] = [
        MovementCode::Map001,
        MovementCode::Map002,
        MovementCode::Map003,
        MovementCode::Map004,
        MovementCode::Map005,
        MovementCode::Map006,
        MovementCode::Map007,
        MovementCode::Map008,
        MovementCode::Map009,
        MovementCode::Map010,
        MovementCode::Map011,
        MovementCode::Map012,
        MovementCode::Map013,
        MovementCode::Map014,
        MovementCode::Map015,
        MovementCode::Map016,
        MovementCode::Map017,
        MovementCode::Map018,
    ];

    /// Feed spelling, e.g. "MAP004"
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementCode::Map001 => "MAP001",
            MovementCode::Map002 => "MAP002",
            MovementCode::Map003 => "MAP003",
            MovementCode::Map004 => "MAP004",
            MovementCode::Map005 => "MAP005",
            MovementCode::Map006 => "MAP006",
            MovementCode::Map007 => "MAP007",
            MovementCode::Map008 => "MAP008",
            MovementCode::Map009 => "MAP009",
            MovementCode::Map010 => "MAP010",
            MovementCode::Map011 => "MAP011",
            MovementCode::Map012 => "MAP012",
            MovementCode::Map013 => "MAP013",
            MovementCode::Map014 => "MAP014",
            MovementCode::Map015 => "MAP015",
            MovementCode::Map016 => "MAP016",
            MovementCode::Map017 => "MAP017",
            MovementCode::Map018 => "MAP018",
        }
    }
}

impl fmt::Display for MovementCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementCode {
    type Err = GmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MovementCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| GmmError::UnknownMovementCode(s.to_string()))
    }
}

use MovementCode::*;

/// Disclosure line categories and the movement codes that feed them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    /// Ledger: changes in assumptions (includes onerous changes)
    AssumptionChanges,
    /// Ledger: insurance service expense; analyses: insurance finance expenses
    FinanceExpenses,
    /// Ledger: release from experience; analyses: current service / expected claims
    ExperienceRelease,
    /// Changes relating to past service (incurred-claims adjustments)
    PastService,
    /// Changes in estimates that adjust the CSM
    EstimatesAdjustingCsm,
    /// Changes in estimates that result in onerous losses or reversals
    OnerousChanges,
    /// Remaining-coverage "Other contracts" line
    OtherContracts,
    PremiumsReceived,
    ClaimsPaid,
    AcquisitionCashFlows,
    /// No code in the feed carries investment components
    InvestmentComponents,
}

impl Movement {
    /// Code set summed for this category
    pub const fn codes(self) -> &'static [MovementCode] {
        match self {
            Movement::AssumptionChanges => &[Map001, Map005, Map006, Map008, Map009, Map011, Map018],
            Movement::FinanceExpenses => &[Map007, Map010],
            Movement::ExperienceRelease => &[Map013, Map014],
            Movement::PastService => &[Map017],
            Movement::EstimatesAdjustingCsm => &[Map001, Map005, Map006, Map008, Map009, Map011],
            Movement::OnerousChanges => &[Map018],
            Movement::OtherContracts => &[Map001, Map005, Map006, Map008, Map009, Map011, Map014],
            Movement::PremiumsReceived => &[Map002],
            Movement::ClaimsPaid => &[Map012],
            Movement::AcquisitionCashFlows => &[Map015],
            Movement::InvestmentComponents => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_feed_spelling() {
        for code in MovementCode::ALL {
            assert_eq!(code.as_str().parse::<MovementCode>().unwrap(), code);
        }
        assert_eq!(" map004 ".parse::<MovementCode>().unwrap(), MovementCode::Map004);
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = "MAP019".parse::<MovementCode>().unwrap_err();
        assert!(matches!(err, GmmError::UnknownMovementCode(ref s) if s == "MAP019"));
    }

    #[test]
    fn test_assumption_changes_is_csm_estimates_plus_onerous() {
        let mut expected: Vec<_> = Movement::EstimatesAdjustingCsm.codes().to_vec();
        expected.extend_from_slice(Movement::OnerousChanges.codes());
        expected.sort();
        let mut actual = Movement::AssumptionChanges.codes().to_vec();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_cash_flow_codes_never_enter_ledger_categories() {
        let ledger = [
            Movement::AssumptionChanges,
            Movement::FinanceExpenses,
            Movement::ExperienceRelease,
            Movement::PastService,
        ];
        for cash in [Map002, Map012, Map015] {
            assert!(ledger.iter().all(|m| !m.codes().contains(&cash)));
        }
    }

    #[test]
    fn test_investment_components_have_no_codes() {
        assert!(Movement::InvestmentComponents.codes().is_empty());
    }
}
