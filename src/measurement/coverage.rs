//! Analysis by remaining coverage: LRC excluding loss component, LRC loss component, LIC
//!
//! New business feeds the two LRC rows and in-force business feeds the LIC row. The
//! transition approach decides whether initial recognition is shown in its own column
//! or folded into "Other contracts".

use serde::{Deserialize, Serialize};

use super::recognition::InitialRecognition;
use crate::assumptions::{AssumptionRow, BusinessType, Movement, MovementIndex};
use crate::error::Result;
use crate::parameters::TransitionApproach;

/// Row label of the remaining-coverage analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageMeasure {
    #[serde(rename = "Liabilities for remaining coverage excluding loss component")]
    LrcExclLoss,
    #[serde(rename = "Liabilities for remaining coverage loss component")]
    LrcLossComponent,
    #[serde(rename = "Liabilities for incurred claims")]
    Lic,
    #[serde(rename = "Total")]
    Total,
}

impl CoverageMeasure {
    pub const CATEGORIES: [CoverageMeasure; 3] = [
        CoverageMeasure::LrcExclLoss,
        CoverageMeasure::LrcLossComponent,
        CoverageMeasure::Lic,
    ];

    /// Business type whose rows feed this category
    pub fn business_type(self) -> Option<BusinessType> {
        match self {
            CoverageMeasure::LrcExclLoss | CoverageMeasure::LrcLossComponent => Some(BusinessType::NewBusiness),
            CoverageMeasure::Lic => Some(BusinessType::InForce),
            CoverageMeasure::Total => None,
        }
    }

    /// Amount of an assumption row attributed to this category
    fn value(self, row: &AssumptionRow) -> f64 {
        match self {
            CoverageMeasure::LrcExclLoss | CoverageMeasure::Lic => gross(row),
            CoverageMeasure::LrcLossComponent => loss(row),
            CoverageMeasure::Total => 0.0,
        }
    }
}

fn gross(row: &AssumptionRow) -> f64 {
    row.be + row.ra - row.csm
}

fn loss(row: &AssumptionRow) -> f64 {
    row.loss_be + row.loss_ra
}

/// One (period, measure) row of the remaining-coverage analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingCoverageRow {
    #[serde(rename = "Period")]
    pub period: i32,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Sub-Product")]
    pub sub_product: String,
    #[serde(rename = "Measure")]
    pub measure: CoverageMeasure,

    #[serde(rename = "Net balance at 1 Jan")]
    pub opening_balance: f64,

    #[serde(rename = "Contracts under the modified retrospective approach")]
    pub contracts_under_modified_retrospective: f64,
    #[serde(rename = "Contracts under the fair value approach")]
    pub contracts_under_fair_value: f64,
    #[serde(rename = "Other contracts")]
    pub other_contracts: f64,
    #[serde(rename = "Expected incurred claims and other insurance service expenses")]
    pub expected_claims_and_expenses: f64,
    #[serde(rename = "Losses on onerous contracts and reversals of those losses")]
    pub onerous_contract_losses: f64,
    #[serde(rename = "Adjustments to liabilities for incurred claims")]
    pub incurred_claims_adjustments: f64,
    #[serde(rename = "Insurance service result")]
    pub insurance_service_result: f64,

    #[serde(rename = "Net finance expenses from insurance contracts")]
    pub net_finance_expenses: f64,
    #[serde(rename = "Total changes in the statement of profit or loss and OCI")]
    pub total_pnl_and_oci: f64,
    #[serde(rename = "Investment components and premium refunds")]
    pub investment_components: f64,

    #[serde(rename = "Premiums received")]
    pub premiums_received: f64,
    #[serde(rename = "Claims and other insurance service expenses paid")]
    pub claims_paid: f64,
    #[serde(rename = "Insurance acquisition cash flows")]
    pub acquisition_cash_flows: f64,
    #[serde(rename = "Total cash flows")]
    pub total_cash_flows: f64,

    #[serde(rename = "Net balance at 31 Dec")]
    pub closing_balance: f64,
}

impl RemainingCoverageRow {
    fn total_of(rows: &[RemainingCoverageRow]) -> RemainingCoverageRow {
        let first = &rows[0];
        let total = |column: fn(&RemainingCoverageRow) -> f64| rows.iter().map(column).sum::<f64>();
        RemainingCoverageRow {
            period: first.period,
            product: first.product.clone(),
            sub_product: first.sub_product.clone(),
            measure: CoverageMeasure::Total,
            opening_balance: total(|r| r.opening_balance),
            contracts_under_modified_retrospective: total(|r| r.contracts_under_modified_retrospective),
            contracts_under_fair_value: total(|r| r.contracts_under_fair_value),
            other_contracts: total(|r| r.other_contracts),
            expected_claims_and_expenses: total(|r| r.expected_claims_and_expenses),
            onerous_contract_losses: total(|r| r.onerous_contract_losses),
            incurred_claims_adjustments: total(|r| r.incurred_claims_adjustments),
            insurance_service_result: total(|r| r.insurance_service_result),
            net_finance_expenses: total(|r| r.net_finance_expenses),
            total_pnl_and_oci: total(|r| r.total_pnl_and_oci),
            investment_components: total(|r| r.investment_components),
            premiums_received: total(|r| r.premiums_received),
            claims_paid: total(|r| r.claims_paid),
            acquisition_cash_flows: total(|r| r.acquisition_cash_flows),
            total_cash_flows: total(|r| r.total_cash_flows),
            closing_balance: total(|r| r.closing_balance),
        }
    }
}

/// Builds the remaining-coverage analysis of one product/sub-product group
pub struct CoverageAnalysisBuilder<'i, 'a> {
    index: &'i MovementIndex<'a>,
    product: &'i str,
    sub_product: &'i str,
    transition: TransitionApproach,
}

impl<'i, 'a> CoverageAnalysisBuilder<'i, 'a> {
    pub fn new(
        index: &'i MovementIndex<'a>,
        product: &'i str,
        sub_product: &'i str,
        transition: TransitionApproach,
    ) -> Self {
        Self {
            index,
            product,
            sub_product,
            transition,
        }
    }

    /// Four rows per period (three coverage categories then the total)
    ///
    /// `recognitions` pairs each period (ascending) with its new-business initial
    /// recognition.
    pub fn build(&self, recognitions: &[(i32, InitialRecognition)]) -> Result<Vec<RemainingCoverageRow>> {
        let mut rows = Vec::with_capacity(recognitions.len() * 4);
        let mut openings = [0.0; 3];

        for (period, recognition) in recognitions {
            let mut block = Vec::with_capacity(4);
            for (slot, measure) in CoverageMeasure::CATEGORIES.into_iter().enumerate() {
                let row = self.category_row(measure, *period, openings[slot], recognition)?;
                openings[slot] = row.closing_balance;
                block.push(row);
            }
            let total = RemainingCoverageRow::total_of(&block);
            block.push(total);
            rows.extend(block);
        }

        Ok(rows)
    }

    fn category_row(
        &self,
        measure: CoverageMeasure,
        period: i32,
        opening_balance: f64,
        recognition: &InitialRecognition,
    ) -> Result<RemainingCoverageRow> {
        let business_type = measure.business_type();
        let signed = |movement| self.index.sum_with(period, movement, business_type, |row| measure.value(row));
        let actual = |movement| self.index.sum_with(period, movement, business_type, |row| row.actual);

        let recognised = match measure {
            CoverageMeasure::LrcExclLoss => recognition.csm_at_recognition,
            CoverageMeasure::LrcLossComponent => recognition.loss_component(),
            CoverageMeasure::Lic | CoverageMeasure::Total => 0.0,
        };

        let movement_in_other = match measure {
            CoverageMeasure::Lic => self.index.sum_with(period, Movement::OtherContracts, business_type, |row| {
                gross(row) + loss(row)
            })?,
            _ => signed(Movement::OtherContracts)?,
        };

        let (contracts_under_modified_retrospective, contracts_under_fair_value, other_contracts) =
            match self.transition {
                TransitionApproach::ModifiedRetrospective => (recognised, 0.0, movement_in_other),
                TransitionApproach::FairValue => (0.0, recognised, movement_in_other),
                TransitionApproach::Other => (0.0, 0.0, recognised + movement_in_other),
            };

        let expected_claims_and_expenses = signed(Movement::ExperienceRelease)?;
        let onerous_contract_losses = signed(Movement::OnerousChanges)?;
        let incurred_claims_adjustments = signed(Movement::PastService)?;
        let insurance_service_result = contracts_under_modified_retrospective
            + contracts_under_fair_value
            + other_contracts
            + expected_claims_and_expenses
            + onerous_contract_losses
            + incurred_claims_adjustments;

        // finance expenses are disclosed but sit outside the P&L and OCI total
        let net_finance_expenses = signed(Movement::FinanceExpenses)?;
        let investment_components = signed(Movement::InvestmentComponents)?;
        let total_pnl_and_oci = insurance_service_result + investment_components;

        // the loss component carries no cash flows
        let (premiums_received, claims_paid, acquisition_cash_flows) =
            if measure == CoverageMeasure::LrcLossComponent {
                (0.0, 0.0, 0.0)
            } else {
                (
                    actual(Movement::PremiumsReceived)?,
                    actual(Movement::ClaimsPaid)?,
                    actual(Movement::AcquisitionCashFlows)?,
                )
            };
        let total_cash_flows = premiums_received + claims_paid + acquisition_cash_flows;

        Ok(RemainingCoverageRow {
            period,
            product: self.product.to_string(),
            sub_product: self.sub_product.to_string(),
            measure,
            opening_balance,
            contracts_under_modified_retrospective,
            contracts_under_fair_value,
            other_contracts,
            expected_claims_and_expenses,
            onerous_contract_losses,
            incurred_claims_adjustments,
            insurance_service_result,
            net_finance_expenses,
            total_pnl_and_oci,
            investment_components,
            premiums_received,
            claims_paid,
            acquisition_cash_flows,
            total_cash_flows,
            closing_balance: opening_balance + total_pnl_and_oci + total_cash_flows,
        })
    }
}
