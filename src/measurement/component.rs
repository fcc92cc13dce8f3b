//! Analysis by measurement component: PV of future cash flows, RA, CSM and their total

use serde::{Deserialize, Serialize};

use super::ledger::{GroupLedgers, LedgerKind};
use crate::assumptions::{AssumptionRow, Movement, MovementIndex};
use crate::error::Result;

/// Row label of the measurement-component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentMeasure {
    #[serde(rename = "Estimates of the present value of future cash flows")]
    PvFutureCashFlows,
    #[serde(rename = "Risk adjustment for non-financial risk")]
    RiskAdjustment,
    #[serde(rename = "Contractual service margin")]
    Csm,
    #[serde(rename = "Total")]
    Total,
}

impl ComponentMeasure {
    pub const COMPONENTS: [ComponentMeasure; 3] = [
        ComponentMeasure::PvFutureCashFlows,
        ComponentMeasure::RiskAdjustment,
        ComponentMeasure::Csm,
    ];

    /// Ledger the component reconciles to; `None` for the total
    pub fn ledger(self) -> Option<LedgerKind> {
        match self {
            ComponentMeasure::PvFutureCashFlows => Some(LedgerKind::Bel),
            ComponentMeasure::RiskAdjustment => Some(LedgerKind::Ra),
            ComponentMeasure::Csm => Some(LedgerKind::Csm),
            ComponentMeasure::Total => None,
        }
    }

    /// Signed amount of an assumption row attributed to this component
    fn value(self, row: &AssumptionRow) -> f64 {
        match self {
            ComponentMeasure::PvFutureCashFlows => row.be,
            ComponentMeasure::RiskAdjustment => row.ra,
            ComponentMeasure::Csm => -row.csm,
            ComponentMeasure::Total => 0.0,
        }
    }
}

/// One (period, measure) row of the measurement-component analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementComponentRow {
    #[serde(rename = "Period")]
    pub period: i32,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Sub-Product")]
    pub sub_product: String,
    #[serde(rename = "Measure")]
    pub measure: ComponentMeasure,

    #[serde(rename = "Net balance at 1 Jan")]
    pub opening_balance: f64,

    #[serde(rename = "CSM recognised for services provided")]
    pub csm_recognised: f64,
    #[serde(rename = "Risk adjustment recognised for the risk expired")]
    pub ra_recognised: f64,
    #[serde(rename = "Experience adjustments")]
    pub experience_adjustments: f64,
    #[serde(rename = "Changes that relate to current service")]
    pub current_service: f64,

    #[serde(rename = "Contracts initially recognised in the period")]
    pub contracts_initially_recognised: f64,
    #[serde(rename = "Changes in estimates that adjust the CSM")]
    pub estimates_adjusting_csm: f64,
    #[serde(rename = "Changes in estimates that result in losses and reversals of losses on onerous contracts")]
    pub onerous_contract_changes: f64,
    #[serde(rename = "Changes that relate to future service")]
    pub future_service: f64,

    #[serde(rename = "Adjustments to liabilities for incurred claims")]
    pub incurred_claims_adjustments: f64,
    #[serde(rename = "Changes that relate to past service")]
    pub past_service: f64,

    #[serde(rename = "Insurance service result")]
    pub insurance_service_result: f64,
    #[serde(rename = "Finance expenses from insurance contracts issued")]
    pub finance_expenses: f64,
    #[serde(rename = "Investment components")]
    pub investment_components: f64,
    #[serde(rename = "Total amounts recognised in comprehensive income")]
    pub comprehensive_income: f64,

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

impl MeasurementComponentRow {
    fn total_of(rows: &[MeasurementComponentRow]) -> MeasurementComponentRow {
        let first = &rows[0];
        let total = |column: fn(&MeasurementComponentRow) -> f64| rows.iter().map(column).sum::<f64>();
        MeasurementComponentRow {
            period: first.period,
            product: first.product.clone(),
            sub_product: first.sub_product.clone(),
            measure: ComponentMeasure::Total,
            opening_balance: total(|r| r.opening_balance),
            csm_recognised: total(|r| r.csm_recognised),
            ra_recognised: total(|r| r.ra_recognised),
            experience_adjustments: total(|r| r.experience_adjustments),
            current_service: total(|r| r.current_service),
            contracts_initially_recognised: total(|r| r.contracts_initially_recognised),
            estimates_adjusting_csm: total(|r| r.estimates_adjusting_csm),
            onerous_contract_changes: total(|r| r.onerous_contract_changes),
            future_service: total(|r| r.future_service),
            incurred_claims_adjustments: total(|r| r.incurred_claims_adjustments),
            past_service: total(|r| r.past_service),
            insurance_service_result: total(|r| r.insurance_service_result),
            finance_expenses: total(|r| r.finance_expenses),
            investment_components: total(|r| r.investment_components),
            comprehensive_income: total(|r| r.comprehensive_income),
            premiums_received: total(|r| r.premiums_received),
            claims_paid: total(|r| r.claims_paid),
            acquisition_cash_flows: total(|r| r.acquisition_cash_flows),
            total_cash_flows: total(|r| r.total_cash_flows),
            closing_balance: total(|r| r.closing_balance),
        }
    }
}

/// Builds the measurement-component analysis of one product/sub-product group
pub struct ComponentAnalysisBuilder<'i, 'a> {
    index: &'i MovementIndex<'a>,
    product: &'i str,
    sub_product: &'i str,
}

impl<'i, 'a> ComponentAnalysisBuilder<'i, 'a> {
    pub fn new(index: &'i MovementIndex<'a>, product: &'i str, sub_product: &'i str) -> Self {
        Self {
            index,
            product,
            sub_product,
        }
    }

    /// Four rows per period (three components then the total), periods ascending
    pub fn build(&self, ledgers: &GroupLedgers, periods: &[i32]) -> Result<Vec<MeasurementComponentRow>> {
        let mut rows = Vec::with_capacity(periods.len() * 4);
        let mut openings = [0.0; 3];

        for &period in periods {
            let mut block = Vec::with_capacity(4);
            for (slot, measure) in ComponentMeasure::COMPONENTS.into_iter().enumerate() {
                let row = self.component_row(measure, period, openings[slot], ledgers)?;
                openings[slot] = row.closing_balance;
                block.push(row);
            }
            let total = MeasurementComponentRow::total_of(&block);
            block.push(total);
            rows.extend(block);
        }

        Ok(rows)
    }

    fn component_row(
        &self,
        measure: ComponentMeasure,
        period: i32,
        opening_balance: f64,
        ledgers: &GroupLedgers,
    ) -> Result<MeasurementComponentRow> {
        let signed = |movement| self.index.sum_with(period, movement, None, |row| measure.value(row));
        let actual = |movement| self.index.sum_with(period, movement, None, |row| row.actual);

        let released = signed(Movement::ExperienceRelease)?;
        let only_on = |target: ComponentMeasure| if measure == target { released } else { 0.0 };
        let csm_recognised = only_on(ComponentMeasure::Csm);
        let ra_recognised = only_on(ComponentMeasure::RiskAdjustment);
        let experience_adjustments = only_on(ComponentMeasure::PvFutureCashFlows);
        let current_service = csm_recognised + ra_recognised + experience_adjustments;

        let contracts_initially_recognised = measure
            .ledger()
            .map_or(0.0, |kind| ledgers.new_business(kind, period));
        let estimates_adjusting_csm = signed(Movement::EstimatesAdjustingCsm)?;
        let onerous_contract_changes = signed(Movement::OnerousChanges)?;
        let future_service = estimates_adjusting_csm + onerous_contract_changes + contracts_initially_recognised;

        let incurred_claims_adjustments = signed(Movement::PastService)?;
        let past_service = incurred_claims_adjustments;

        let insurance_service_result = current_service + future_service + past_service;
        let finance_expenses = signed(Movement::FinanceExpenses)?;
        let investment_components = signed(Movement::InvestmentComponents)?;
        // finance expenses are disclosed but sit outside comprehensive income
        let comprehensive_income = insurance_service_result + investment_components;

        // cash flows settle against the PV of future cash flows only
        let (premiums_received, claims_paid, acquisition_cash_flows) =
            if measure == ComponentMeasure::PvFutureCashFlows {
                (
                    actual(Movement::PremiumsReceived)?,
                    actual(Movement::ClaimsPaid)?,
                    actual(Movement::AcquisitionCashFlows)?,
                )
            } else {
                (0.0, 0.0, 0.0)
            };
        let total_cash_flows = premiums_received + claims_paid + acquisition_cash_flows;

        Ok(MeasurementComponentRow {
            period,
            product: self.product.to_string(),
            sub_product: self.sub_product.to_string(),
            measure,
            opening_balance,
            csm_recognised,
            ra_recognised,
            experience_adjustments,
            current_service,
            contracts_initially_recognised,
            estimates_adjusting_csm,
            onerous_contract_changes,
            future_service,
            incurred_claims_adjustments,
            past_service,
            insurance_service_result,
            finance_expenses,
            investment_components,
            comprehensive_income,
            premiums_received,
            claims_paid,
            acquisition_cash_flows,
            total_cash_flows,
            closing_balance: opening_balance + comprehensive_income + total_cash_flows,
        })
    }
}
