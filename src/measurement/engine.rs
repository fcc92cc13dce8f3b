//! GMM engine: groups the assumption feed and runs every calculation per group

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;

use super::component::{ComponentAnalysisBuilder, MeasurementComponentRow};
use super::coverage::{CoverageAnalysisBuilder, RemainingCoverageRow};
use super::ledger::{GroupLedgers, LedgerBuilder};
use super::recognition::{InitialRecognition, RecognitionCalculator};
use crate::assumptions::{AssumptionRow, BusinessType, MovementIndex};
use crate::error::Result;
use crate::output::GmmResults;
use crate::parameters::Parameters;

/// Execution settings for an engine run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Evaluate product/sub-product groups on the rayon thread pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl EngineConfig {
    pub fn sequential() -> Self {
        Self { parallel: false }
    }
}

/// Every table computed for one product/sub-product group
#[derive(Debug, Clone, Default)]
pub struct GroupResult {
    pub product: String,
    pub sub_product: String,
    pub ledgers: GroupLedgers,
    pub measurement_component: Vec<MeasurementComponentRow>,
    pub remaining_coverage: Vec<RemainingCoverageRow>,
}

/// Main GMM engine
pub struct GmmEngine {
    parameters: Parameters,
    config: EngineConfig,
}

impl GmmEngine {
    /// Create a new engine with validated parameters and execution config
    pub fn new(parameters: Parameters, config: EngineConfig) -> Self {
        Self { parameters, config }
    }

    /// Compute all ledgers and analyses for the assumption feed
    ///
    /// Fails on the first group that violates the data contract; no partial tables
    /// are returned.
    pub fn run(&self, rows: &[AssumptionRow]) -> Result<GmmResults> {
        let start = Instant::now();
        let groups = group_by_product(rows);
        log::info!(
            "running GMM over {} assumption rows in {} product groups, periods {}..={}",
            rows.len(),
            groups.len(),
            self.parameters.start_year(),
            self.parameters.end_year()
        );

        let run_one = |((product, sub_product), members): (&(&str, &str), &Vec<&AssumptionRow>)| {
            self.run_group(product, sub_product, members)
                .map_err(|e| e.in_group(product, sub_product))
        };

        let results: Vec<GroupResult> = if self.config.parallel {
            let groups: Vec<_> = groups.iter().collect();
            groups.into_par_iter().map(run_one).collect::<Result<_>>()?
        } else {
            groups.iter().map(run_one).collect::<Result<_>>()?
        };

        log::info!("GMM run complete in {:?}", start.elapsed());
        Ok(GmmResults::from_groups(results))
    }

    /// Compute every table for the rows of one product/sub-product group
    pub fn run_group(&self, product: &str, sub_product: &str, rows: &[&AssumptionRow]) -> Result<GroupResult> {
        let index = MovementIndex::build(rows.iter().copied())?;
        let periods: Vec<i32> = self.parameters.periods().collect();
        let calculator = RecognitionCalculator::new(self.parameters.recognition_mode, self.parameters.inception_year());

        let recognitions = recognise_periods(&calculator, &index, &periods, None)?;
        let ledger_builder = LedgerBuilder::new(&index, product, sub_product, self.parameters.inception_year());
        let ledgers = GroupLedgers::build(&ledger_builder, &recognitions)?;

        let measurement_component =
            ComponentAnalysisBuilder::new(&index, product, sub_product).build(&ledgers, &periods)?;

        let new_business_recognitions =
            recognise_periods(&calculator, &index, &periods, Some(BusinessType::NewBusiness))?;
        let remaining_coverage =
            CoverageAnalysisBuilder::new(&index, product, sub_product, self.parameters.transition_approach)
                .build(&new_business_recognitions)?;

        if let Some(last) = ledgers.tcl.last() {
            log::info!(
                "{}/{}: {} rows, TCL closing {} = {:.2}",
                product,
                sub_product,
                rows.len(),
                last.period,
                last.closing_balance
            );
        }

        Ok(GroupResult {
            product: product.to_string(),
            sub_product: sub_product.to_string(),
            ledgers,
            measurement_component,
            remaining_coverage,
        })
    }
}

/// Rows grouped by (product, sub-product), in sorted group order
pub(crate) fn group_by_product(rows: &[AssumptionRow]) -> BTreeMap<(&str, &str), Vec<&AssumptionRow>> {
    let mut groups: BTreeMap<(&str, &str), Vec<&AssumptionRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.product.as_str(), row.sub_product.as_str()))
            .or_default()
            .push(row);
    }
    groups
}

fn recognise_periods(
    calculator: &RecognitionCalculator,
    index: &MovementIndex<'_>,
    periods: &[i32],
    business_type: Option<BusinessType>,
) -> Result<Vec<(i32, InitialRecognition)>> {
    periods
        .iter()
        .map(|&period| Ok((period, calculator.recognise(index, period, business_type)?)))
        .collect()
}
