//! Period roll-forward of the BEL, RA and CSM ledgers, and their TCL total

use serde::{Deserialize, Serialize};

use super::recognition::InitialRecognition;
use crate::assumptions::{AmountField, AssumptionRow, Movement, MovementCode, MovementIndex};
use crate::error::Result;

/// Which liability a ledger reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerKind {
    /// Best estimate liability
    Bel,
    /// Risk adjustment
    Ra,
    /// Contractual service margin
    Csm,
}

impl LedgerKind {
    pub const ALL: [LedgerKind; 3] = [LedgerKind::Bel, LedgerKind::Ra, LedgerKind::Csm];

    /// Movement contributed by one assumption row
    ///
    /// BEL and RA take gross plus loss-component amounts; the CSM ledger carries the
    /// negated CSM movement.
    pub fn movement(self, row: &AssumptionRow) -> f64 {
        match self {
            LedgerKind::Bel => row.be + row.loss_be,
            LedgerKind::Ra => row.ra + row.loss_ra,
            LedgerKind::Csm => -row.csm,
        }
    }
}

/// One period of a reconciliation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Period")]
    pub period: i32,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Sub-Product")]
    pub sub_product: String,
    #[serde(rename = "Opening Balance")]
    pub opening_balance: f64,
    #[serde(rename = "New Business")]
    pub new_business: f64,
    #[serde(rename = "Changes in Assumptions")]
    pub assumption_changes: f64,
    #[serde(rename = "Insurance Service Expense")]
    pub service_expense: f64,
    #[serde(rename = "Release from Experience")]
    pub experience_release: f64,
    #[serde(rename = "Changes Relating to Past Service")]
    pub past_service_changes: f64,
    #[serde(rename = "Closing Balance")]
    pub closing_balance: f64,
}

impl LedgerRow {
    /// Sum of the period's movements (closing less opening)
    pub fn movements(&self) -> f64 {
        self.new_business
            + self.assumption_changes
            + self.service_expense
            + self.experience_release
            + self.past_service_changes
    }

    /// Column-wise sum of rows for the same period and group
    fn sum_of(rows: [&LedgerRow; 3]) -> LedgerRow {
        let [first, ..] = rows;
        let total = |column: fn(&LedgerRow) -> f64| rows.iter().map(|r| column(r)).sum::<f64>();
        LedgerRow {
            period: first.period,
            product: first.product.clone(),
            sub_product: first.sub_product.clone(),
            opening_balance: total(|r| r.opening_balance),
            new_business: total(|r| r.new_business),
            assumption_changes: total(|r| r.assumption_changes),
            service_expense: total(|r| r.service_expense),
            experience_release: total(|r| r.experience_release),
            past_service_changes: total(|r| r.past_service_changes),
            closing_balance: total(|r| r.closing_balance),
        }
    }
}

/// Builds the ledgers of one product/sub-product group
pub struct LedgerBuilder<'i, 'a> {
    index: &'i MovementIndex<'a>,
    product: &'i str,
    sub_product: &'i str,
    inception_year: i32,
}

impl<'i, 'a> LedgerBuilder<'i, 'a> {
    pub fn new(index: &'i MovementIndex<'a>, product: &'i str, sub_product: &'i str, inception_year: i32) -> Self {
        Self {
            index,
            product,
            sub_product,
            inception_year,
        }
    }

    /// Roll `kind` forward over `recognitions`, which pairs each period (ascending)
    /// with its initial recognition
    pub fn build(&self, kind: LedgerKind, recognitions: &[(i32, InitialRecognition)]) -> Result<Vec<LedgerRow>> {
        let mut rows = Vec::with_capacity(recognitions.len());
        let mut opening = 0.0;

        for &(period, ref recognition) in recognitions {
            let sum = |movement| self.index.sum_with(period, movement, None, |row| kind.movement(row));

            let mut row = LedgerRow {
                period,
                product: self.product.to_string(),
                sub_product: self.sub_product.to_string(),
                opening_balance: opening,
                new_business: self.new_business(kind, period, recognition)?,
                assumption_changes: sum(Movement::AssumptionChanges)?,
                service_expense: sum(Movement::FinanceExpenses)?,
                experience_release: sum(Movement::ExperienceRelease)?,
                past_service_changes: sum(Movement::PastService)?,
                closing_balance: 0.0,
            };
            row.closing_balance = row.opening_balance + row.movements();
            opening = row.closing_balance;

            log::debug!(
                "{:?} {}/{} {}: opening {:.2}, closing {:.2}",
                kind,
                self.product,
                self.sub_product,
                period,
                row.opening_balance,
                row.closing_balance
            );
            rows.push(row);
        }

        Ok(rows)
    }

    /// New business recognised in `period`; zero outside the inception year
    fn new_business(&self, kind: LedgerKind, period: i32, recognition: &InitialRecognition) -> Result<f64> {
        if period != self.inception_year {
            return Ok(0.0);
        }

        let raw = |field| self.index.lookup(period, MovementCode::Map013, None, field);
        let amount = match kind {
            LedgerKind::Bel if recognition.loss_component_be != 0.0 => recognition.loss_component_be,
            LedgerKind::Bel => raw(AmountField::BeCfPv)?,
            LedgerKind::Ra if recognition.loss_component_ra != 0.0 => recognition.loss_component_ra,
            LedgerKind::Ra => raw(AmountField::RaCfPv)?,
            LedgerKind::Csm => -self.index.lookup(period, MovementCode::Map004, None, AmountField::Csm)?,
        };
        Ok(amount)
    }
}

/// Total contract liability: column-wise BEL + RA + CSM
pub fn total_contract_liability(bel: &[LedgerRow], ra: &[LedgerRow], csm: &[LedgerRow]) -> Vec<LedgerRow> {
    debug_assert!(bel.len() == ra.len() && ra.len() == csm.len());
    bel.iter()
        .zip(ra)
        .zip(csm)
        .map(|((b, r), c)| LedgerRow::sum_of([b, r, c]))
        .collect()
}

/// The four ledgers of one group
#[derive(Debug, Clone, Default)]
pub struct GroupLedgers {
    pub bel: Vec<LedgerRow>,
    pub ra: Vec<LedgerRow>,
    pub csm: Vec<LedgerRow>,
    pub tcl: Vec<LedgerRow>,
}

impl GroupLedgers {
    pub fn build(builder: &LedgerBuilder<'_, '_>, recognitions: &[(i32, InitialRecognition)]) -> Result<Self> {
        let bel = builder.build(LedgerKind::Bel, recognitions)?;
        let ra = builder.build(LedgerKind::Ra, recognitions)?;
        let csm = builder.build(LedgerKind::Csm, recognitions)?;
        let tcl = total_contract_liability(&bel, &ra, &csm);
        Ok(Self { bel, ra, csm, tcl })
    }

    pub fn ledger(&self, kind: LedgerKind) -> &[LedgerRow] {
        match kind {
            LedgerKind::Bel => &self.bel,
            LedgerKind::Ra => &self.ra,
            LedgerKind::Csm => &self.csm,
        }
    }

    /// New business of `kind` in `period`, zero if the period is not in the ledger
    pub fn new_business(&self, kind: LedgerKind, period: i32) -> f64 {
        self.ledger(kind)
            .iter()
            .find(|row| row.period == period)
            .map_or(0.0, |row| row.new_business)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::BusinessType;
    use approx::assert_abs_diff_eq;

    fn nb(cohort: i32, key: MovementCode) -> AssumptionRow {
        AssumptionRow::new(cohort, "Term", "Level", BusinessType::NewBusiness, key)
    }

    fn zero_recognitions(periods: std::ops::RangeInclusive<i32>) -> Vec<(i32, InitialRecognition)> {
        periods.map(|p| (p, InitialRecognition::default())).collect()
    }

    #[test]
    fn test_csm_new_business_from_map004() {
        let rows = vec![nb(2020, MovementCode::Map004).with(AmountField::Csm, 100.0)];
        let index = MovementIndex::build(&rows).unwrap();
        let builder = LedgerBuilder::new(&index, "Term", "Level", 2020);
        let recognitions = vec![
            (2020, InitialRecognition::from_input(100.0, 0.0, 0.0)),
            (2021, InitialRecognition::default()),
            (2022, InitialRecognition::default()),
        ];

        let ledgers = GroupLedgers::build(&builder, &recognitions).unwrap();

        let csm = &ledgers.csm;
        assert_eq!(csm[0].opening_balance, 0.0);
        assert_eq!(csm[0].new_business, -100.0);
        assert_eq!(csm[0].closing_balance, -100.0);
        for row in &csm[1..] {
            assert_eq!(row.opening_balance, -100.0);
            assert_eq!(row.movements(), 0.0);
            assert_eq!(row.closing_balance, -100.0);
        }
        assert_eq!(ledgers.tcl[0].closing_balance, -100.0);
        assert_eq!(ledgers.bel[0].closing_balance, 0.0);
        assert_eq!(ledgers.ra[0].closing_balance, 0.0);
    }

    #[test]
    fn test_bel_new_business_falls_back_to_map013_pv() {
        let rows = vec![nb(2020, MovementCode::Map013)
            .with(AmountField::BeCfPv, -70.0)
            .with(AmountField::RaCfPv, -10.0)];
        let index = MovementIndex::build(&rows).unwrap();
        let builder = LedgerBuilder::new(&index, "Term", "Level", 2020);

        let bel = builder.build(LedgerKind::Bel, &zero_recognitions(2020..=2020)).unwrap();
        let ra = builder.build(LedgerKind::Ra, &zero_recognitions(2020..=2020)).unwrap();
        assert_eq!(bel[0].new_business, -70.0);
        assert_eq!(ra[0].new_business, -10.0);

        let onerous = vec![(2020, InitialRecognition::calculate(40.0, -70.0, -10.0, -5.0))];
        let bel = builder.build(LedgerKind::Bel, &onerous).unwrap();
        assert_abs_diff_eq!(bel[0].new_business, -39.375, epsilon = 1e-12);
    }

    #[test]
    fn test_movements_use_code_sets_and_signs() {
        let rows = vec![
            nb(2021, MovementCode::Map005)
                .with(AmountField::Be, 10.0)
                .with(AmountField::LossBe, 1.0)
                .with(AmountField::Csm, -8.0),
            nb(2021, MovementCode::Map018).with(AmountField::Be, 2.0),
            nb(2021, MovementCode::Map007).with(AmountField::Ra, 3.0),
            nb(2021, MovementCode::Map013)
                .with(AmountField::Be, -20.0)
                .with(AmountField::Csm, 4.0),
            nb(2021, MovementCode::Map017).with(AmountField::Csm, 5.0),
            nb(2021, MovementCode::Map002).with(AmountField::Be, 1_000.0),
        ];
        let index = MovementIndex::build(&rows).unwrap();
        let builder = LedgerBuilder::new(&index, "Term", "Level", 2020);
        let recognitions = zero_recognitions(2020..=2021);

        let bel = builder.build(LedgerKind::Bel, &recognitions).unwrap();
        assert_eq!(bel[1].assumption_changes, 13.0);
        assert_eq!(bel[1].experience_release, -20.0);
        assert_eq!(bel[1].closing_balance, -7.0);

        let ra = builder.build(LedgerKind::Ra, &recognitions).unwrap();
        assert_eq!(ra[1].service_expense, 3.0);

        let csm = builder.build(LedgerKind::Csm, &recognitions).unwrap();
        assert_eq!(csm[1].assumption_changes, 8.0);
        assert_eq!(csm[1].experience_release, -4.0);
        assert_eq!(csm[1].past_service_changes, -5.0);
    }

    #[test]
    fn test_opening_chains_prior_closing() {
        let rows: Vec<_> = (2020..=2024)
            .map(|year| nb(year, MovementCode::Map014).with(AmountField::Be, year as f64 - 2019.0))
            .collect();
        let index = MovementIndex::build(&rows).unwrap();
        let builder = LedgerBuilder::new(&index, "Term", "Level", 2020);

        let bel = builder.build(LedgerKind::Bel, &zero_recognitions(2020..=2024)).unwrap();
        for pair in bel.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
        assert_eq!(bel.last().unwrap().closing_balance, 15.0);
    }

    #[test]
    fn test_tcl_is_columnwise_sum() {
        let rows = vec![
            nb(2020, MovementCode::Map004).with(AmountField::Csm, 30.0),
            nb(2020, MovementCode::Map013)
                .with(AmountField::Be, -4.0)
                .with(AmountField::Ra, -1.0)
                .with(AmountField::Csm, 2.0)
                .with(AmountField::BeCfPv, -20.0)
                .with(AmountField::RaCfPv, -6.0),
            nb(2021, MovementCode::Map008).with(AmountField::Be, 7.0).with(AmountField::Ra, 0.5),
        ];
        let index = MovementIndex::build(&rows).unwrap();
        let builder = LedgerBuilder::new(&index, "Term", "Level", 2020);
        let ledgers = GroupLedgers::build(&builder, &zero_recognitions(2020..=2021)).unwrap();

        for (i, tcl) in ledgers.tcl.iter().enumerate() {
            let (b, r, c) = (&ledgers.bel[i], &ledgers.ra[i], &ledgers.csm[i]);
            assert_eq!(tcl.opening_balance, b.opening_balance + r.opening_balance + c.opening_balance);
            assert_eq!(tcl.new_business, b.new_business + r.new_business + c.new_business);
            assert_eq!(tcl.assumption_changes, b.assumption_changes + r.assumption_changes + c.assumption_changes);
            assert_eq!(tcl.experience_release, b.experience_release + r.experience_release + c.experience_release);
            assert_eq!(tcl.closing_balance, b.closing_balance + r.closing_balance + c.closing_balance);
        }
        assert_eq!(ledgers.new_business(LedgerKind::Csm, 2020), -30.0);
        assert_eq!(ledgers.new_business(LedgerKind::Csm, 2021), 0.0);
    }
}
