//! Movement index: O(1) scalar lookup of assumption amounts by (cohort, code[, business type])

use std::collections::{HashMap, HashSet};

use super::{AmountField, AssumptionRow, BusinessType, Movement, MovementCode};
use crate::error::{GmmError, Result};

/// Read-only index over the assumption rows of one product/sub-product group
///
/// Row identity (cohort, product, sub-product, business type, key) is checked once at
/// construction. A lookup without a business type filter can still see one row per
/// business type, which is reported as [`GmmError::AmbiguousAssumption`].
#[derive(Debug, Clone, Default)]
pub struct MovementIndex<'a> {
    rows: HashMap<(i32, MovementCode), Vec<&'a AssumptionRow>>,
}

impl<'a> MovementIndex<'a> {
    pub fn build<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a AssumptionRow>,
    {
        let mut seen = HashSet::new();
        let mut index: HashMap<(i32, MovementCode), Vec<&'a AssumptionRow>> = HashMap::new();

        for row in rows {
            let identity = (
                row.cohort,
                row.product.as_str(),
                row.sub_product.as_str(),
                row.business_type,
                row.key,
            );
            if !seen.insert(identity) {
                return Err(GmmError::DuplicateAssumption {
                    cohort: row.cohort,
                    product: row.product.clone(),
                    sub_product: row.sub_product.clone(),
                    business_type: row.business_type,
                    code: row.key,
                });
            }
            index.entry((row.cohort, row.key)).or_default().push(row);
        }

        Ok(Self { rows: index })
    }

    /// The single row matching the filter, `None` when nothing matches
    pub fn row(
        &self,
        cohort: i32,
        code: MovementCode,
        business_type: Option<BusinessType>,
    ) -> Result<Option<&'a AssumptionRow>> {
        let Some(candidates) = self.rows.get(&(cohort, code)) else {
            return Ok(None);
        };

        let mut matches = candidates
            .iter()
            .copied()
            .filter(|row| business_type.map_or(true, |bt| row.business_type == bt));

        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            return Err(GmmError::AmbiguousAssumption {
                cohort,
                code,
                business_type,
                matches: extra + 1,
            });
        }
        Ok(first)
    }

    /// Scalar amount for the filter; a missing row is a zero movement
    pub fn lookup(
        &self,
        cohort: i32,
        code: MovementCode,
        business_type: Option<BusinessType>,
        field: AmountField,
    ) -> Result<f64> {
        Ok(self
            .row(cohort, code, business_type)?
            .map_or(0.0, |row| row.amount(field)))
    }

    /// Sum `value(row)` over the code set of `movement`
    pub fn sum_with<F>(
        &self,
        cohort: i32,
        movement: Movement,
        business_type: Option<BusinessType>,
        value: F,
    ) -> Result<f64>
    where
        F: Fn(&AssumptionRow) -> f64,
    {
        let mut total = 0.0;
        for &code in movement.codes() {
            if let Some(row) = self.row(cohort, code, business_type)? {
                total += value(row);
            }
        }
        Ok(total)
    }
}
