//! IFRS 17 General Measurement Model calculations
//!
//! Per product/sub-product group:
//! 1. **Initial recognition**: CSM or loss component at the inception year
//! 2. **Ledger roll-forward**: BEL, RA and CSM reconciliations, chained period to period
//! 3. **TCL aggregation**: column-wise BEL + RA + CSM
//! 4. **Measurement-component analysis**: PV of future cash flows / RA / CSM / total
//! 5. **Remaining-coverage analysis**: LRC excl. loss / LRC loss / LIC / total
//!
//! Groups share nothing but the read-only feed and are evaluated independently.

mod component;
mod coverage;
mod engine;
mod ledger;
mod recognition;

pub use component::{ComponentAnalysisBuilder, ComponentMeasure, MeasurementComponentRow};
pub use coverage::{CoverageAnalysisBuilder, CoverageMeasure, RemainingCoverageRow};
pub(crate) use engine::group_by_product;
pub use engine::{EngineConfig, GmmEngine, GroupResult};
pub use ledger::{total_contract_liability, GroupLedgers, LedgerBuilder, LedgerKind, LedgerRow};
pub use recognition::{InitialRecognition, RecognitionCalculator};
