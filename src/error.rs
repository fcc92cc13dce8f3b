//! Error type shared by the loaders, the movement index and the engine

use thiserror::Error;

use crate::assumptions::{BusinessType, MovementCode};

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, GmmError>;

#[derive(Debug, Error)]
pub enum GmmError {
    /// More than one assumption row matched a (cohort, key[, business type]) filter
    #[error(
        "ambiguous assumption: {matches} rows match cohort {cohort}, key {code}{}",
        .business_type.map(|bt| format!(", business type {bt}")).unwrap_or_default()
    )]
    AmbiguousAssumption {
        cohort: i32,
        code: MovementCode,
        business_type: Option<BusinessType>,
        matches: usize,
    },

    /// Two rows share the full (cohort, product, sub-product, business type, key) identity
    #[error(
        "duplicate assumption row: cohort {cohort}, {product}/{sub_product}, {business_type}, {code}"
    )]
    DuplicateAssumption {
        cohort: i32,
        product: String,
        sub_product: String,
        business_type: BusinessType,
        code: MovementCode,
    },

    #[error("parameter {position} has unrecognized selection '{value}'")]
    UnrecognizedParameterSelection { position: usize, value: String },

    #[error("parameter {position} is missing")]
    MissingParameter { position: usize },

    #[error("parameter {position} is not a day/month/year date: '{value}'")]
    InvalidDate { position: usize, value: String },

    #[error("projection start year {start} is after end year {end}")]
    InvalidProjectionWindow { start: i32, end: i32 },

    #[error("unknown movement code '{0}'")]
    UnknownMovementCode(String),

    #[error("unknown business type '{0}'")]
    UnknownBusinessType(String),

    /// A fault raised while computing one product/sub-product group
    #[error("group {product}/{sub_product}: {source}")]
    Group {
        product: String,
        sub_product: String,
        #[source]
        source: Box<GmmError>,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GmmError {
    /// Attach the product/sub-product identity to a group-level fault
    pub fn in_group(self, product: &str, sub_product: &str) -> Self {
        GmmError::Group {
            product: product.to_string(),
            sub_product: sub_product.to_string(),
            source: Box::new(self),
        }
    }
}
