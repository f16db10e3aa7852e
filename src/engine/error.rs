//! Engine error taxonomy
//!
//! All engine failures are local validation errors raised synchronously by
//! the composer or the state machine; nothing is transient or fatal, and
//! they are surfaced to the caller unmodified. Aggregation never errors.

use thiserror::Error;

use crate::entities::order::FulfillmentStatus;

/// Validation failures from the order engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The product template has nothing to build and nothing to charge for
    #[error("product '{title}' has no parts and no declared price")]
    InvalidTemplate { title: String },

    /// Quantities must be positive integers
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// A piece or part index beyond the current bounds
    #[error("index {index} is out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Restore is only valid from Done
    #[error("cannot restore an order that is '{status}'; only a done order can be restored")]
    InvalidTransition { status: FulfillmentStatus },
}
