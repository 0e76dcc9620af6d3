#![doc(test(attr(deny(warnings))))]

//! Category handling for a personal finance tracker: the two-level
//! category/subcategory taxonomy, the codec that packs a classification into
//! the single string stored on each transaction, the selector state machine
//! behind the category form field, and category statistics.

pub mod category;
pub mod cli;
pub mod config;
pub mod errors;
pub mod stats;
pub mod taxonomy;
pub mod utils;

pub use category::{decode, encode, CategorySelector, ParsedValue};
pub use errors::{Result, TrackerError};
pub use taxonomy::{Taxonomy, TransactionKind};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("spend_tracker tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
