//! Category field logic: the string codec and the interactive selector.

pub mod codec;
pub mod selector;

pub use codec::{decode, encode, ParsedValue, DELIMITER, OTHER_SUBCATEGORY};
pub use selector::{
    CategorySelector, Emission, Revision, Selection, SelectorPhase, SubSelection, SyncOutcome,
    ValueSource,
};
