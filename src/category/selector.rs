//! Interactive category selection state.
//!
//! [`CategorySelector`] owns the in-progress choice behind a category field.
//! User actions mutate the local [`Selection`] and return an [`Emission`] with
//! the new encoded value; the host stores that value and eventually reports it
//! back through [`CategorySelector::sync`] or [`CategorySelector::observe`].
//!
//! Several in-progress states encode to `""` (a category awaiting its
//! subcategory, an "other" subcategory awaiting text). An echo of the
//! selector's own emission must not be mistaken for a host reset, so each
//! emission carries a [`Revision`] and echoes are recognised by revision and
//! value instead of being re-decoded.

use std::{fmt, sync::Arc};

use tracing::{debug, trace, warn};

use super::codec::{self, ParsedValue, OTHER_SUBCATEGORY};
use crate::taxonomy::{Taxonomy, TransactionKind};

/// Monotonic counter stamped on every emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

/// A value produced by user interaction, to be stored by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub value: String,
    pub revision: Revision,
}

/// Where a value reported to [`CategorySelector::sync`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The host is reflecting an emission of this selector.
    Echo(Revision),
    /// The host changed the value itself (record loaded, form reset, ...).
    External,
}

/// Result of reconciling a host value with the local selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Echo of the latest emission; local state kept.
    Echo,
    /// Echo of an older emission; local state kept.
    Stale,
    /// Local state rebuilt from the value.
    Rederived,
}

/// Subcategory part of a category selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubSelection {
    Unset,
    Listed(String),
    /// Free text under the category; may still be blank.
    Other(String),
}

/// Local selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Empty,
    /// Free text standing for the whole value.
    Custom(String),
    /// A taxonomy category, with its subcategory choice.
    Category { name: String, sub: SubSelection },
}

impl Selection {
    pub fn from_parsed(parsed: ParsedValue) -> Self {
        let ParsedValue {
            category,
            subcategory,
            custom_text,
        } = parsed;

        if category.is_empty() {
            return if custom_text.is_empty() {
                Selection::Empty
            } else {
                Selection::Custom(custom_text)
            };
        }

        let sub = if subcategory.is_empty() {
            SubSelection::Unset
        } else if subcategory == OTHER_SUBCATEGORY {
            SubSelection::Other(custom_text)
        } else {
            SubSelection::Listed(subcategory)
        };
        Selection::Category {
            name: category,
            sub,
        }
    }

    pub fn to_parsed(&self) -> ParsedValue {
        match self {
            Selection::Empty => ParsedValue::empty(),
            Selection::Custom(text) => ParsedValue::custom(text.clone()),
            Selection::Category { name, sub } => match sub {
                SubSelection::Unset => ParsedValue::category(name.clone()),
                SubSelection::Listed(sub) => ParsedValue::with_subcategory(name.clone(), sub.clone()),
                SubSelection::Other(text) => ParsedValue::other(name.clone(), text.clone()),
            },
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Selection::Category { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Coarse view of the selection, as the presentation layer needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPhase {
    Empty,
    CategoryNoSub,
    CategoryAwaitingSub,
    SubcategoryChosen,
    SubcategoryOtherPending,
    SubcategoryOtherFilled,
    CustomCategory,
}

impl fmt::Display for SelectorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SelectorPhase::Empty => "empty",
            SelectorPhase::CategoryNoSub => "category",
            SelectorPhase::CategoryAwaitingSub => "awaiting subcategory",
            SelectorPhase::SubcategoryChosen => "subcategory",
            SelectorPhase::SubcategoryOtherPending => "other subcategory (awaiting text)",
            SelectorPhase::SubcategoryOtherFilled => "other subcategory",
            SelectorPhase::CustomCategory => "custom",
        };
        f.write_str(label)
    }
}

/// State machine behind a category form field.
#[derive(Debug, Clone)]
pub struct CategorySelector {
    taxonomy: Arc<Taxonomy>,
    kind: TransactionKind,
    selection: Selection,
    revision: Revision,
    last_emitted: Option<Emission>,
    /// Value the host holds as far as this selector knows: the last one
    /// synced in or emitted out.
    host_value: String,
}

impl CategorySelector {
    pub fn new(taxonomy: Arc<Taxonomy>, kind: TransactionKind) -> Self {
        Self {
            taxonomy,
            kind,
            selection: Selection::Empty,
            revision: Revision::default(),
            last_emitted: None,
            host_value: String::new(),
        }
    }

    /// Selector initialised from an existing encoded value.
    pub fn with_value(taxonomy: Arc<Taxonomy>, kind: TransactionKind, value: &str) -> Self {
        let mut selector = Self::new(taxonomy, kind);
        selector.rederive(value);
        selector
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn last_emitted(&self) -> Option<&Emission> {
        self.last_emitted.as_ref()
    }

    pub fn parsed(&self) -> ParsedValue {
        self.selection.to_parsed()
    }

    /// Encoded value of the current selection. A category still awaiting
    /// its subcategory is not committed and reads as `""`.
    pub fn value(&self) -> String {
        if self.phase() == SelectorPhase::CategoryAwaitingSub {
            return String::new();
        }
        codec::encode(&self.parsed())
    }

    pub fn category(&self) -> Option<&str> {
        self.selection.category()
    }

    pub fn phase(&self) -> SelectorPhase {
        match &self.selection {
            Selection::Empty => SelectorPhase::Empty,
            Selection::Custom(_) => SelectorPhase::CustomCategory,
            Selection::Category { name, sub } => match sub {
                SubSelection::Unset if self.has_subcategories(name) => {
                    SelectorPhase::CategoryAwaitingSub
                }
                SubSelection::Unset => SelectorPhase::CategoryNoSub,
                SubSelection::Listed(_) => SelectorPhase::SubcategoryChosen,
                SubSelection::Other(text) if text.trim().is_empty() => {
                    SelectorPhase::SubcategoryOtherPending
                }
                SubSelection::Other(_) => SelectorPhase::SubcategoryOtherFilled,
            },
        }
    }

    /// Whether the subcategory picker applies to the current category.
    pub fn shows_subcategory_picker(&self) -> bool {
        self.category()
            .map(|name| self.has_subcategories(name))
            .unwrap_or(false)
    }

    /// Whether free text currently stands for the whole value: no category,
    /// or the distinguished "Other" category.
    pub fn shows_custom_text_input(&self) -> bool {
        match &self.selection {
            Selection::Empty | Selection::Custom(_) => true,
            Selection::Category { name, .. } => Taxonomy::is_other(name),
        }
    }

    /// Choices offered by the subcategory picker, ending with the "other" entry.
    pub fn subcategory_options(&self) -> Vec<&str> {
        let Some(name) = self.category() else {
            return Vec::new();
        };
        let subs = self.taxonomy.subcategories(self.kind, name);
        if subs.is_empty() {
            return Vec::new();
        }
        subs.iter()
            .map(String::as_str)
            .chain(std::iter::once(OTHER_SUBCATEGORY))
            .collect()
    }

    /// Free text being edited, either for the whole value or for the
    /// "other" subcategory.
    pub fn custom_text(&self) -> Option<&str> {
        match &self.selection {
            Selection::Custom(text) => Some(text),
            Selection::Category {
                sub: SubSelection::Other(text),
                ..
            } => Some(text),
            _ => None,
        }
    }

    pub fn select_category(&mut self, name: &str) -> Emission {
        if name.trim().is_empty() {
            return self.deselect_category();
        }
        self.selection = if self.taxonomy.has_category(self.kind, name) {
            Selection::Category {
                name: name.to_string(),
                sub: SubSelection::Unset,
            }
        } else {
            debug!(kind = %self.kind, category = name, "unknown category kept as free text");
            Selection::Custom(name.to_string())
        };
        self.emit()
    }

    pub fn deselect_category(&mut self) -> Emission {
        self.selection = Selection::Empty;
        self.emit()
    }

    /// Picks a subcategory of the current category. `"other"` switches to
    /// free-text mode; an unlisted name is kept as that free text. Ignored
    /// when no category is selected.
    pub fn select_subcategory(&mut self, name: &str) -> Option<Emission> {
        let category = self.category()?.to_string();
        if name.trim().is_empty() {
            return self.deselect_subcategory();
        }

        let listed = self
            .taxonomy
            .category(self.kind, &category)
            .map(|def| def.contains_subcategory(name))
            .unwrap_or(false);
        let sub = if name == OTHER_SUBCATEGORY {
            SubSelection::Other(String::new())
        } else if listed {
            SubSelection::Listed(name.to_string())
        } else {
            SubSelection::Other(name.to_string())
        };
        self.selection = Selection::Category {
            name: category,
            sub,
        };
        Some(self.emit())
    }

    pub fn deselect_subcategory(&mut self) -> Option<Emission> {
        let category = self.category()?.to_string();
        self.selection = Selection::Category {
            name: category,
            sub: SubSelection::Unset,
        };
        Some(self.emit())
    }

    /// Applies typed free text to whichever text field is active. Returns
    /// `None` when the selection has no free-text field.
    pub fn input_text(&mut self, text: &str) -> Option<Emission> {
        match &self.selection {
            Selection::Category {
                name,
                sub: SubSelection::Other(_),
            } => {
                self.selection = Selection::Category {
                    name: name.clone(),
                    sub: SubSelection::Other(text.to_string()),
                };
                Some(self.emit())
            }
            _ if self.shows_custom_text_input() => {
                self.selection = if text.trim().is_empty() {
                    Selection::Empty
                } else {
                    Selection::Custom(text.to_string())
                };
                Some(self.emit())
            }
            _ => {
                trace!(phase = %self.phase(), "text input ignored");
                None
            }
        }
    }

    /// Inline clear control: back to empty whatever the current state.
    pub fn clear(&mut self) -> Emission {
        self.selection = Selection::Empty;
        self.emit()
    }

    /// Switches the active taxonomy half and re-decodes the host's value
    /// under it. Returns an emission only when the encoded value changed.
    pub fn set_kind(&mut self, kind: TransactionKind) -> Option<Emission> {
        if kind == self.kind {
            return None;
        }
        let before = self.host_value.clone();
        self.kind = kind;
        self.selection = Selection::from_parsed(codec::decode(&self.taxonomy, kind, &before));
        debug!(%kind, value = %before, phase = %self.phase(), "kind switched");
        let after = self.value();
        if after == before {
            None
        } else {
            Some(self.emit_value(after))
        }
    }

    /// Reconciles a host value whose origin is known.
    pub fn sync(&mut self, value: &str, source: ValueSource) -> SyncOutcome {
        match source {
            ValueSource::External => self.rederive(value),
            ValueSource::Echo(revision) if revision < self.revision => {
                trace!(revision = revision.get(), "stale echo ignored");
                SyncOutcome::Stale
            }
            ValueSource::Echo(revision) => match &self.last_emitted {
                Some(last) if last.revision == revision && last.value == value => {
                    SyncOutcome::Echo
                }
                _ => {
                    warn!(
                        revision = revision.get(),
                        value, "echo does not match an emission, re-deriving"
                    );
                    self.rederive(value)
                }
            },
        }
    }

    /// Reconciles a host value of unknown origin: equal to the last emission
    /// means echo, anything else is a genuine change.
    pub fn observe(&mut self, value: &str) -> SyncOutcome {
        match &self.last_emitted {
            Some(last) if last.value == value => SyncOutcome::Echo,
            _ => self.rederive(value),
        }
    }

    /// Hosting form was reset or closed.
    pub fn reset(&mut self) {
        self.selection = Selection::Empty;
        self.last_emitted = None;
        self.host_value.clear();
        debug!("category selection reset");
    }

    fn rederive(&mut self, value: &str) -> SyncOutcome {
        self.selection = Selection::from_parsed(codec::decode(&self.taxonomy, self.kind, value));
        self.last_emitted = None;
        self.host_value = value.to_string();
        debug!(value, phase = %self.phase(), "category selection re-derived");
        SyncOutcome::Rederived
    }

    fn has_subcategories(&self, name: &str) -> bool {
        !self.taxonomy.subcategories(self.kind, name).is_empty()
    }

    fn emit(&mut self) -> Emission {
        let value = self.value();
        self.emit_value(value)
    }

    fn emit_value(&mut self, value: String) -> Emission {
        self.revision = self.revision.next();
        let emission = Emission {
            value,
            revision: self.revision,
        };
        debug!(
            revision = emission.revision.get(),
            value = %emission.value,
            phase = %self.phase(),
            "category value emitted"
        );
        self.host_value.clone_from(&emission.value);
        self.last_emitted = Some(emission.clone());
        emission
    }
}
