//! Two-level category taxonomy: transaction kind → categories → subcategories.
//!
//! A taxonomy is an immutable configuration value. Components that need one
//! receive it as an `Arc<Taxonomy>` rather than reaching for a global table, so
//! alternate taxonomies can be loaded from disk or built in tests.

mod builtin;

use std::{collections::HashSet, fmt, path::Path, str::FromStr, sync::Arc};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::category::codec::{DELIMITER, OTHER_SUBCATEGORY};
use crate::errors::{Result, TrackerError};
use crate::utils::persistence;

/// Name of the fallback category present in every kind.
pub const OTHER_CATEGORY: &str = "Other";

/// Icon reported for names the taxonomy does not know.
pub const DEFAULT_ICON: &str = "❔";

const SUGGESTION_THRESHOLD: f64 = 0.5;

static BUILTIN: Lazy<Arc<Taxonomy>> = Lazy::new(|| Arc::new(builtin::default_taxonomy()));

/// Direction of a transaction; selects which half of the taxonomy applies.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Expense, TransactionKind::Income];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expense" | "chi" => Ok(TransactionKind::Expense),
            "income" | "thu" => Ok(TransactionKind::Income),
            other => Err(TrackerError::InvalidInput(format!(
                "unknown transaction kind `{}` (expected expense or income)",
                other
            ))),
        }
    }
}

/// A single category entry with its ordered subcategory list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl CategoryDef {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            subcategories: Vec::new(),
        }
    }

    pub fn with_subcategories<I, S>(mut self, subcategories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories = subcategories.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_subcategories(&self) -> bool {
        !self.subcategories.is_empty()
    }

    pub fn contains_subcategory(&self, name: &str) -> bool {
        self.subcategories.iter().any(|sub| sub == name)
    }
}

/// Category tables for both transaction kinds, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    #[serde(default)]
    expense: Vec<CategoryDef>,
    #[serde(default)]
    income: Vec<CategoryDef>,
}

impl Taxonomy {
    /// Builds a validated taxonomy from explicit category lists.
    pub fn new(expense: Vec<CategoryDef>, income: Vec<CategoryDef>) -> Result<Self> {
        let taxonomy = Self { expense, income };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Shared handle to the built-in default taxonomy.
    pub fn builtin() -> Arc<Taxonomy> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let taxonomy: Taxonomy = serde_json::from_str(json)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Loads and validates a taxonomy file.
    pub fn load(path: &Path) -> Result<Self> {
        let taxonomy: Taxonomy = persistence::read_json(path)?;
        taxonomy.validate()?;
        info!(
            path = %path.display(),
            expense = taxonomy.expense.len(),
            income = taxonomy.income.len(),
            "taxonomy loaded"
        );
        Ok(taxonomy)
    }

    /// Checks the structural invariants the codec relies on.
    pub fn validate(&self) -> Result<()> {
        for kind in TransactionKind::ALL {
            if let Err(err) = validate_kind(kind, self.categories(kind)) {
                warn!(%kind, error = %err, "taxonomy rejected");
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn categories(&self, kind: TransactionKind) -> &[CategoryDef] {
        match kind {
            TransactionKind::Expense => &self.expense,
            TransactionKind::Income => &self.income,
        }
    }

    pub fn category(&self, kind: TransactionKind, name: &str) -> Option<&CategoryDef> {
        self.categories(kind).iter().find(|def| def.name == name)
    }

    pub fn has_category(&self, kind: TransactionKind, name: &str) -> bool {
        self.category(kind, name).is_some()
    }

    /// Subcategories of `name`, empty when the category is unknown.
    pub fn subcategories(&self, kind: TransactionKind, name: &str) -> &[String] {
        self.category(kind, name)
            .map(|def| def.subcategories.as_slice())
            .unwrap_or(&[])
    }

    /// First category (in taxonomy order) listing `subcategory`.
    pub fn owner_of_subcategory(
        &self,
        kind: TransactionKind,
        subcategory: &str,
    ) -> Option<&CategoryDef> {
        self.categories(kind)
            .iter()
            .find(|def| def.contains_subcategory(subcategory))
    }

    pub fn is_other(name: &str) -> bool {
        name == OTHER_CATEGORY
    }

    pub fn icon(&self, kind: TransactionKind, name: &str) -> &str {
        self.category(kind, name)
            .map(|def| def.icon.as_str())
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ICON)
    }

    /// Closest category name to `input`, ignoring case, if any is similar
    /// enough to be worth suggesting.
    pub fn suggest(&self, kind: TransactionKind, input: &str) -> Option<&str> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.categories(kind)
            .iter()
            .map(|def| {
                let score = strsim::normalized_levenshtein(&needle, &def.name.to_lowercase());
                (def.name.as_str(), score)
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }
}

fn validate_kind(kind: TransactionKind, categories: &[CategoryDef]) -> Result<()> {
    let invalid = |message: String| Err(TrackerError::InvalidTaxonomy(format!("{kind}: {message}")));

    let mut seen = HashSet::new();
    for def in categories {
        check_name(&def.name).or_else(|reason| invalid(format!("category {reason}")))?;
        if !seen.insert(def.name.as_str()) {
            return invalid(format!("duplicate category `{}`", def.name));
        }

        let mut subs = HashSet::new();
        for sub in &def.subcategories {
            check_name(sub)
                .or_else(|reason| invalid(format!("subcategory of `{}` {reason}", def.name)))?;
            if sub == OTHER_SUBCATEGORY {
                return invalid(format!(
                    "`{}` lists the reserved subcategory `{}`",
                    def.name, OTHER_SUBCATEGORY
                ));
            }
            if !subs.insert(sub.as_str()) {
                return invalid(format!(
                    "duplicate subcategory `{}` under `{}`",
                    sub, def.name
                ));
            }
        }
    }

    match categories.iter().find(|def| Taxonomy::is_other(&def.name)) {
        None => invalid(format!("missing `{}` category", OTHER_CATEGORY)),
        Some(other) if other.has_subcategories() => invalid(format!(
            "`{}` must not have subcategories",
            OTHER_CATEGORY
        )),
        Some(_) => Ok(()),
    }
}

fn check_name(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be blank".into());
    }
    if name.contains(DELIMITER) {
        return Err(format!("`{}` contains the delimiter `{}`", name, DELIMITER));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Vec<CategoryDef> {
        vec![
            CategoryDef::new("Food", "🍔").with_subcategories(["Groceries", "Dining"]),
            CategoryDef::new(OTHER_CATEGORY, ""),
        ]
    }

    #[test]
    fn builtin_taxonomy_is_valid() {
        let taxonomy = Taxonomy::builtin();
        taxonomy.validate().unwrap();
        assert!(taxonomy.has_category(TransactionKind::Expense, "Hóa đơn"));
        assert!(taxonomy.has_category(TransactionKind::Income, "Lương"));
    }

    #[test]
    fn builtin_handles_are_shared() {
        assert!(Arc::ptr_eq(&Taxonomy::builtin(), &Taxonomy::builtin()));
    }

    #[test]
    fn expense_is_the_default_kind() {
        assert_eq!(TransactionKind::default(), TransactionKind::Expense);
    }

    #[test]
    fn missing_other_category_rejected() {
        let err = Taxonomy::new(vec![CategoryDef::new("Food", "")], minimal()).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidTaxonomy(message) if message.contains("missing")));
    }

    #[test]
    fn other_with_subcategories_rejected() {
        let expense = vec![CategoryDef::new(OTHER_CATEGORY, "").with_subcategories(["Misc"])];
        assert!(Taxonomy::new(expense, minimal()).is_err());
    }

    #[test]
    fn delimiter_in_names_rejected() {
        let mut expense = minimal();
        expense.push(CategoryDef::new("Home > Garden", ""));
        assert!(Taxonomy::new(expense, minimal()).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut expense = minimal();
        expense.push(CategoryDef::new("Food", ""));
        assert!(Taxonomy::new(expense, minimal()).is_err());

        let expense = vec![
            CategoryDef::new("Food", "").with_subcategories(["Dining", "Dining"]),
            CategoryDef::new(OTHER_CATEGORY, ""),
        ];
        assert!(Taxonomy::new(expense, minimal()).is_err());
    }

    #[test]
    fn reserved_subcategory_rejected() {
        let expense = vec![
            CategoryDef::new("Food", "").with_subcategories(["other"]),
            CategoryDef::new(OTHER_CATEGORY, ""),
        ];
        assert!(Taxonomy::new(expense, minimal()).is_err());
    }

    #[test]
    fn icon_falls_back_for_unknown_and_blank_icons() {
        let taxonomy = Taxonomy::new(minimal(), minimal()).unwrap();
        assert_eq!(taxonomy.icon(TransactionKind::Expense, "Food"), "🍔");
        assert_eq!(taxonomy.icon(TransactionKind::Expense, OTHER_CATEGORY), DEFAULT_ICON);
        assert_eq!(taxonomy.icon(TransactionKind::Expense, "Nope"), DEFAULT_ICON);
    }

    #[test]
    fn owner_lookup_follows_taxonomy_order() {
        let expense = vec![
            CategoryDef::new("A", "").with_subcategories(["Shared"]),
            CategoryDef::new("B", "").with_subcategories(["Shared"]),
            CategoryDef::new(OTHER_CATEGORY, ""),
        ];
        let taxonomy = Taxonomy::new(expense, minimal()).unwrap();
        let owner = taxonomy
            .owner_of_subcategory(TransactionKind::Expense, "Shared")
            .unwrap();
        assert_eq!(owner.name, "A");
    }

    #[test]
    fn suggest_finds_close_names() {
        let taxonomy = Taxonomy::builtin();
        assert_eq!(
            taxonomy.suggest(TransactionKind::Expense, "hoa đơn"),
            Some("Hóa đơn")
        );
        assert_eq!(taxonomy.suggest(TransactionKind::Expense, "zzzzzzzzzz"), None);
        assert_eq!(taxonomy.suggest(TransactionKind::Expense, "   "), None);
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let json = r#"{
            "expense": [
                {"name": "Zeta", "icon": "z", "subcategories": ["b", "a"]},
                {"name": "Other"}
            ],
            "income": [{"name": "Other"}]
        }"#;
        let taxonomy = Taxonomy::from_json_str(json).unwrap();
        let names: Vec<&str> = taxonomy
            .categories(TransactionKind::Expense)
            .iter()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Other"]);
        assert_eq!(
            taxonomy.subcategories(TransactionKind::Expense, "Zeta"),
            &["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!(" expense ".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
