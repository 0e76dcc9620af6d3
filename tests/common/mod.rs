#![allow(dead_code)]

use std::sync::Arc;

use spend_tracker::taxonomy::{CategoryDef, Taxonomy, OTHER_CATEGORY};

/// Small English taxonomy for tests that should not depend on the built-in table.
pub fn sample_taxonomy() -> Arc<Taxonomy> {
    let expense = vec![
        CategoryDef::new("Food", "🍔").with_subcategories(["Groceries", "Dining", "Snacks"]),
        CategoryDef::new("Bills", "🧾").with_subcategories(["Power", "Water"]),
        CategoryDef::new("Charity", "🤝"),
        CategoryDef::new(OTHER_CATEGORY, "📦"),
    ];
    let income = vec![
        CategoryDef::new("Salary", "💰"),
        CategoryDef::new("Investments", "📈").with_subcategories(["Dividends", "Interest"]),
        CategoryDef::new(OTHER_CATEGORY, "📦"),
    ];
    Arc::new(Taxonomy::new(expense, income).expect("sample taxonomy is valid"))
}

pub const SAMPLE_TAXONOMY_JSON: &str = r#"{
  "expense": [
    {"name": "Food", "icon": "🍔", "subcategories": ["Groceries", "Dining", "Snacks"]},
    {"name": "Bills", "icon": "🧾", "subcategories": ["Power", "Water"]},
    {"name": "Charity", "icon": "🤝"},
    {"name": "Other", "icon": "📦"}
  ],
  "income": [
    {"name": "Salary", "icon": "💰"},
    {"name": "Other", "icon": "📦"}
  ]
}"#;
