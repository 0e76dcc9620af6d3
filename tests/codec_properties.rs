mod common;

use spend_tracker::category::{decode, encode, ParsedValue, DELIMITER};
use spend_tracker::taxonomy::{Taxonomy, TransactionKind};

#[test]
fn categories_without_subcategories_round_trip() {
    for taxonomy in [Taxonomy::builtin(), common::sample_taxonomy()] {
        for kind in TransactionKind::ALL {
            for def in taxonomy.categories(kind).iter().filter(|def| !def.has_subcategories()) {
                let parsed = ParsedValue::category(def.name.clone());
                let encoded = encode(&parsed);
                assert_eq!(encoded, def.name);
                assert_eq!(decode(&taxonomy, kind, &encoded), parsed, "{kind} {}", def.name);
            }
        }
    }
}

#[test]
fn listed_subcategories_round_trip() {
    let taxonomy = Taxonomy::builtin();
    for kind in TransactionKind::ALL {
        for def in taxonomy.categories(kind) {
            for sub in &def.subcategories {
                let value = format!("{}{}{}", def.name, DELIMITER, sub);
                let parsed = decode(&taxonomy, kind, &value);
                assert_eq!(parsed, ParsedValue::with_subcategory(def.name.clone(), sub.clone()));
                assert_eq!(encode(&parsed), value);
            }
        }
    }
}

#[test]
fn free_text_falls_back_to_custom() {
    let taxonomy = Taxonomy::builtin();
    for kind in TransactionKind::ALL {
        assert_eq!(
            decode(&taxonomy, kind, "Freeform Text"),
            ParsedValue::custom("Freeform Text")
        );
    }
}

#[test]
fn unlisted_subcategory_round_trips_as_other() {
    let taxonomy = Taxonomy::builtin();
    let parsed = decode(&taxonomy, TransactionKind::Expense, "Ăn uống > Quà sáng");
    assert_eq!(parsed.category, "Ăn uống");
    assert_eq!(parsed.subcategory, "other");
    assert_eq!(parsed.custom_text, "Quà sáng");
    assert_eq!(encode(&parsed), "Ăn uống > Quà sáng");
}

#[test]
fn empty_value_is_empty_for_every_kind() {
    for taxonomy in [Taxonomy::builtin(), common::sample_taxonomy()] {
        for kind in TransactionKind::ALL {
            assert_eq!(decode(&taxonomy, kind, ""), ParsedValue::empty());
        }
    }
}

#[test]
fn lookups_stay_within_the_active_kind() {
    let taxonomy = common::sample_taxonomy();
    // "Dividends" is an income subcategory only.
    assert_eq!(
        decode(&taxonomy, TransactionKind::Expense, "Dividends"),
        ParsedValue::custom("Dividends")
    );
    assert_eq!(
        decode(&taxonomy, TransactionKind::Income, "Dividends"),
        ParsedValue::with_subcategory("Investments", "Dividends")
    );
}

#[test]
fn decoded_values_re_encode_to_themselves() {
    let taxonomy = Taxonomy::builtin();
    let samples = [
        "Hóa đơn > Điện",
        "Từ thiện",
        "Thuốc",
        "Quà cưới",
        "Ăn uống > Bánh mì",
        "Không rõ > Gì đó",
    ];
    for value in samples {
        let parsed = decode(&taxonomy, TransactionKind::Expense, value);
        let encoded = encode(&parsed);
        assert_eq!(decode(&taxonomy, TransactionKind::Expense, &encoded), parsed, "{value}");
    }
}
