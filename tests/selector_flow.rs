mod common;

use spend_tracker::category::{
    CategorySelector, Selection, SelectorPhase, SubSelection, SyncOutcome, ValueSource,
};
use spend_tracker::taxonomy::{Taxonomy, TransactionKind};

/// Minimal host form: stores whatever the selector emits and echoes it back.
struct Form {
    value: String,
    selector: CategorySelector,
}

impl Form {
    fn new(kind: TransactionKind) -> Self {
        Self {
            value: String::new(),
            selector: CategorySelector::new(Taxonomy::builtin(), kind),
        }
    }

    fn store(&mut self, emission: spend_tracker::category::Emission) -> SyncOutcome {
        self.value = emission.value;
        self.selector
            .sync(&self.value, ValueSource::Echo(emission.revision))
    }
}

#[test]
fn awaiting_subcategory_survives_echoed_empty_value() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Y tế");
    assert_eq!(emission.value, "");

    assert_eq!(form.store(emission), SyncOutcome::Echo);
    assert_eq!(form.selector.observe(""), SyncOutcome::Echo);

    assert_eq!(form.selector.category(), Some("Y tế"));
    assert_eq!(form.selector.phase(), SelectorPhase::CategoryAwaitingSub);
    assert!(form.selector.shows_subcategory_picker());
}

#[test]
fn pending_other_text_survives_echoed_empty_value() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Ăn uống");
    form.store(emission);
    let emission = form.selector.select_subcategory("other").unwrap();
    assert_eq!(emission.value, "");
    form.store(emission);

    assert_eq!(form.selector.observe(""), SyncOutcome::Echo);
    assert_eq!(form.selector.phase(), SelectorPhase::SubcategoryOtherPending);
    assert_eq!(
        form.selector.selection(),
        &Selection::Category {
            name: "Ăn uống".into(),
            sub: SubSelection::Other(String::new()),
        }
    );
}

#[test]
fn different_external_value_replaces_selection() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Y tế");
    form.store(emission);

    assert_eq!(form.selector.observe("Hóa đơn > Nước"), SyncOutcome::Rederived);
    assert_eq!(form.selector.phase(), SelectorPhase::SubcategoryChosen);
    assert_eq!(form.selector.category(), Some("Hóa đơn"));
    assert_eq!(form.selector.value(), "Hóa đơn > Nước");
}

#[test]
fn explicit_reset_clears_in_progress_selection() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Y tế");
    form.store(emission);

    form.selector.reset();
    assert_eq!(form.selector.phase(), SelectorPhase::Empty);
    assert_eq!(form.selector.category(), None);

    // After a reset the previous emission no longer counts as an echo.
    assert_eq!(form.selector.observe(""), SyncOutcome::Rederived);
    assert_eq!(form.selector.phase(), SelectorPhase::Empty);
}

#[test]
fn tagged_external_empty_value_is_a_genuine_reset() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Y tế");
    form.store(emission);

    assert_eq!(
        form.selector.sync("", ValueSource::External),
        SyncOutcome::Rederived
    );
    assert_eq!(form.selector.phase(), SelectorPhase::Empty);
}

#[test]
fn kind_switch_turns_unknown_category_into_free_text() {
    let mut form = Form::new(TransactionKind::Income);
    let emission = form.selector.select_category("Lương");
    assert_eq!(emission.value, "Lương");
    form.store(emission);

    assert!(form.selector.set_kind(TransactionKind::Expense).is_none());
    assert_eq!(form.selector.phase(), SelectorPhase::CustomCategory);
    let parsed = form.selector.parsed();
    assert_eq!(parsed.category, "");
    assert_eq!(parsed.custom_text, "Lương");
    assert_eq!(form.selector.value(), "Lương");
}

#[test]
fn kind_switch_drops_uncommitted_category() {
    let mut form = Form::new(TransactionKind::Expense);
    let emission = form.selector.select_category("Hóa đơn");
    form.store(emission);

    form.selector.set_kind(TransactionKind::Income);
    assert_eq!(form.selector.phase(), SelectorPhase::Empty);
}

#[test]
fn kind_switch_redecodes_loaded_bare_category() {
    let mut selector = CategorySelector::with_value(
        Taxonomy::builtin(),
        TransactionKind::Expense,
        "Hóa đơn",
    );
    assert_eq!(selector.phase(), SelectorPhase::CategoryAwaitingSub);

    assert!(selector.set_kind(TransactionKind::Income).is_none());
    assert_eq!(selector.phase(), SelectorPhase::CustomCategory);
    assert_eq!(selector.parsed().custom_text, "Hóa đơn");
    assert_eq!(selector.value(), "Hóa đơn");
}

#[test]
fn kind_switch_after_external_sync_uses_host_value() {
    let mut form = Form::new(TransactionKind::Expense);
    form.value = "Hóa đơn".to_string();
    assert_eq!(
        form.selector.sync(&form.value, ValueSource::External),
        SyncOutcome::Rederived
    );

    assert!(form.selector.set_kind(TransactionKind::Income).is_none());
    assert_eq!(
        form.selector.selection(),
        &Selection::Custom("Hóa đơn".to_string())
    );
    assert_eq!(form.selector.value(), form.value);
}

#[test]
fn bill_scenario() {
    let mut form = Form::new(TransactionKind::Expense);

    let emission = form.selector.select_category("Hóa đơn");
    assert_eq!(emission.value, "");
    form.store(emission);

    let emission = form.selector.select_subcategory("Điện").unwrap();
    assert_eq!(emission.value, "Hóa đơn > Điện");
    form.store(emission);
    assert_eq!(form.value, "Hóa đơn > Điện");

    let emission = form.selector.deselect_subcategory().unwrap();
    assert_eq!(emission.value, "");
    form.store(emission);
    assert_eq!(form.selector.category(), Some("Hóa đơn"));
    assert_eq!(form.selector.phase(), SelectorPhase::CategoryAwaitingSub);
}

#[test]
fn deselecting_subcategory_of_flat_category_emits_category() {
    let mut form = Form::new(TransactionKind::Expense);
    form.selector.select_category("Từ thiện");
    form.selector.select_subcategory("Đám cưới");
    let emission = form.selector.deselect_subcategory().unwrap();
    assert_eq!(emission.value, "Từ thiện");
    assert_eq!(form.selector.phase(), SelectorPhase::CategoryNoSub);
}

#[test]
fn loading_a_record_then_editing() {
    let mut selector = CategorySelector::with_value(
        common::sample_taxonomy(),
        TransactionKind::Expense,
        "Food > Street food",
    );
    assert_eq!(selector.phase(), SelectorPhase::SubcategoryOtherFilled);
    assert_eq!(selector.custom_text(), Some("Street food"));

    let emission = selector.input_text("Street food stall").unwrap();
    assert_eq!(emission.value, "Food > Street food stall");

    let emission = selector.select_subcategory("Dining").unwrap();
    assert_eq!(emission.value, "Food > Dining");
    assert_eq!(selector.custom_text(), None);
}

#[test]
fn deselect_category_clears_everything() {
    let mut form = Form::new(TransactionKind::Expense);
    form.selector.select_category("Hóa đơn");
    form.selector.select_subcategory("Nước");
    let emission = form.selector.deselect_category();
    assert_eq!(emission.value, "");
    assert_eq!(form.selector.selection(), &Selection::Empty);
}
