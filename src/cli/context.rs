use std::{env, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::{debug, trace};

use crate::category::{
    codec, CategorySelector, Emission, SyncOutcome, ValueSource, OTHER_SUBCATEGORY,
};
use crate::config::{Config, ConfigManager};
use crate::errors::CliError;
use crate::stats::{self, DateRange};
use crate::taxonomy::{Taxonomy, TransactionKind};
use crate::utils::build_info;

use super::output;

const REQUIRED_MESSAGE: &str = "Category is required";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Name, usage and description of every shell command.
pub(crate) const COMMANDS: &[(&str, &str, &str)] = &[
    ("help", "help", "List commands"),
    ("kind", "kind [expense|income]", "Show or switch the transaction kind"),
    ("categories", "categories", "List categories of the current kind"),
    ("select", "select <category>", "Choose a category"),
    ("deselect", "deselect", "Clear the category choice"),
    ("sub", "sub <subcategory|other>", "Choose a subcategory"),
    ("unsub", "unsub", "Clear the subcategory choice"),
    ("text", "text [words..]", "Type into the active free-text field"),
    ("clear", "clear", "Clear the field"),
    ("load", "load <value>", "Load a stored value into the form"),
    ("observe", "observe <value>", "Report a host value of unknown origin"),
    ("reset", "reset", "Reset the form for a new entry"),
    ("show", "show", "Show the selection state"),
    ("decode", "decode <value>", "Decode a value under the current kind"),
    ("pick", "pick", "Choose a category interactively"),
    ("stats", "stats [file] [from to]", "Category totals from a records file"),
    ("version", "version", "Show build information"),
    ("exit", "exit", "Leave the shell"),
];

/// Shell state. The shell plays the hosting form: it owns the stored value
/// and reflects every emission back to the selector.
pub(crate) struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    config: Config,
    config_manager: ConfigManager,
    selector: CategorySelector,
    value: String,
}

impl ShellContext {
    pub(crate) fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::from_app_dir()?;
        let mut config = config_manager.load()?;
        if let Some(path) = env::var_os("SPEND_TRACKER_TAXONOMY") {
            config.taxonomy_path = Some(PathBuf::from(path));
        }
        output::set_preferences(output::OutputPreferences {
            plain: mode == CliMode::Script || !config.ui_color_enabled,
        });

        let taxonomy = config.resolve_taxonomy()?;
        let selector = CategorySelector::new(taxonomy, config.default_kind);
        Ok(Self {
            mode,
            running: true,
            config,
            config_manager,
            selector,
            value: String::new(),
        })
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, ..)| *name).collect()
    }

    pub(crate) fn prompt(&self) -> String {
        format!("spend [{}]> ", self.selector.kind())
    }

    pub(crate) fn report_error(&self, err: CliError) {
        output::error(err);
    }

    pub(crate) fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CliError> {
        trace!(command, ?args, "dispatching command");
        let rest = args.join(" ");
        match command {
            "help" => self.help(),
            "kind" => self.kind(args.first().copied())?,
            "categories" => self.categories(),
            "select" => self.select(&rest)?,
            "deselect" => {
                let emission = self.selector.deselect_category();
                self.apply(emission);
            }
            "sub" => self.sub(&rest)?,
            "unsub" => match self.selector.deselect_subcategory() {
                Some(emission) => self.apply(emission),
                None => output::warning("No category selected."),
            },
            "text" => match self.selector.input_text(&rest) {
                Some(emission) => self.apply(emission),
                None => output::warning("No free-text field is active."),
            },
            "clear" => {
                let emission = self.selector.clear();
                self.apply(emission);
            }
            "load" => {
                self.value = rest;
                self.selector.sync(&self.value, ValueSource::External);
                output::info(format!("Loaded \"{}\".", self.value));
                self.show();
            }
            "observe" => {
                self.value = rest;
                match self.selector.observe(&self.value) {
                    SyncOutcome::Echo | SyncOutcome::Stale => {
                        output::info("Echo of the last emission; selection kept.")
                    }
                    SyncOutcome::Rederived => output::info("External change; selection rebuilt."),
                }
                self.show();
            }
            "reset" => {
                self.value.clear();
                self.selector.reset();
                output::success("Form reset.");
            }
            "show" => self.show(),
            "decode" => self.decode(&rest),
            "pick" => self.pick()?,
            "stats" => self.stats(args)?,
            "version" => output::info(build_info::current().summary()),
            "exit" | "quit" => return Ok(LoopControl::Exit),
            other => {
                return Err(CliError::Input(format!(
                    "unknown command `{}` (try `help`)",
                    other
                )))
            }
        }
        Ok(LoopControl::Continue)
    }

    fn apply(&mut self, emission: Emission) {
        self.value = emission.value.clone();
        let outcome = self
            .selector
            .sync(&self.value, ValueSource::Echo(emission.revision));
        debug!(?outcome, revision = emission.revision.get(), "host stored emission");
        output::info(format!(
            "value = \"{}\" (rev {})",
            emission.value,
            emission.revision.get()
        ));
        if self.value.is_empty() {
            output::warning(REQUIRED_MESSAGE);
        }
    }

    fn help(&self) {
        output::section("Commands");
        for (_, usage, description) in COMMANDS {
            output::line(format!("  {:<26} {}", usage, description));
        }
    }

    fn kind(&mut self, arg: Option<&str>) -> Result<(), CliError> {
        let Some(raw) = arg else {
            output::info(format!("Kind: {}", self.selector.kind()));
            return Ok(());
        };
        let kind: TransactionKind = raw.parse()?;
        let changed = self.selector.set_kind(kind);
        output::success(format!("Kind set to {}.", kind));
        if let Some(emission) = changed {
            self.apply(emission);
        }
        self.show();
        Ok(())
    }

    fn categories(&self) {
        let kind = self.selector.kind();
        let taxonomy = self.selector.taxonomy();
        output::section(format!("Categories ({})", kind));
        for def in taxonomy.categories(kind) {
            output::line(format!("  {} {}", taxonomy.icon(kind, &def.name), def.name));
            if def.has_subcategories() {
                output::line(format!("      > {}", def.subcategories.join(", ")));
            }
        }
    }

    fn select(&mut self, name: &str) -> Result<(), CliError> {
        if name.trim().is_empty() {
            return Err(CliError::Input("usage: select <category>".into()));
        }
        let kind = self.selector.kind();
        let taxonomy = Arc::clone(self.selector.taxonomy());
        if !taxonomy.has_category(kind, name) {
            if let Some(suggestion) = taxonomy.suggest(kind, name) {
                output::warning(format!(
                    "Unknown category `{}`; did you mean `{}`?",
                    name, suggestion
                ));
                return Ok(());
            }
            output::info(format!("`{}` is not in the taxonomy; kept as free text.", name));
        }
        let emission = self.selector.select_category(name);
        self.apply(emission);
        Ok(())
    }

    fn sub(&mut self, name: &str) -> Result<(), CliError> {
        if name.trim().is_empty() {
            return Err(CliError::Input("usage: sub <subcategory|other>".into()));
        }
        match self.selector.select_subcategory(name) {
            Some(emission) => self.apply(emission),
            None => output::warning("Select a category first."),
        }
        Ok(())
    }

    fn show(&self) {
        let parsed = self.selector.parsed();
        output::section("Selection");
        output::line(format!("  Kind:        {}", self.selector.kind()));
        output::line(format!("  Phase:       {}", self.selector.phase()));
        output::line(format!("  Category:    {}", or_dash(&parsed.category)));
        output::line(format!("  Subcategory: {}", or_dash(&parsed.subcategory)));
        output::line(format!("  Text:        {}", or_dash(&parsed.custom_text)));
        output::line(format!("  Value:       \"{}\"", self.value));
        let options = self.selector.subcategory_options();
        if self.selector.shows_subcategory_picker() {
            output::line(format!("  Options:     {}", options.join(", ")));
        }
        if self.value.is_empty() {
            output::warning(REQUIRED_MESSAGE);
        }
    }

    fn decode(&self, value: &str) {
        let parsed = codec::decode(self.selector.taxonomy(), self.selector.kind(), value);
        output::line(format!(
            "category=\"{}\" subcategory=\"{}\" text=\"{}\"",
            parsed.category, parsed.subcategory, parsed.custom_text
        ));
    }

    fn pick(&mut self) -> Result<(), CliError> {
        if self.mode == CliMode::Script {
            output::warning("`pick` needs an interactive terminal.");
            return Ok(());
        }
        let theme = ColorfulTheme::default();
        let kind = self.selector.kind();
        let taxonomy = Arc::clone(self.selector.taxonomy());
        let categories = taxonomy.categories(kind);
        let labels: Vec<String> = categories
            .iter()
            .map(|def| format!("{} {}", taxonomy.icon(kind, &def.name), def.name))
            .collect();
        let index = Select::with_theme(&theme)
            .with_prompt("Category")
            .items(&labels)
            .default(0)
            .interact()?;
        let name = categories[index].name.clone();
        let emission = self.selector.select_category(&name);
        self.apply(emission);

        if Taxonomy::is_other(&name) {
            let text = prompt_text(&theme, "Describe the category")?;
            if let Some(emission) = self.selector.input_text(&text) {
                self.apply(emission);
            }
            return Ok(());
        }

        if self.selector.shows_subcategory_picker() {
            let options: Vec<String> = self
                .selector
                .subcategory_options()
                .into_iter()
                .map(str::to_string)
                .collect();
            let index = Select::with_theme(&theme)
                .with_prompt("Subcategory")
                .items(&options)
                .default(0)
                .interact()?;
            if let Some(emission) = self.selector.select_subcategory(&options[index]) {
                self.apply(emission);
            }
            if options[index] == OTHER_SUBCATEGORY {
                let text = prompt_text(&theme, "Describe the subcategory")?;
                if let Some(emission) = self.selector.input_text(&text) {
                    self.apply(emission);
                }
            }
        }
        Ok(())
    }

    fn stats(&mut self, args: &[&str]) -> Result<(), CliError> {
        let (path, dates) = match args {
            [] => (None, &args[..0]),
            [path, rest @ ..] => (Some(PathBuf::from(path)), rest),
        };
        let path = match path.or_else(|| self.config.last_stats_file.clone()) {
            Some(path) => path,
            None => return Err(CliError::Input("usage: stats <file> [from to]".into())),
        };
        let range = match dates {
            [] => None,
            [from, to] => Some(DateRange::new(parse_date(from)?, parse_date(to)?)?),
            _ => {
                return Err(CliError::Input(
                    "stats takes both a start and an end date".into(),
                ))
            }
        };

        let records = stats::load_records(&path)?;
        let taxonomy = Arc::clone(self.selector.taxonomy());
        let kind = self.selector.kind();

        let heading = match range {
            Some(range) => format!("Statistics {}", range),
            None => "Statistics (all dates)".to_string(),
        };
        output::section(heading);
        let totals = stats::period_totals(&records, range);
        output::line(format!(
            "  Income {:.2}  Expense {:.2}  Net {:.2}",
            totals.income, totals.expense, totals.net
        ));

        let breakdown = stats::summarize_by_category(&taxonomy, &records, kind, range);
        if breakdown.is_empty() {
            output::info(format!("No {} records in range.", kind));
        }
        for total in &breakdown {
            output::line(format!(
                "  {} {:<16} {:>12.2}  {:>5.1}%  ({} records)",
                total.icon,
                total.category,
                total.total,
                total.share * 100.0,
                total.count
            ));
            for sub in &total.subcategories {
                output::line(format!("      {:<16} {:>12.2}", sub.name, sub.total));
            }
        }

        if self.config.last_stats_file.as_ref() != Some(&path) {
            self.config.last_stats_file = Some(path);
            self.config_manager.save(&self.config)?;
        }
        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| CliError::Input(format!("invalid date `{}`: {}", raw, err)))
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str) -> Result<String, CliError> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_usage() {
        for (name, usage, description) in COMMANDS {
            assert!(usage.starts_with(name));
            assert!(!description.is_empty());
        }
    }

    #[test]
    fn dates_parse_iso() {
        assert!(parse_date("2024-03-01").is_ok());
        assert!(parse_date("01/03/2024").is_err());
    }
}
