//! Command-line front end over [`WeekManager`].

pub mod output;
pub mod render;

use std::{env, path::PathBuf, thread, time::Duration};

use chrono::{DateTime, Locale, NaiveDate, Weekday};
use dialoguer::{theme::ColorfulTheme, Confirm};
use thiserror::Error;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::WeekManager,
    errors::BudgetError,
    ledger::{EntryDraft, EntryKind},
    storage::JsonFileStorage,
    time::{Clock, FixedClock, SystemClock, WeekKey},
    utils::{build_info, paths},
};

/// Pins the clock to an RFC 3339 timestamp, for scripted runs.
pub const NOW_ENV: &str = "FINANZ_NOW";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

const USAGE: &str = "Usage: finanz_cli <command>\n\
Commands:\n  \
status\n  \
list\n  \
add-income <amount> <day> [description...]\n  \
add-expense <amount> <day> <description...>\n  \
delete <income|expense> <id>\n  \
finalize [--yes] [comment...]\n  \
history\n  \
watch [--ticks N]\n  \
config [set <key> <value>]\n  \
version\n\
<day> is mon..fri (or lunes..viernes) or a YYYY-MM-DD date in the current week.";

/// Runs the command given on the process command line.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    run(&args)
}

pub fn run(args: &[String]) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(CliError::Usage(USAGE.into()));
    };
    match command.as_str() {
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        "version" | "--version" => {
            print_version();
            Ok(())
        }
        _ => {
            let mut session = Session::open()?;
            session.dispatch(command, rest)
        }
    }
}

struct Session {
    manager: WeekManager,
    config: Config,
    config_manager: ConfigManager,
    locale: Locale,
}

impl Session {
    fn open() -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        let config_manager = ConfigManager::with_base_dir(&base)?;
        let config = config_manager.load()?;
        let storage = JsonFileStorage::new(&config.resolve_data_dir())?;
        let manager = WeekManager::open(Box::new(storage), clock_from_env()?);
        let locale = render::parse_locale(&config.locale).unwrap_or_else(|| {
            tracing::warn!(locale = %config.locale, "unknown locale, formatting dates in en-US");
            render::DEFAULT_LOCALE
        });
        Ok(Self {
            manager,
            config,
            config_manager,
            locale,
        })
    }

    fn dispatch(&mut self, command: &str, args: &[String]) -> Result<(), CliError> {
        match command {
            "status" => {
                self.print_status();
                Ok(())
            }
            "list" => {
                self.print_lists();
                Ok(())
            }
            "add-income" => self.add(EntryKind::Income, args),
            "add-expense" => self.add(EntryKind::Expense, args),
            "delete" => self.delete(args),
            "finalize" => self.finalize(args),
            "history" => {
                self.print_history();
                Ok(())
            }
            "watch" => self.watch(args),
            "config" => self.config(args),
            other => Err(CliError::Usage(format!("unknown command `{other}`\n{USAGE}"))),
        }
    }

    fn symbol(&self) -> &str {
        &self.config.currency_symbol
    }

    fn print_status(&self) {
        let window = self.manager.current_week();
        output::section(format!("Week {}", render::week_range(&window, self.locale)));
        output::line(render::totals(self.symbol(), &self.manager.totals()));
        let (kind, text) = render::status(
            self.manager.report_status(),
            self.manager.countdown(),
            self.locale,
        );
        output::print(kind, text);
    }

    fn print_lists(&self) {
        for (kind, title) in [(EntryKind::Income, "Income"), (EntryKind::Expense, "Expenses")] {
            output::section(title);
            let entries = self.manager.entries(kind);
            if entries.is_empty() {
                output::line(format!("No {kind} recorded this week"));
            }
            for entry in entries {
                output::line(render::entry(self.symbol(), kind, entry, self.locale));
            }
        }
    }

    fn print_history(&self) {
        output::section("Report history");
        let reports = self.manager.history();
        if reports.is_empty() {
            output::line("No previous reports");
        }
        for report in reports {
            for line in render::report(self.symbol(), report, self.locale) {
                output::line(line);
            }
        }
    }

    fn add(&mut self, kind: EntryKind, args: &[String]) -> Result<(), CliError> {
        let (Some(raw_amount), Some(raw_day)) = (args.first(), args.get(1)) else {
            return Err(CliError::Usage(format!(
                "usage: add-{kind} <amount> <day> [description...]"
            )));
        };
        let week = self.manager.current_week().key;
        let draft = EntryDraft {
            amount: parse_amount(raw_amount)?,
            description: args[2..].join(" "),
            date: Some(parse_day(week, raw_day)?),
        };
        let entry = self.manager.add_entry(kind, &draft)?;
        output::success(format!("Recorded {kind} {}", render::entry(self.symbol(), kind, &entry, self.locale)));
        output::line(render::totals(self.symbol(), &self.manager.totals()));
        Ok(())
    }

    fn delete(&mut self, args: &[String]) -> Result<(), CliError> {
        let (Some(raw_kind), Some(raw_id)) = (args.first(), args.get(1)) else {
            return Err(CliError::Usage("usage: delete <income|expense> <id>".into()));
        };
        let kind: EntryKind = raw_kind.parse()?;
        let id: i64 = raw_id
            .trim_start_matches('#')
            .parse()
            .map_err(|_| CliError::Usage(format!("`{raw_id}` is not an entry id")))?;
        if self.manager.delete_entry(kind, id)? {
            output::success(format!("Deleted {kind} #{id}"));
        } else {
            output::warning(format!("No {kind} #{id} in the current week"));
        }
        Ok(())
    }

    fn finalize(&mut self, args: &[String]) -> Result<(), CliError> {
        let skip_prompt = args.iter().any(|arg| arg == "--yes" || arg == "-y");
        let comment: Vec<&str> = args
            .iter()
            .map(String::as_str)
            .filter(|arg| *arg != "--yes" && *arg != "-y")
            .collect();
        let comment = comment.join(" ");

        if self.config.confirm_finalize && !skip_prompt {
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Finalize the week? This cannot be undone.")
                .default(false)
                .interact()?;
            if !confirmed {
                output::info("Finalize cancelled");
                return Ok(());
            }
        }

        let report = self.manager.finalize(Some(comment.as_str()))?;
        output::success("Weekly report generated and saved");
        for line in render::report(self.symbol(), &report, self.locale) {
            output::line(line);
        }
        Ok(())
    }

    fn watch(&mut self, args: &[String]) -> Result<(), CliError> {
        let ticks = match args {
            [] => None,
            [flag, value] if flag == "--ticks" => Some(
                value
                    .parse::<u64>()
                    .map_err(|_| CliError::Usage(format!("`{value}` is not a tick count")))?,
            ),
            _ => return Err(CliError::Usage("usage: watch [--ticks N]".into())),
        };
        let interval = Duration::from_secs(self.config.status_refresh_secs.max(1));
        let mut tick = 0u64;
        loop {
            self.print_status();
            tick += 1;
            if ticks.is_some_and(|limit| tick >= limit) {
                return Ok(());
            }
            thread::sleep(interval);
        }
    }

    fn config(&mut self, args: &[String]) -> Result<(), CliError> {
        match args {
            [] => {}
            [action, key, value] if action == "set" => {
                apply_setting(&mut self.config, key, value)?;
                self.config_manager.save(&self.config)?;
                self.locale = render::parse_locale(&self.config.locale).unwrap_or(render::DEFAULT_LOCALE);
                output::success(format!("Set {key} = {value}"));
            }
            _ => return Err(CliError::Usage("usage: config [set <key> <value>]".into())),
        }
        output::section("Configuration");
        output::line(format!("config file         : {}", self.config_manager.config_path().display()));
        output::line(format!("data file           : {}", self.manager.storage().location()));
        output::line(format!("currency_symbol     : {}", self.config.currency_symbol));
        output::line(format!("locale              : {}", self.config.locale));
        output::line(format!("status_refresh_secs : {}", self.config.status_refresh_secs));
        output::line(format!("confirm_finalize    : {}", self.config.confirm_finalize));
        Ok(())
    }
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<(), CliError> {
    let invalid = || CliError::Usage(format!("invalid value `{value}` for {key}"));
    match key {
        "currency_symbol" => config.currency_symbol = value.to_string(),
        "locale" => {
            render::parse_locale(value).ok_or_else(invalid)?;
            config.locale = value.to_string();
        }
        "status_refresh_secs" => config.status_refresh_secs = value.parse().map_err(|_| invalid())?,
        "confirm_finalize" => config.confirm_finalize = value.parse().map_err(|_| invalid())?,
        "data_dir" => config.data_dir = Some(PathBuf::from(value)),
        other => return Err(CliError::Usage(format!("unknown setting `{other}`"))),
    }
    Ok(())
}

fn clock_from_env() -> Result<Box<dyn Clock>, CliError> {
    match env::var(NOW_ENV) {
        Ok(raw) => {
            let instant = DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| {
                CliError::Usage(format!("{NOW_ENV} must be an RFC 3339 timestamp, got `{raw}`"))
            })?;
            Ok(Box::new(FixedClock::new(instant)))
        }
        Err(_) => Ok(Box::new(SystemClock)),
    }
}

fn print_version() {
    let meta = build_info::current();
    println!("finanz_cli {}", meta.version);
    println!("  commit  : {}", meta.git_hash);
    println!("  built   : {}", meta.timestamp);
    println!("  target  : {} ({})", meta.target, meta.profile);
}

/// Parses a user-typed amount, accepting a decimal comma.
pub fn parse_amount(raw: &str) -> Result<f64, BudgetError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| BudgetError::validation(format!("`{raw}` is not a number")))
}

/// Resolves a weekday name or an ISO date to a date of `week`.
pub fn parse_day(week: WeekKey, raw: &str) -> Result<NaiveDate, BudgetError> {
    let weekday = match raw.trim().to_lowercase().as_str() {
        "mon" | "monday" | "lun" | "lunes" => Some(Weekday::Mon),
        "tue" | "tuesday" | "mar" | "martes" => Some(Weekday::Tue),
        "wed" | "wednesday" | "mie" | "mié" | "miercoles" | "miércoles" => Some(Weekday::Wed),
        "thu" | "thursday" | "jue" | "jueves" => Some(Weekday::Thu),
        "fri" | "friday" | "vie" | "viernes" => Some(Weekday::Fri),
        _ => None,
    };
    if let Some(date) = weekday.and_then(|day| week.date_of(day)) {
        return Ok(date);
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| BudgetError::validation(format!("`{raw}` is not a weekday or YYYY-MM-DD date")))
}
