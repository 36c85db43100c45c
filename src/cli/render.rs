//! Plain-text rendering of ledger state for the terminal.

use chrono::{Locale, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    core::services::{Countdown, ReportStatus, WeekTotals},
    ledger::{Entry, EntryKind, ReportRecord},
    time::WeekWindow,
};

use super::output::MessageKind;

/// Locale used when the configured tag is not recognised.
pub const DEFAULT_LOCALE: Locale = Locale::en_US;

/// Resolves a tag such as `es-ES` or `en_GB` to a date formatting locale.
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let locale = match tag.trim().replace('-', "_").as_str() {
        "en" | "en_US" => Locale::en_US,
        "en_GB" => Locale::en_GB,
        "es" | "es_ES" => Locale::es_ES,
        "es_MX" => Locale::es_MX,
        "es_AR" => Locale::es_AR,
        "fr" | "fr_FR" => Locale::fr_FR,
        "de" | "de_DE" => Locale::de_DE,
        "it" | "it_IT" => Locale::it_IT,
        "pt" | "pt_PT" => Locale::pt_PT,
        "pt_BR" => Locale::pt_BR,
        "nl" | "nl_NL" => Locale::nl_NL,
        _ => return None,
    };
    Some(locale)
}

fn localized(instant: NaiveDateTime, pattern: &str, locale: Locale) -> String {
    instant
        .and_utc()
        .format_localized(pattern, locale)
        .to_string()
}

fn localized_date(date: NaiveDate, pattern: &str, locale: Locale) -> String {
    localized(date.and_time(NaiveTime::MIN), pattern, locale)
}

pub fn amount(symbol: &str, value: f64) -> String {
    if value < 0.0 {
        format!("-{symbol}{:.2}", -value)
    } else {
        format!("{symbol}{value:.2}")
    }
}

/// `1 Jan - 5 Jan 2024`
pub fn week_range(window: &WeekWindow, locale: Locale) -> String {
    format!(
        "{} - {}",
        localized(window.start, "%-d %b", locale),
        localized(window.end, "%-d %b %Y", locale)
    )
}

pub fn totals(symbol: &str, totals: &WeekTotals) -> String {
    format!(
        "Income {} | Expenses {} | Balance {}",
        amount(symbol, totals.income),
        amount(symbol, totals.expense),
        amount(symbol, totals.balance)
    )
}

pub fn entry(symbol: &str, kind: EntryKind, entry: &Entry, locale: Locale) -> String {
    let sign = match kind {
        EntryKind::Income => '+',
        EntryKind::Expense => '-',
    };
    format!(
        "{sign}{}  {}  ({})  #{}",
        amount(symbol, entry.amount),
        entry.description,
        localized_date(entry.date, "%A %Y-%m-%d", locale),
        entry.id
    )
}

pub fn status(status: ReportStatus, countdown: Countdown, locale: Locale) -> (MessageKind, String) {
    match status {
        ReportStatus::Available => (MessageKind::Success, "Weekly report available".into()),
        ReportStatus::Finalized => (
            MessageKind::Warning,
            "This week's report has already been generated".into(),
        ),
        ReportStatus::Locked { opens_at } => (
            MessageKind::Info,
            format!(
                "Report available in: {countdown} ({})",
                localized(opens_at, "%A %-d %b %H:%M", locale)
            ),
        ),
    }
}

pub fn report(symbol: &str, report: &ReportRecord, locale: Locale) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Week {}  (finalized {})",
            report.week_key(),
            report.finalized_at().format_localized("%-d %B %Y", locale)
        ),
        format!(
            "Income {} | Expenses {} | Balance {}",
            amount(symbol, report.total_income()),
            amount(symbol, report.total_expense()),
            amount(symbol, report.balance())
        ),
    ];
    if !report.comment().is_empty() {
        lines.push(format!("\"{}\"", report.comment()));
    }
    lines
}
