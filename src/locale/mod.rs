use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::warn;

static LOCALE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/locale");

type Table = HashMap<String, String>;

/// UI language
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
    Ko,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Ja, Locale::En, Locale::Ko];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
            Locale::Ko => "ko",
        }
    }

    /// Language switcher order: ja, en, ko, then back to ja
    pub fn next(self) -> Self {
        match self {
            Locale::Ja => Locale::En,
            Locale::En => Locale::Ko,
            Locale::Ko => Locale::Ja,
        }
    }

    /// Key of this language's display name
    pub fn name_key(self) -> &'static str {
        match self {
            Locale::Ja => "languageJapanese",
            Locale::En => "languageEnglish",
            Locale::Ko => "languageKorean",
        }
    }

    /// Look up a translation; unknown keys come back unchanged
    pub fn t<'a>(self, key: &'a str) -> &'a str {
        table(self).get(key).map(String::as_str).unwrap_or(key)
    }

    fn index(self) -> usize {
        match self {
            Locale::Ja => 0,
            Locale::En => 1,
            Locale::Ko => 2,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

fn table(locale: Locale) -> &'static Table {
    static TABLES: OnceLock<[Table; 3]> = OnceLock::new();
    let tables = TABLES.get_or_init(|| Locale::ALL.map(load_table));
    &tables[locale.index()]
}

fn load_table(locale: Locale) -> Table {
    let file_name = format!("{}.json", locale.code());
    let Some(contents) = LOCALE_DIR
        .get_file(&file_name)
        .and_then(|f| f.contents_utf8())
    else {
        warn!(file = %file_name, "translation table missing");
        return Table::new();
    };

    serde_json::from_str(contents).unwrap_or_else(|e| {
        warn!(file = %file_name, error = %e, "translation table unreadable");
        Table::new()
    })
}

/// Human duration with only the non-zero units, e.g. `1h 30m 15s`.
/// Zero seconds renders as an empty string.
pub fn format_duration(seconds: u64, locale: Locale) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    [(hours, "hour"), (minutes, "minute"), (secs, "second")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, locale.t(unit)))
        .join(" ")
}
