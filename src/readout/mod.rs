//! Digital time and date readout
//!
//! Formatting is delegated to a [`LocaleFormatter`] so that hosts can
//! plug in their own conventions and tests can assert exact strings.

use std::rc::Rc;

use chrono::Locale;
use tracing::{debug, warn};

use crate::time::Moment;

/// Locale's own 12-hour clock: `09:05:07 AM` under `en_US`
const TIME_PATTERN: &str = "%r";
/// Long-form date in US order: `Monday, January 6, 2025`
const US_DATE_PATTERN: &str = "%A, %B %-d, %Y";
/// Long-form date for languages without an entry in `date_pattern`
const DAY_FIRST_DATE_PATTERN: &str = "%A, %-d %B %Y";

/// Locale-aware formatting capability
pub trait LocaleFormatter {
    /// Time of day on a 12-hour clock with an AM/PM marker
    fn format_time(&self, moment: &Moment) -> String;

    /// Long-form date with weekday, day, month and year
    fn format_date(&self, moment: &Moment) -> String;
}

/// Formatter backed by chrono's localized strftime tables
#[derive(Debug, Clone, Copy)]
pub struct ChronoLocaleFormatter {
    locale: Locale,
    date_pattern: &'static str,
    twelve_hour: bool,
}

impl ChronoLocaleFormatter {
    pub fn new(locale: Locale) -> Self {
        let name = format!("{:?}", locale);
        // Locales without AM/PM markers render the time through en_US
        let twelve_hour = !chrono::DateTime::<chrono::Utc>::default()
            .format_localized("%p", locale)
            .to_string()
            .trim()
            .is_empty();
        if !twelve_hour {
            debug!(locale = %name, "Locale has no AM/PM markers, time uses en_US");
        }
        Self {
            locale,
            date_pattern: date_pattern(&name),
            twelve_hour,
        }
    }

    /// Look a locale up by name (`en_US`, `de_DE.UTF-8`, `fr-FR`)
    pub fn from_name(name: &str) -> Option<Self> {
        parse_locale(name).map(Self::new)
    }

    /// Use the environment's default locale
    ///
    /// Checks `LC_ALL`, `LC_TIME` and `LANG` in that order and falls back
    /// to `en_US` when none of them names a known locale.
    pub fn from_env() -> Self {
        for var in ["LC_ALL", "LC_TIME", "LANG"] {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match parse_locale(&value) {
                Some(locale) => {
                    debug!(variable = var, locale = ?locale, "Using environment locale");
                    return Self::new(locale);
                }
                None => {
                    // "C" and "POSIX" land here too; en_US is the closest match
                    debug!(variable = var, value = %value, "Unrecognized locale, using en_US");
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Default for ChronoLocaleFormatter {
    fn default() -> Self {
        Self::new(Locale::en_US)
    }
}

impl LocaleFormatter for ChronoLocaleFormatter {
    fn format_time(&self, moment: &Moment) -> String {
        let locale = if self.twelve_hour {
            self.locale
        } else {
            Locale::en_US
        };
        moment
            .datetime()
            .format_localized(TIME_PATTERN, locale)
            .to_string()
    }

    fn format_date(&self, moment: &Moment) -> String {
        moment
            .datetime()
            .format_localized(self.date_pattern, self.locale)
            .to_string()
    }
}

/// Long-date word order for a locale name such as `de_DE`
fn date_pattern(name: &str) -> &'static str {
    let language = name.split('_').next().unwrap_or(name);
    match (language, name) {
        (_, "en_US" | "en_PH" | "en_CA") => US_DATE_PATTERN,
        ("de", _) => "%A, %-d. %B %Y",
        ("fr" | "it" | "nl", _) => "%A %-d %B %Y",
        ("es", _) => "%A, %-d de %B de %Y",
        ("pt", _) => "%A, %-d de %B de %Y",
        _ => DAY_FIRST_DATE_PATTERN,
    }
}

fn parse_locale(name: &str) -> Option<Locale> {
    // Strip codeset and modifier: de_DE.UTF-8@euro -> de_DE
    let base = name.split(['.', '@']).next().unwrap_or(name).replace('-', "_");
    if base.is_empty() {
        return None;
    }
    Locale::try_from(base.as_str()).ok()
}

/// Both readout lines for one moment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Readout {
    pub time: String,
    pub date: String,
}

/// Formats moments into the two readout lines
#[derive(Clone)]
pub struct DigitalReadout {
    formatter: Rc<dyn LocaleFormatter>,
}

impl DigitalReadout {
    pub fn new(formatter: Rc<dyn LocaleFormatter>) -> Self {
        Self { formatter }
    }

    pub fn format(&self, moment: &Moment) -> Readout {
        let readout = Readout {
            time: self.formatter.format_time(moment),
            date: self.formatter.format_date(moment),
        };
        if readout.time.is_empty() {
            warn!("Locale formatter produced an empty time string");
        }
        readout
    }
}

impl Default for DigitalReadout {
    fn default() -> Self {
        Self::new(Rc::new(ChronoLocaleFormatter::default()))
    }
}
