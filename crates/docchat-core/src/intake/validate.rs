//! Field validation for the scheduling intake

use crate::error::{DocChatError, Result};
use chrono::format::{self, Parsed, ParseErrorKind, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate};
use lazy_static::lazy_static;
use phonenumber::country;
use phonenumber::Mode;
use regex::Regex;

/// Region phone numbers are interpreted in when they carry no country code
pub const DEFAULT_PHONE_REGION: country::Id = country::Id::US;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("Invalid regex");
    static ref ORDINAL_RE: Regex =
        Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("Invalid regex");
}

/// Absolute date layouts tried before natural-language parsing
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A %B %d %Y",
    "%a %b %d %Y",
];

/// Names are taken as given, minus surrounding whitespace
pub fn validate_name(input: &str) -> Result<String> {
    Ok(input.trim().to_string())
}

pub fn validate_email(input: &str) -> Result<String> {
    let email = input.trim();
    if EMAIL_RE.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(DocChatError::validation(
            "email",
            format!("'{}' is not a valid email address", email),
        ))
    }
}

/// Parse a phone number for `region` and return it in E.164 form
pub fn validate_phone(input: &str, region: country::Id) -> Result<String> {
    let invalid = || {
        DocChatError::validation(
            "phone",
            format!("'{}' is not a valid phone number", input.trim()),
        )
    };

    let number = phonenumber::parse(Some(region), input.trim()).map_err(|_| invalid())?;
    if !phonenumber::is_valid(&number) {
        return Err(invalid());
    }
    Ok(number.format().mode(Mode::E164).to_string())
}

/// Longest run of words considered as a single date phrase
const MAX_DATE_WORDS: usize = 6;

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Words that may appear in a natural-language date besides month and weekday names
const RELATIVE_WORDS: &[&str] = &[
    "today", "tomorrow", "next", "this", "last", "in", "ago", "day", "days", "week", "weeks",
    "month", "months", "year", "years", "of", "the", "at", "am", "pm", "noon", "midnight",
    "morning", "afternoon", "evening",
];

/// Words that are a date on their own
const STANDALONE_WORDS: &[&str] = &["today", "tomorrow"];

/// Result of matching one run of words against the known date shapes
enum PhraseDate {
    Valid(NaiveDate),
    /// Shaped like a date but not a real calendar day, e.g. Feb 30
    Impossible,
    NoMatch,
}

/// Extract a calendar date from free text such as "next Friday",
/// "March 3rd, 2025", or "how about 2025-03-03?".
///
/// Relative expressions resolve against `now`. When the whole input does
/// not parse, shorter runs of words (up to six) are tried so a date can be
/// picked out of a sentence. Input holding a date-shaped phrase that is not
/// a real calendar day is rejected outright.
pub fn parse_appointment_date(input: &str, now: DateTime<Local>) -> Result<NaiveDate> {
    let normalized = normalize_date_text(input);
    let words: Vec<&str> = normalized.split_whitespace().collect();

    for len in (1..=words.len().min(MAX_DATE_WORDS)).rev() {
        for window in words.windows(len) {
            match parse_date_phrase(window, now) {
                PhraseDate::Valid(date) => return Ok(date),
                PhraseDate::Impossible => {
                    return Err(DocChatError::validation(
                        "date",
                        format!("'{}' is not a real calendar date", window.join(" ")),
                    ))
                }
                PhraseDate::NoMatch => {}
            }
        }
    }

    Err(DocChatError::validation(
        "date",
        format!("could not find a date in '{}'", input.trim()),
    ))
}

fn parse_date_phrase(words: &[&str], now: DateTime<Local>) -> PhraseDate {
    let phrase = words.join(" ");

    match parse_date_layout(&phrase) {
        PhraseDate::NoMatch => {}
        matched => return matched,
    }

    // Bare numbers are times or noise, never dates on their own
    if phrase.chars().all(|c| c.is_ascii_digit()) {
        return PhraseDate::NoMatch;
    }
    if let [word] = words {
        if !is_standalone_date_word(word) {
            return PhraseDate::NoMatch;
        }
    }
    // The natural-language parser accepts name prefixes ("maybe" reads as May),
    // so every word must be spelled out in full
    if !words.iter().all(|word| is_date_word(word)) {
        return PhraseDate::NoMatch;
    }

    match chrono_english::parse_date_string(&phrase, now, chrono_english::Dialect::Us) {
        Ok(dt) => PhraseDate::Valid(dt.date_naive()),
        Err(_) => PhraseDate::NoMatch,
    }
}

/// Match the absolute layouts. A phrase one layout accepts wins over a
/// phrase another layout finds out of range.
fn parse_date_layout(phrase: &str) -> PhraseDate {
    let mut impossible = false;

    for fmt in DATE_FORMATS {
        let mut parsed = Parsed::new();
        match format::parse(&mut parsed, phrase, StrftimeItems::new(fmt)) {
            Ok(()) => match parsed.to_naive_date() {
                Ok(date) => return PhraseDate::Valid(date),
                Err(_) => impossible = true,
            },
            Err(e) if matches!(e.kind(), ParseErrorKind::OutOfRange | ParseErrorKind::Impossible) => {
                impossible = true
            }
            Err(_) => {}
        }
    }

    if impossible {
        PhraseDate::Impossible
    } else {
        PhraseDate::NoMatch
    }
}

fn is_standalone_date_word(word: &str) -> bool {
    MONTHS.contains(&word) || WEEKDAYS.contains(&word) || STANDALONE_WORDS.contains(&word)
}

fn is_date_word(word: &str) -> bool {
    if word.chars().any(|c| c.is_ascii_digit()) {
        return word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '/' | '-' | '.' | ':'));
    }
    MONTHS.iter().any(|m| *m == word || (word.len() == 3 && m.starts_with(word)))
        || WEEKDAYS.iter().any(|d| *d == word || (word.len() == 3 && d.starts_with(word)))
        || RELATIVE_WORDS.contains(&word)
}

fn normalize_date_text(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let without_ordinals = ORDINAL_RE.replace_all(&lowered, "$1");
    without_ordinals
        .chars()
        .map(|c| match c {
            ',' | '?' | '!' | ';' => ' ',
            other => other,
        })
        .collect::<String>()
        .trim_end_matches('.')
        .to_string()
}

/// Date rendered the way intake records store it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
