use super::types::ContentSection;
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    fn short_month(self, month: u32) -> &'static str {
        match self {
            Locale::PtBr => match month {
                1 => "jan",
                2 => "fev",
                3 => "mar",
                4 => "abr",
                5 => "mai",
                6 => "jun",
                7 => "jul",
                8 => "ago",
                9 => "set",
                10 => "out",
                11 => "nov",
                12 => "dez",
                _ => "",
            },
            Locale::En => match month {
                1 => "Jan",
                2 => "Feb",
                3 => "Mar",
                4 => "Apr",
                5 => "May",
                6 => "Jun",
                7 => "Jul",
                8 => "Aug",
                9 => "Sep",
                10 => "Oct",
                11 => "Nov",
                12 => "Dec",
                _ => "",
            },
        }
    }

    pub fn html_lang(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }
}

/// CMS timestamps look like `2021-03-15T19:25:28+0000`; RFC 3339 is accepted too.
pub fn parse_cms_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// `dd MMM yyyy` in the given locale, in the timestamp's own offset.
/// Missing or unparseable dates format as an empty string.
pub fn format_publication_date(raw: Option<&str>, locale: Locale) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    match parse_cms_date(raw) {
        Some(date) => format!(
            "{:02} {} {}",
            date.day(),
            locale.short_month(date.month()),
            date.year()
        ),
        None => {
            warn!("Unparseable publication date: {}", raw);
            String::new()
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read every heading and body, rounded up.
pub fn reading_time(sections: &[ContentSection], words_per_minute: u32) -> u32 {
    let words: usize = sections
        .iter()
        .map(|section| word_count(&section.heading) + word_count(&section.body_text))
        .sum();

    minutes_for_words(words, words_per_minute)
}

pub fn minutes_for_words(words: usize, words_per_minute: u32) -> u32 {
    let minutes = words.div_ceil(words_per_minute.max(1) as usize);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
