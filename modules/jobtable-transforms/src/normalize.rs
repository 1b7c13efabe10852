//! `norm.*` derivation. Pure; never mutates `source.*`.

use jobtable_schema::JobRow;
use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn collapse_whitespace(s: &str) -> String {
    whitespace_re().replace_all(s.trim(), " ").to_string()
}

/// Minimal inline tag stripper: no full HTML parser, since job descriptions
/// only ever carry a handful of block/inline tags and entity references.
fn strip_html(s: &str) -> String {
    let no_tags = tag_re().replace_all(s, " ");
    let unescaped = no_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");
    collapse_whitespace(&unescaped)
}

fn strip_punctuation_noise(s: &str) -> String {
    collapse_whitespace(s)
        .chars()
        .filter(|c| !matches!(c, '*' | '|' | '~' | '_'))
        .collect()
}

/// Splits a "City, ST" (or free-text) location into (city, state).
fn split_location(raw: &str) -> (String, String) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (String::new(), String::new());
    }
    if let Some((city, state)) = raw.split_once(',') {
        (city.trim().to_string(), state.trim().to_string())
    } else {
        (raw.to_string(), String::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SalaryUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl SalaryUnit {
    fn as_str(&self) -> &'static str {
        match self {
            SalaryUnit::Hour => "hour",
            SalaryUnit::Day => "day",
            SalaryUnit::Week => "week",
            SalaryUnit::Month => "month",
            SalaryUnit::Year => "year",
        }
    }
}

struct ParsedSalary {
    min: f64,
    max: f64,
    unit: SalaryUnit,
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d,]+(?:\.\d+)?").unwrap())
}

fn parse_salary(raw: &str) -> Option<ParsedSalary> {
    if raw.trim().is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    let unit = if lower.contains("/hr") || lower.contains("per hour") || lower.contains("hourly")
    {
        SalaryUnit::Hour
    } else if lower.contains("/day") || lower.contains("per day") || lower.contains("daily") {
        SalaryUnit::Day
    } else if lower.contains("/week") || lower.contains("per week") || lower.contains("weekly") {
        SalaryUnit::Week
    } else if lower.contains("/month") || lower.contains("per month") || lower.contains("monthly")
    {
        SalaryUnit::Month
    } else {
        SalaryUnit::Year
    };

    let numbers: Vec<f64> = number_re()
        .find_iter(raw)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .collect();

    match numbers.len() {
        0 => None,
        1 => Some(ParsedSalary {
            min: numbers[0],
            max: numbers[0],
            unit,
        }),
        _ => Some(ParsedSalary {
            min: numbers[0].min(numbers[1]),
            max: numbers[0].max(numbers[1]),
            unit,
        }),
    }
}

fn format_display(min: f64, max: f64, unit: SalaryUnit) -> String {
    let fmt = |v: f64| {
        if v.fract() == 0.0 {
            format!("{:.0}", v)
        } else {
            format!("{:.2}", v)
        }
    };
    if (min - max).abs() < f64::EPSILON {
        format!("${} / {}", fmt(min), unit.as_str())
    } else {
        format!("${} - ${} / {}", fmt(min), fmt(max), unit.as_str())
    }
}

/// Populates `norm.*` from `source.*`. Leaves salary fields null if the raw
/// block contains no parseable numbers.
pub fn normalize(row: &mut JobRow) {
    row.norm.title = strip_punctuation_noise(&row.source.title);
    row.norm.company = strip_punctuation_noise(&row.source.company);

    let (city, state) = split_location(&row.source.location_raw);
    row.norm.city = city.clone();
    row.norm.state = state.clone();
    row.norm.location = if state.is_empty() {
        city
    } else {
        format!("{}, {}", row.norm.city, state)
    };

    row.norm.description = strip_html(&row.source.description_raw);

    match parse_salary(&row.source.salary_raw) {
        Some(parsed) => {
            row.norm.salary_min = Some(parsed.min);
            row.norm.salary_max = Some(parsed.max);
            row.norm.salary_unit = parsed.unit.as_str().to_string();
            row.norm.salary_currency = "USD".to_string();
            row.norm.salary_display = format_display(parsed.min, parsed.max, parsed.unit);
        }
        None => {
            row.norm.salary_min = None;
            row.norm.salary_max = None;
            row.norm.salary_unit = String::new();
            row.norm.salary_currency = String::new();
            row.norm.salary_display = String::new();
        }
    }
}
