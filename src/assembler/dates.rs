//! Localized month names for document dates

use chrono::{Datelike, NaiveDate};

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_FR: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août", "Septembre",
    "Octobre", "Novembre", "Décembre",
];
const MONTHS_ES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto", "Septiembre",
    "Octubre", "Noviembre", "Diciembre",
];

fn months(language: &str) -> &'static [&'static str; 12] {
    match language {
        "fr" => &MONTHS_FR,
        "es" => &MONTHS_ES,
        _ => &MONTHS_EN,
    }
}

/// "January 15, 2023" / "15 Janvier 2023" / "15 de Enero de 2023", or month and year only
pub fn format_date(date: NaiveDate, language: &str, include_day: bool) -> String {
    let month = months(language)[date.month0() as usize];
    let year = date.year();
    let day = date.day();

    if !include_day {
        return format!("{} {}", month, year);
    }
    match language {
        "fr" => format!("{} {} {}", day, month, year),
        "es" => format!("{} de {} de {}", day, month, year),
        _ => format!("{} {}, {}", month, day, year),
    }
}

/// Format a `YYYY-MM-DD` string; anything unparseable is returned as given
pub fn translate_iso(iso: &str, language: &str, include_day: bool) -> String {
    match NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d") {
        Ok(date) => format_date(date, language, include_day),
        Err(_) => iso.to_string(),
    }
}

pub fn date_range(start: &str, end: &str, language: &str) -> String {
    let start = translate_iso(start, language, false);
    if end.trim().is_empty() {
        return start;
    }
    format!("{} – {}", start, translate_iso(end, language, false))
}
