//! Inclusive job titles reduced to the candidate's form
//!
//! Handles `Développeur(se)`, `Développeur/euse`, `Développeur·euse` and
//! `Développeur/Développeuse`. Other slashes (`CI/CD`, `Frontend/Backend`)
//! are left alone.

use crate::profile::Gender;
use regex::{Captures, Regex};

const SUFFIXES: &[&str] = &["euse", "eure", "rice", "se", "e", "a"];

fn marker_pattern() -> Option<Regex> {
    Regex::new(r"(\p{L}+)(?:\(([^)]+)\)|[/·](\p{L}+))").ok()
}

fn parts<'c>(caps: &'c Captures<'_>) -> (&'c str, &'c str) {
    let base = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str().trim());
    (base, suffix)
}

/// True when the title carries at least one feminine marker
pub fn is_gendered(title: &str) -> bool {
    let Some(pattern) = marker_pattern() else {
        return false;
    };
    let found = pattern.captures_iter(title).any(|caps| {
        let (base, suffix) = parts(&caps);
        feminine_of(base, suffix).is_some()
    });
    found
}

pub fn gendered_title(title: &str, gender: Gender) -> String {
    if !is_gendered(title) {
        return title.to_string();
    }
    let Some(pattern) = marker_pattern() else {
        return title.to_string();
    };

    let replaced = pattern.replace_all(title, |caps: &Captures| {
        let (base, suffix) = parts(caps);
        match (feminine_of(base, suffix), gender) {
            (Some(_), Gender::Male) => base.to_string(),
            (Some(feminine), Gender::Female) => feminine,
            (None, _) => caps[0].to_string(),
        }
    });
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Feminine word for `base` + `suffix`, or None when the suffix is not a
/// gender marker at all
fn feminine_of(base: &str, suffix: &str) -> Option<String> {
    let lower_suffix = suffix.to_lowercase();
    if SUFFIXES.contains(&lower_suffix.as_str()) {
        return Some(join_suffix(base, suffix));
    }
    if shares_stem(base, suffix) {
        return Some(suffix.to_string());
    }
    None
}

/// `Serveur` and `Serveuse` differ only in their last few letters
fn shares_stem(base: &str, word: &str) -> bool {
    let base: Vec<char> = base.to_lowercase().chars().collect();
    let word: Vec<char> = word.to_lowercase().chars().collect();
    if base == word || base.len() < 4 {
        return false;
    }
    let common = base.iter().zip(&word).take_while(|(a, b)| a == b).count();
    common >= 3 && common + 3 >= base.len() && word.len() + 1 >= base.len()
}

/// Join a base word with a feminine suffix: Développeur + euse = Développeuse
fn join_suffix(base: &str, suffix: &str) -> String {
    match suffix.to_lowercase().as_str() {
        "euse" | "eure" if base.ends_with("eur") => {
            format!("{}{}", &base[..base.len() - 3], suffix)
        }
        "rice" if base.ends_with("teur") => {
            format!("{}{}", &base[..base.len() - 3], suffix)
        }
        "se" if base.ends_with('r') => format!("{}{}", &base[..base.len() - 1], suffix),
        _ => format!("{}{}", base, suffix),
    }
}
