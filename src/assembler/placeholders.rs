//! `{NAME}` and `<!-- NAME -->` substitution

use crate::error::{Result, TailorError};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Replace each placeholder, case-insensitive and tolerant of inner
/// whitespace. Values are inserted verbatim; escape them first if needed.
///
/// Substitution is a single pass over the template, so a value that itself
/// contains `{SKILLS}` is never expanded again.
pub fn replace_placeholders(template: &str, replacements: &[(String, String)]) -> Result<String> {
    let values: HashMap<String, &str> = replacements
        .iter()
        .map(|(name, value)| (placeholder_key(name), value.as_str()))
        .collect();

    let re = Regex::new(r"(?s)<!--\s*(.*?)\s*-->|\{\s*([^{}]*?)\s*\}")
        .map_err(|e| TailorError::Rendering(format!("bad placeholder pattern: {}", e)))?;

    let result = re.replace_all(template, |caps: &Captures| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        match values.get(&placeholder_key(name)) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    });

    Ok(result.into_owned())
}

fn placeholder_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Placeholders still present after substitution
pub fn unresolved(document: &str) -> Vec<String> {
    match Regex::new(r"\{\s*([A-Z][A-Z0-9 _]*[A-Z0-9])\s*\}") {
        Ok(re) => re
            .captures_iter(document)
            .map(|c| c[1].to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
