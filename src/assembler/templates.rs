//! Built-in HTML templates and on-disk overrides

use crate::error::{Result, TailorError};
use log::info;
use std::path::Path;

pub const CV_TEMPLATE_FILE: &str = "cv_template.html";
pub const COVER_LETTER_TEMPLATE_FILE: &str = "cover_letter_template.html";

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub cv: String,
    pub cover_letter: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            cv: DEFAULT_CV.to_string(),
            cover_letter: DEFAULT_COVER_LETTER.to_string(),
        }
    }
}

impl TemplateSet {
    /// Templates from `dir` when given, the built-in pair otherwise. A
    /// directory missing either file is an error.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };

        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| {
                TailorError::Configuration(format!(
                    "Cannot read template {}: {}",
                    path.display(),
                    e
                ))
            })
        };

        let set = Self {
            cv: read(CV_TEMPLATE_FILE)?,
            cover_letter: read(COVER_LETTER_TEMPLATE_FILE)?,
        };
        info!("Loaded templates from {}", dir.display());
        Ok(set)
    }
}

const DEFAULT_CV: &str = r#"<!DOCTYPE html>
<html lang="{LANG}">
<head>
<meta charset="utf-8">
<title>{NAME} - {JOB TITLE}</title>
<style>
body { font-family: Helvetica, Arial, sans-serif; max-width: 800px; margin: 2em auto; color: #222; }
h1 { margin-bottom: 0; }
h2 { border-bottom: 1px solid #ccc; padding-bottom: 4px; }
.contact, .muted { color: #666; }
</style>
</head>
<body>
<h1>{NAME}</h1>
<p class="subtitle"><strong><!-- JOB TITLE --></strong></p>
<p class="contact">{CONTACT}</p>

<h2>{LABEL SKILLS}</h2>
<p>{SKILLS}</p>

<h2>{LABEL EXPERIENCE}</h2>
{EXPERIENCE}

<h2>{LABEL PROJECTS}</h2>
{PROJECTS}

<h2>{LABEL EDUCATION}</h2>
{EDUCATION}

<h2>{LABEL LANGUAGES}</h2>
<p>{LANGUAGES}</p>
</body>
</html>
"#;

const DEFAULT_COVER_LETTER: &str = r#"<!DOCTYPE html>
<html lang="{LANG}">
<head>
<meta charset="utf-8">
<title>{NAME} - {LABEL COVER LETTER}</title>
<style>
body { font-family: Georgia, serif; max-width: 700px; margin: 2em auto; line-height: 1.5; color: #222; }
.muted { color: #666; }
</style>
</head>
<body>
<p>{NAME}<br>{CONTACT}</p>
<p class="muted">{DATE}</p>
<p>{COMPANY}</p>

<p>{SALUTATION}</p>

<p>{LETTER OPENING}</p>

<p>{LABEL HIGHLIGHTS}</p>
<ul>
<li>{ACHIEVEMENT 1}</li>
<li>{ACHIEVEMENT 2}</li>
<li>{ACHIEVEMENT 3}</li>
</ul>

<p>{LABEL PROJECTS INTRO}</p>
{PROJECTS}

<p>{LETTER CLOSING}</p>

<p>{SIGN OFF}<br>{NAME}</p>
</body>
</html>
"#;
