//! Report which environment variables are set.
//!
//! ```bash
//! lj-cli check-env
//! ```
//!
//! Values are masked: only the first few characters are shown.

use super::CliError;

/// Characters of a value shown in the report.
const PREVIEW_CHARS: usize = 4;

/// Variables the storefront cannot start without. The first name of each
/// group is reported; any name in the group satisfies it.
pub const REQUIRED: &[&[&str]] = &[
    &["STOREFRONT_DATABASE_URL", "DATABASE_URL"],
    &["STOREFRONT_SESSION_SECRET"],
    &["GOOGLE_API_KEY"],
];

pub const OPTIONAL: &[&str] = &[
    "GROQ_API_KEY",
    "CEREBRAS_API_KEY",
    "OPENROUTER_API_KEY",
    "OAUTH_CLIENT_ID",
    "OAUTH_CLIENT_SECRET",
    "SENTRY_DSN",
    "PAYMENT_MOCK_DELAY_SCALE",
];

#[derive(Debug, PartialEq, Eq)]
pub struct EnvEntry {
    pub name: &'static str,
    pub preview: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EnvReport {
    pub required: Vec<EnvEntry>,
    pub optional: Vec<EnvEntry>,
}

impl EnvReport {
    /// Build a report from any variable source.
    pub fn collect(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let required = REQUIRED
            .iter()
            .filter_map(|group| {
                let name = *group.first()?;
                let preview = group.iter().find_map(|n| value(n)).map(|v| mask(&v));
                Some(EnvEntry { name, preview })
            })
            .collect();
        let optional = OPTIONAL
            .iter()
            .map(|&name| EnvEntry {
                name,
                preview: value(name).map(|v| mask(&v)),
            })
            .collect();

        Self { required, optional }
    }

    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        self.required
            .iter()
            .filter(|e| e.preview.is_none())
            .map(|e| e.name)
            .collect()
    }
}

/// `abcdefgh` becomes `abcd...`; short values are fully hidden.
#[must_use]
pub fn mask(value: &str) -> String {
    if value.chars().count() <= PREVIEW_CHARS * 2 {
        return "****".to_owned();
    }
    let head: String = value.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Print the report.
///
/// # Errors
///
/// Returns `CliError::MissingEnvVars` when a required variable is unset.
#[allow(clippy::print_stdout)]
pub fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let report = EnvReport::collect(|name| std::env::var(name).ok());

    println!("Required:");
    for entry in &report.required {
        match &entry.preview {
            Some(preview) => println!("  [ok]      {}: {preview}", entry.name),
            None => println!("  [missing] {}", entry.name),
        }
    }
    println!("Optional:");
    for entry in &report.optional {
        match &entry.preview {
            Some(preview) => println!("  [ok]      {}: {preview}", entry.name),
            None => println!("  [unset]   {}", entry.name),
        }
    }

    let missing = report.missing();
    if missing.is_empty() {
        println!("All required environment variables are set.");
        Ok(())
    } else {
        Err(CliError::MissingEnvVars(missing))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("AIzaSyExampleKey123"), "AIza...");
        assert_eq!(mask("short"), "****");
    }

    #[test]
    fn test_report_accepts_database_url_fallback() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/luxe_jewel"),
            ("STOREFRONT_SESSION_SECRET", "q8Z!r2#Lm9@vX4$wT7^pN1&kB6*cF3%h"),
            ("GROQ_API_KEY", " "),
        ]);
        let report = EnvReport::collect(|name| vars.get(name).map(|v| (*v).to_owned()));

        assert_eq!(report.missing(), vec!["GOOGLE_API_KEY"]);
        assert_eq!(
            report.required[0].preview.as_deref(),
            Some("post...")
        );
        let groq = report.optional.iter().find(|e| e.name == "GROQ_API_KEY");
        assert_eq!(groq.and_then(|e| e.preview.as_deref()), None);
    }
}
