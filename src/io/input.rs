use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::format::{DocumentFormat, FormatProbe};

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).context("failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).context("failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .context("failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Reads a document, picking the format from its extension (JSON when the
/// extension says nothing).
pub fn load_document(path: &Path) -> Result<Value> {
    let format = match DocumentFormat::probe(path) {
        FormatProbe::Known(format) => format,
        FormatProbe::Unknown => DocumentFormat::Json,
        FormatProbe::Disabled(feature) => bail!(
            "{} needs the `{feature}` feature to be enabled",
            path.display()
        ),
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_document_str(&contents, format).with_context(|| format!("in {}", path.display()))
}
