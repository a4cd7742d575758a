use std::fmt;
use std::path::Path;

/// Document formats accepted for schemas, data and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}

/// What a file extension says about its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatProbe {
    Known(DocumentFormat),
    /// Recognised, but the crate was built without the named feature.
    Disabled(&'static str),
    Unknown,
}

impl DocumentFormat {
    pub fn probe(path: &Path) -> FormatProbe {
        let Some(ext) = path.extension() else {
            return FormatProbe::Unknown;
        };
        match ext.to_string_lossy().to_ascii_lowercase().as_str() {
            "json" => FormatProbe::Known(DocumentFormat::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => FormatProbe::Known(DocumentFormat::Yaml),
            #[cfg(not(feature = "yaml"))]
            "yaml" | "yml" => FormatProbe::Disabled("yaml"),
            #[cfg(feature = "toml")]
            "toml" => FormatProbe::Known(DocumentFormat::Toml),
            #[cfg(not(feature = "toml"))]
            "toml" => FormatProbe::Disabled("toml"),
            _ => FormatProbe::Unknown,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "json"),
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => write!(f, "yaml"),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => write!(f, "toml"),
        }
    }
}
