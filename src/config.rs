//! Page configuration: TOML file, environment and CLI layers merged with figment.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::snippet::SnippetTemplate;

/// Prefix for environment overrides, e.g. `STARCHART_PREVIEW__BASE_URL`.
pub const ENV_PREFIX: &str = "STARCHART_";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading/writing file
    Io(std::io::Error),
    /// Layered configuration could not be extracted
    Load(Box<figment::Error>),
    /// TOML serialization error
    Serialize(toml::ser::Error),
    /// A required singleton setting is absent
    MissingField(&'static str),
    /// Snippet template without the `$URL` placeholder
    MissingPlaceholder,
    /// Base URL or origin is not a valid URL
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    /// Default or swatch that is not a CSS color
    InvalidColor { field: String, value: String },
    /// Two entries share an identity
    Duplicate { kind: &'static str, name: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Load(e) => write!(f, "Configuration error: {}", e),
            Self::Serialize(e) => write!(f, "TOML serialize error: {}", e),
            Self::MissingField(field) => write!(f, "Missing required setting `{}`", field),
            Self::MissingPlaceholder => write!(
                f,
                "Snippet template must contain the {} placeholder",
                crate::snippet::URL_PLACEHOLDER
            ),
            Self::InvalidUrl { value, source } => write!(f, "Invalid URL '{}': {}", value, source),
            Self::InvalidColor { field, value } => {
                write!(f, "Invalid color for {}: {}", field, value)
            }
            Self::Duplicate { kind, name } => write!(f, "Duplicate {} '{}'", kind, name),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Load(Box::new(e))
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e)
    }
}

/// Root configuration structure describing one customization page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Preview image and snippet template
    pub preview: PreviewConfig,
    /// Mutually-exclusive button groups, in document order
    pub groups: Vec<GroupConfig>,
    /// Color inputs, in document order
    pub colors: Vec<ColorConfig>,
    /// Copy buttons
    pub triggers: Vec<TriggerConfig>,
    /// Time markers rendered as relative times at load
    pub times: Vec<TimeConfig>,
    /// Color picker widget settings
    pub picker: PickerConfig,
    /// Copy confirmation settings
    pub feedback: FeedbackConfig,
    /// Log file settings
    pub logging: LoggingConfig,
}

/// Preview image settings (`#chart[data-src]` and `#code-template`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Base URL of the preview image; may be relative to `origin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Embed snippet containing `$URL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_template: Option<String>,
    /// Page origin used to resolve a relative base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Variant rendered at load, before any button is clicked
    pub initial_variant: String,
    /// Syntax used to highlight the snippet
    pub snippet_language: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            snippet_template: None,
            origin: None,
            initial_variant: "adaptive".to_string(),
            snippet_language: "markdown".to_string(),
        }
    }
}

/// A `.button-group` and its buttons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    /// Whether clicks in this group switch the preview variant
    #[serde(default = "default_true")]
    pub drives_preview: bool,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
}

/// A button inside a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Visible label; doubles as the variant when `variant` is unset
    pub label: String,
    /// `data-variant` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// A color input (`[data-coloris]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Input name: persistence key and query parameter
    pub name: String,
    /// Built-in value used when nothing is persisted
    pub default: String,
}

/// A copy button (`.copy-btn`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub id: String,
    pub label: String,
}

/// A `<time datetime="...">` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// RFC 3339 timestamp
    pub datetime: String,
}

/// Settings handed to the color picker widget at load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub theme: String,
    pub theme_mode: String,
    pub alpha: bool,
    pub margin: u32,
    pub format: String,
    pub format_toggle: bool,
    pub close_button: bool,
    pub close_label: String,
    pub swatches: Vec<String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            theme: "pill".to_string(),
            theme_mode: "auto".to_string(),
            alpha: true,
            margin: 16,
            format: "hex".to_string(),
            format_toggle: false,
            close_button: true,
            close_label: "Apply".to_string(),
            swatches: [
                "#FFFFFF", "#101010", "#6b63ff", "#e76060", "#2f81f7", "#333333",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl PickerConfig {
    /// Options object in the widget's camelCase shape.
    pub fn widget_options(&self) -> serde_json::Value {
        serde_json::json!({
            "theme": self.theme,
            "themeMode": self.theme_mode,
            "alpha": self.alpha,
            "margin": self.margin,
            "format": self.format,
            "formatToggle": self.format_toggle,
            "closeButton": self.close_button,
            "closeLabel": self.close_label,
            "swatches": self.swatches,
        })
    }
}

/// Copy confirmation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Label shown on a trigger after a successful copy
    pub confirmation: String,
    /// Delay before the original label is restored
    pub restore_after_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            confirmation: "Copied!".to_string(),
            restore_after_ms: 1000,
        }
    }
}

/// Log file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Typed settings the controller cannot start without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Absolute base URL of the preview image
    pub base_url: Url,
    pub snippet_template: SnippetTemplate,
}

impl PageConfig {
    /// Layered figment: defaults, then the TOML file, then `STARCHART_*` env vars.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from a TOML file plus environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, &PageOverrides::default())
    }

    /// Load configuration and apply CLI overrides last.
    pub fn load_with_overrides(path: &Path, overrides: &PageOverrides) -> Result<Self, ConfigError> {
        // figment treats a missing file as empty; a named page must exist
        if !path.is_file() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        let config = Self::figment(Some(path))
            .merge(Serialized::defaults(overrides))
            .extract()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve the singleton settings, failing fast when one is missing.
    pub fn resolve(&self) -> Result<ControllerConfig, ConfigError> {
        let raw = self
            .preview
            .base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingField("preview.base_url"))?;
        let base_url = resolve_base_url(raw, self.preview.origin.as_deref())?;

        let template = self
            .preview
            .snippet_template
            .as_deref()
            .ok_or(ConfigError::MissingField("preview.snippet_template"))?;
        let snippet_template = SnippetTemplate::parse(template)?;

        Ok(ControllerConfig {
            base_url,
            snippet_template,
        })
    }

    /// Check identities and configured colors.
    ///
    /// Only defaults and swatches are checked; values the user types are
    /// passed through untouched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_unique("color field", self.colors.iter().map(|c| c.name.as_str()))?;
        ensure_unique("group", self.groups.iter().map(|g| g.name.as_str()))?;
        ensure_unique("copy trigger", self.triggers.iter().map(|t| t.id.as_str()))?;

        for color in &self.colors {
            check_color(&color.name, &color.default)?;
        }
        for swatch in &self.picker.swatches {
            check_color("picker.swatches", swatch)?;
        }
        Ok(())
    }
}

/// CLI-level overrides merged on top of file and environment settings.
///
/// Unset fields are skipped during serialization so they never mask lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageOverrides {
    pub preview: PreviewOverrides,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PreviewOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_variant: Option<String>,
}

fn resolve_base_url(raw: &str, origin: Option<&str>) -> Result<Url, ConfigError> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = origin.ok_or(ConfigError::MissingField("preview.origin"))?;
            let base = Url::parse(origin).map_err(|source| ConfigError::InvalidUrl {
                value: origin.to_string(),
                source,
            })?;
            base.join(raw).map_err(|source| ConfigError::InvalidUrl {
                value: raw.to_string(),
                source,
            })
        }
        Err(source) => Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            source,
        }),
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_color(field: &str, value: &str) -> Result<(), ConfigError> {
    value
        .parse::<csscolorparser::Color>()
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidColor {
            field: field.to_string(),
            value: value.to_string(),
        })
}
