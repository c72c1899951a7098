//! Snippet syntax highlighting using syntect's class-based HTML output.

use std::sync::LazyLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Cached syntax set - expensive to load, so we cache it globally.
pub static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Bundled themes, used only to emit stylesheets.
pub static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Class prefix on every emitted span, e.g. `hl-string`.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Turns snippet text into highlighted HTML.
///
/// Implementations must be idempotent: the same text yields the same markup.
pub trait Highlight {
    fn highlight(&self, code: &str) -> String;
}

/// Syntect highlighter for one language.
pub struct SyntectHighlighter {
    language: String,
}

impl SyntectHighlighter {
    /// `language` is a syntax name or file extension ("markdown", "html", "md").
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn syntax(&self) -> &'static SyntaxReference {
        SYNTAX_SET
            .find_syntax_by_token(&self.language)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, code: &str) -> String {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(self.syntax(), &SYNTAX_SET, CLASS_STYLE);

        // Newlines are kept so multi-line scopes close correctly.
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::warn!(error = %e, language = %self.language, "highlighting failed");
                return v_htmlescape::escape(code).to_string();
            }
        }
        generator.finalize()
    }
}

/// Escapes the snippet without adding markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl Highlight for PlainText {
    fn highlight(&self, code: &str) -> String {
        v_htmlescape::escape(code).to_string()
    }
}

/// CSS for a bundled theme, matching the classes `SyntectHighlighter` emits.
pub fn stylesheet(theme: &str) -> Option<String> {
    let theme = THEME_SET.themes.get(theme)?;
    css_for_theme_with_class_style(theme, CLASS_STYLE).ok()
}

/// Names accepted by [`stylesheet`].
pub fn theme_names() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(String::as_str).collect()
}
