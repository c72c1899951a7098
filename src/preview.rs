//! Preview URL builder.
//!
//! The URL is rebuilt from the configured base on every call: query state from
//! a previous variant can never leak into the next one.

use serde::Serialize;
use url::Url;

use crate::colors::ColorStore;
use crate::config::ControllerConfig;
use crate::selection::Variant;
use crate::snippet::SnippetTemplate;

/// Query parameter carrying a preset identifier.
pub const VARIANT_PARAM: &str = "variant";

/// What the preview currently looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct PreviewBuilder {
    base: Url,
    template: SnippetTemplate,
}

impl PreviewBuilder {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            base: config.base_url.clone(),
            template: config.snippet_template.clone(),
        }
    }

    /// Base URL with its query replaced by the parameters for `variant`.
    pub fn url_for(&self, variant: &Variant, colors: &ColorStore) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        match variant {
            Variant::Custom => {
                if !colors.fields().is_empty() {
                    url.query_pairs_mut().extend_pairs(colors.pairs());
                }
            }
            Variant::Preset(id) => {
                url.query_pairs_mut().append_pair(VARIANT_PARAM, id);
            }
        }
        url
    }

    /// Derive URL and snippet for the given inputs.
    pub fn recompute(&self, variant: &Variant, colors: &ColorStore) -> PreviewState {
        let url = self.url_for(variant, colors).to_string();
        let snippet = self.template.render(&url);
        PreviewState { url, snippet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorField;

    fn builder(base: &str, template: &str) -> PreviewBuilder {
        PreviewBuilder::new(&ControllerConfig {
            base_url: Url::parse(base).unwrap(),
            snippet_template: SnippetTemplate::parse(template).unwrap(),
        })
    }

    fn colors(pairs: &[(&str, &str)]) -> ColorStore {
        ColorStore::new(pairs.iter().map(|(n, v)| ColorField::new(*n, *v)).collect())
    }

    #[test]
    fn custom_emits_one_param_per_field_in_order() {
        let builder = builder("https://x/chart", "$URL");
        let state = builder.recompute(&Variant::Custom, &colors(&[("bg", "#fff"), ("fg", "#000")]));
        assert_eq!(state.url, "https://x/chart?bg=%23fff&fg=%23000");
    }

    #[test]
    fn preset_emits_only_variant() {
        let builder = builder("https://x/chart?bg=%23fff&stale=1", "$URL");
        let state = builder.recompute(&Variant::parse("foo"), &colors(&[("bg", "#fff")]));
        assert_eq!(state.url, "https://x/chart?variant=foo");
    }

    #[test]
    fn custom_without_fields_has_no_query() {
        let builder = builder("https://x/chart?variant=dark", "$URL");
        let state = builder.recompute(&Variant::Custom, &ColorStore::default());
        assert_eq!(state.url, "https://x/chart");
    }

    #[test]
    fn recompute_is_deterministic() {
        let builder = builder("https://x/chart", "[chart]($URL)");
        let palette = colors(&[("a", "#111111"), ("b", "#222222")]);
        let first = builder.recompute(&Variant::Custom, &palette);
        let second = builder.recompute(&Variant::Custom, &palette);
        assert_eq!(first, second);
    }

    #[test]
    fn snippet_embeds_url() {
        let builder = builder("https://x/chart", r#"<a href="$URL">link</a>"#);
        let state = builder.recompute(&Variant::parse("foo"), &ColorStore::default());
        assert_eq!(state.snippet, r#"<a href="https://x/chart?variant=foo">link</a>"#);
    }

    #[test]
    fn alpha_hex_and_spaces_are_form_encoded() {
        let builder = builder("https://x/chart", "$URL");
        let state = builder.recompute(
            &Variant::Custom,
            &colors(&[("line", "#6b63ffcc"), ("axis", "rgb(1, 2, 3)")]),
        );
        assert_eq!(
            state.url,
            "https://x/chart?line=%236b63ffcc&axis=rgb%281%2C+2%2C+3%29"
        );
    }
}
