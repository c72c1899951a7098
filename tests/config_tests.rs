use std::path::Path;

use figment::Jail;
use starchart_customizer::config::{ConfigError, PageConfig, PageOverrides, PreviewOverrides};

fn demo_page() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/starchart.toml"))
}

#[test]
fn test_default_config() {
    let config = PageConfig::default();
    assert!(config.preview.base_url.is_none());
    assert_eq!(config.preview.initial_variant, "adaptive");
    assert_eq!(config.feedback.confirmation, "Copied!");
    assert_eq!(config.feedback.restore_after_ms, 1000);
    assert!(config.groups.is_empty());
}

#[test]
fn test_parse_toml() {
    let toml_str = r##"
[preview]
base_url = "https://x/chart"
snippet_template = "![chart]($URL)"

[[groups]]
name = "variant"
buttons = [{ label = "Dark", variant = "dark" }, { label = "custom" }]

[[colors]]
name = "line"
default = "#6b63ff"
"##;

    let config: PageConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.groups[0].buttons.len(), 2);
    assert!(config.groups[0].drives_preview);
    assert!(config.groups[0].buttons[1].variant.is_none());
    assert_eq!(config.colors[0].default, "#6b63ff");

    let resolved = config.resolve().unwrap();
    assert_eq!(resolved.base_url.as_str(), "https://x/chart");
}

#[test]
fn test_demo_page_resolves() {
    let config = PageConfig::load(demo_page()).unwrap();
    config.validate().unwrap();
    let resolved = config.resolve().unwrap();
    assert_eq!(
        resolved.base_url.as_str(),
        "https://starchart.cc/caarlos0/starcharts.svg"
    );
    assert_eq!(config.colors.len(), 3);
}

#[test]
fn test_missing_page_is_an_error() {
    let err = PageConfig::load(Path::new("/nonexistent/page.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_template_without_placeholder_is_fatal() {
    let config: PageConfig = toml::from_str(
        r#"
[preview]
base_url = "https://x/chart"
snippet_template = "<img src=\"chart.svg\">"
"#,
    )
    .unwrap();
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::MissingPlaceholder)
    ));
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "page.toml",
            r#"
[preview]
base_url = "https://x/chart"
snippet_template = "$URL"

[feedback]
restore_after_ms = 1000
"#,
        )?;
        jail.set_env("STARCHART_FEEDBACK__RESTORE_AFTER_MS", "250");
        jail.set_env("STARCHART_PREVIEW__INITIAL_VARIANT", "dark");

        let config = PageConfig::load(Path::new("page.toml")).map_err(|e| e.to_string())?;
        assert_eq!(config.feedback.restore_after_ms, 250);
        assert_eq!(config.preview.initial_variant, "dark");
        Ok(())
    });
}

#[test]
fn test_cli_overrides_win_and_unset_fields_do_not_mask() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "page.toml",
            r#"
[preview]
base_url = "https://x/chart"
snippet_template = "$URL"
initial_variant = "light"
"#,
        )?;
        jail.set_env("STARCHART_PREVIEW__BASE_URL", "https://env/chart");

        let overrides = PageOverrides {
            preview: PreviewOverrides {
                base_url: Some("https://cli/chart".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = PageConfig::load_with_overrides(Path::new("page.toml"), &overrides)
            .map_err(|e| e.to_string())?;
        assert_eq!(config.preview.base_url.as_deref(), Some("https://cli/chart"));
        assert_eq!(config.preview.initial_variant, "light");
        Ok(())
    });
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.toml");

    let config = PageConfig::load(demo_page()).unwrap();
    config.save(&path).unwrap();

    let reloaded = PageConfig::load(&path).unwrap();
    assert_eq!(reloaded.preview.base_url, config.preview.base_url);
    assert_eq!(reloaded.groups.len(), config.groups.len());
    assert_eq!(reloaded.picker, config.picker);
}
