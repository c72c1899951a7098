//! CLI entry point for starchart-customizer.

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, WrapErr, eyre};

use starchart_customizer::cli::{Cli, OutputFormat};
use starchart_customizer::config::PageConfig;
use starchart_customizer::controller::{Capabilities, Controller};
use starchart_customizer::dispatch::Event;
use starchart_customizer::highlighting::{SyntectHighlighter, stylesheet, theme_names};
use starchart_customizer::logging::init_logging;
use starchart_customizer::relative_time::TimeAgo;
use starchart_customizer::report::SessionReport;
use starchart_customizer::storage::{JsonFileStorage, MemoryStorage, Storage};
use starchart_customizer::surface::HeadlessPage;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "starchart-customizer", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(ref theme) = cli.stylesheet {
        let css = stylesheet(theme).ok_or_else(|| {
            eyre!(
                "Unknown theme '{}' (available: {})",
                theme,
                theme_names().join(", ")
            )
        })?;
        print!("{css}");
        return Ok(());
    }

    let page_path = cli
        .page
        .as_ref()
        .ok_or_else(|| eyre!("A page description is required"))?;

    let config = PageConfig::load_with_overrides(page_path, &cli.to_config_overrides())
        .wrap_err_with(|| format!("Failed to load {}", page_path.display()))?;

    let _guard = init_logging(&config.logging);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let storage: Box<dyn Storage> = match cli.storage {
        Some(ref path) => Box::new(
            JsonFileStorage::open(path)
                .wrap_err_with(|| format!("Failed to open storage {}", path.display()))?,
        ),
        None => Box::new(MemoryStorage::new()),
    };

    let capabilities = Capabilities {
        storage,
        highlighter: Box::new(SyntectHighlighter::new(
            config.preview.snippet_language.clone(),
        )),
        relative_time: Box::new(cli.now.map(TimeAgo::new).unwrap_or_else(TimeAgo::now)),
    };

    let mut controller = Controller::new(&config, HeadlessPage::from_config(&config), capabilities)
        .wrap_err("Invalid page description")?;

    controller.dispatch(&Event::Load)?;
    for event in &cli.events {
        controller
            .dispatch(event)
            .wrap_err_with(|| format!("Failed to handle {event:?}"))?;
    }

    let report = SessionReport::capture(&controller);
    match cli.format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&report).wrap_err("Failed to serialize report")?;
            print!("{yaml}");
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).wrap_err("Failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", report.to_text()),
    }

    Ok(())
}
