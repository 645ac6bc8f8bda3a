// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use luat_components::{
    props_from_json, ComponentConfig, ComponentRegistry, ComponentRenderer, FileSystemResolver,
    LuaTemplateEngine, TemplateResolver,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the root directory when `--config` is not given.
const DEFAULT_CONFIG: &str = "components.toml";

#[derive(Parser)]
#[command(name = "luat-components")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Render template-only luat components from a directory", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Root directory templates are resolved against
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Path to the TOML configuration (defaults to <root>/components.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a component and print the HTML
    Render {
        /// Component name, e.g. `alert` or `forms:input`
        name: String,
        /// Props as a JSON object
        #[arg(short, long, default_value = "{}")]
        props: String,
    },
    /// Show which template a component name maps to
    Template {
        /// Component name
        name: String,
    },
}

fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<ComponentConfig> {
    let mut config = match explicit {
        Some(path) => ComponentConfig::load(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => {
            let path = root.join(DEFAULT_CONFIG);
            if path.is_file() {
                ComponentConfig::load(&path).map_err(|e| anyhow::anyhow!("{e}"))?
            } else {
                ComponentConfig::default()
            }
        }
    };

    // Every component rendered from the command line is template-only.
    if config.components.anonymous_template_directory.is_none() {
        config.components.anonymous_template_directory =
            Some(config.components.template_directory.clone());
    }
    Ok(config)
}

fn render(root: &Path, config: ComponentConfig, name: &str, props: &str) -> anyhow::Result<String> {
    let props: serde_json::Value =
        serde_json::from_str(props).context("--props must be a JSON object")?;
    anyhow::ensure!(props.is_object(), "--props must be a JSON object");

    let resolver = FileSystemResolver::new(root);
    let lookup = resolver.clone();
    let registry = ComponentRegistry::new(config.clone())
        .with_anonymous_lookup(move |template| lookup.exists(template));
    let engine = LuaTemplateEngine::from_config(resolver, &config).map_err(|e| anyhow::anyhow!("{e}"))?;
    let renderer = ComponentRenderer::with_config(registry, engine, &config);

    renderer
        .render_component(name, props_from_json(props))
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.root, cli.config.as_deref())?;
    tracing::debug!("using templates from {}", cli.root.display());

    match cli.command {
        Commands::Render { name, props } => {
            let html = render(&cli.root, config, &name, &props)
                .with_context(|| format!("failed to render component '{name}'"))?;
            println!("{html}");
        }
        Commands::Template { name } => {
            let resolver = FileSystemResolver::new(&cli.root);
            let template = config
                .anonymous_template_for(&name)
                .unwrap_or_else(|| config.template_for(&name));
            let status = if resolver.exists(&template) { "found" } else { "missing" };
            println!("{template} ({status})");
        }
    }

    Ok(())
}
