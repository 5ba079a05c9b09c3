use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use weave_base::{LocalContext, PluginOptions, Value, load_options};
use weave_logger::{Logger, LoggingConfig};

/// Wires a JSON component spec and prints the resulting components.
#[derive(Debug, Parser)]
#[command(name = "weave", version, about)]
struct Args {
    /// Path to the JSON spec to wire.
    spec: PathBuf,

    /// Configuration file; defaults to an optional `weave.*` in the working directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registers a JSON file as a loadable module, e.g. `app/defaults=defaults.json`.
    #[arg(short, long = "module", value_parser = parse_module)]
    modules: Vec<(String, PathBuf)>,

    /// Print only these components.
    #[arg(long = "component")]
    components: Vec<String>,

    /// Keep the context alive until Ctrl-C before destroying it.
    #[arg(long)]
    wait: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShellConfig {
    logging: LoggingConfig,
    plugin: PluginOptions,
}

fn parse_module(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((id, path)) if !id.is_empty() && !path.is_empty() => {
            Ok((id.to_owned(), PathBuf::from(path)))
        },
        _ => Err(format!("expected `id=path`, got `{raw}`")),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Value::from(json))
}

#[allow(clippy::print_stdout)]
fn print_components(components: &weave_base::Object, selected: &[String]) -> anyhow::Result<()> {
    let json = if selected.is_empty() {
        for (name, component) in components.entries() {
            info!(component = %name, kind = component.type_name(), "Resolved component");
        }
        Value::Object(components.clone()).to_json()
    } else {
        let mut picked = serde_json::Map::new();
        for name in selected {
            let Some(component) = components.get(name) else {
                bail!("no component named `{name}`");
            };
            info!(component = %name, kind = component.type_name(), "Resolved component");
            picked.insert(name.clone(), component.to_json());
        }
        serde_json::Value::Object(picked)
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config: ShellConfig = load_options(args.config.as_ref())?;
    let _logger = Logger::from_config(env!("CARGO_PKG_NAME"), &config.logging)?;

    let context = LocalContext::new(&config.plugin);
    for (id, path) in &args.modules {
        context.register_module(id.as_str(), read_json(path)?);
    }

    let spec = read_json(&args.spec)?;
    let components = context.wire_context(spec).await?;
    info!(spec = %args.spec.display(), components = components.len(), "Context wired");
    print_components(&components, &args.components)?;

    if args.wait {
        info!("Waiting for Ctrl-C");
        tokio::signal::ctrl_c().await.context("listening for Ctrl-C")?;
    }

    context.destroy().await?;
    Ok(())
}
