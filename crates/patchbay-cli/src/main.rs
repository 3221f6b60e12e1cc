//! patchbay - run an edge node from declarative wiring files.
//!
//! ```text
//! patchbay --templates ./templates --formula ./formula.yaml
//! ```
//!
//! Scans the template directory for `*.yaml` component templates,
//! registers a log-only provider for every protocol they reference,
//! optionally applies a bulk wiring formula, then runs the engine
//! until Ctrl-C. A malformed formula aborts with a non-zero exit code
//! before any wire is connected.

use anyhow::{Context, Result};
use clap::Parser;
use patchbay_provider::{LogProvider, ProviderRegistry};
use patchbay_runtime::graph::WireLoadFactory;
use patchbay_runtime::template::ComponentTemplate;
use patchbay_runtime::{Formula, PatchbayEngine, TemplateFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patchbay", version, about = "Edge-node dataflow runtime")]
struct Cli {
    /// Directory scanned for *.yaml component templates.
    #[arg(long)]
    templates: PathBuf,

    /// Bulk wiring definition applied at startup.
    #[arg(long)]
    formula: Option<PathBuf>,

    /// Log filter, e.g. "info" or "patchbay_runtime=debug".
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let templates = load_templates(&cli.templates)?;
    info!(count = templates.len(), "templates loaded");

    let engine = PatchbayEngine::new(
        providers_for(&templates),
        Arc::new(WireLoadFactory::new()),
    );
    engine.load_templates(templates);

    if let Some(path) = &cli.formula {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading formula {}", path.display()))?;
        let formula: Formula = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing formula {}", path.display()))?;
        engine
            .load_formula(&formula)
            .await
            .context("applying formula, nothing was wired")?;
    }

    // Ctrl-C performs a regular engine stop.
    let bus = engine.bus().clone();
    let scheduler = engine.scheduler().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            bus.fire(patchbay_event::EVENT_ENGINE_STOP, serde_json::Map::new());
            scheduler.stop(0);
        }
    });

    Ok(engine.run().await)
}

/// Registers one log-only provider per protocol the templates use.
fn providers_for(templates: &[ComponentTemplate]) -> Arc<ProviderRegistry> {
    let providers = Arc::new(ProviderRegistry::new());
    for template in templates {
        for def in template.inputs.iter().chain(template.outputs.iter()) {
            if providers.get(&def.protocol.name).is_none() {
                providers.register(Arc::new(LogProvider::new(def.protocol.name.clone())));
            }
        }
    }
    providers
}

/// Loads every `*.yaml` / `*.yml` template in `dir`.
fn load_templates(dir: &Path) -> Result<Vec<ComponentTemplate>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading template directory {}", dir.display()))?;

    let mut templates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if !is_yaml {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading template {}", path.display()))?;
        let file: TemplateFile = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing template {}", path.display()))?;
        templates.push(file.component);
    }
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    const CAMERA: &str = r#"
component:
  name: camera
  outputs:
    - name: frame
      protocol:
        name: mqtt
        topic: cam/frame
"#;

    #[test]
    fn scans_only_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "camera.yaml", CAMERA);
        write_file(dir.path(), "notes.txt", "not a template");

        let templates = load_templates(dir.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "camera");
    }

    #[test]
    fn malformed_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "broken.yaml", "component: {}");

        assert!(load_templates(dir.path()).is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let missing = Path::new("/nonexistent/patchbay/templates");
        assert!(load_templates(missing).is_err());
    }

    #[test]
    fn providers_cover_each_protocol_once() {
        let templates = vec![
            serde_yaml::from_str::<TemplateFile>(CAMERA).unwrap().component,
            serde_yaml::from_str::<TemplateFile>(CAMERA).unwrap().component,
        ];
        let providers = providers_for(&templates);
        assert_eq!(providers.len(), 1);
        assert!(providers.get("mqtt").is_some());
    }
}
