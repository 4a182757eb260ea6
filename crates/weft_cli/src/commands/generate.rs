//! Generate command - Provision resources and render the manifest document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use weft_convert::{render_document, substitute_workload};
use weft_provision::{load_provisioners, provision, TemplateEngine};
use weft_spec::read_spec_file;
use weft_state::StateDirectory;

#[derive(Args)]
pub struct GenerateArgs {
    /// Workload spec files to add or update before generating
    pub specs: Vec<PathBuf>,

    /// Output manifest file
    #[arg(short, long, default_value = "app.bicep")]
    pub output: PathBuf,
}

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let base = std::env::current_dir()?;
    run(&base, args)
}

pub fn run(base: &Path, args: &GenerateArgs) -> Result<()> {
    let mut dir = StateDirectory::load(base)?
        .context("state directory does not exist, please run \"init\" first")?;

    let mut state = dir.state.clone();
    for spec_path in &args.specs {
        let full_path = resolve(base, spec_path);
        let spec = read_spec_file(&full_path)?;
        let name = spec.name()?.to_string();
        info!("Adding workload '{}' from {:?}", name, full_path);
        state = state.with_workload(&name, spec, Some(full_path));
    }
    if state.workloads.is_empty() {
        bail!("project is empty, please add a workload spec");
    }

    let state = state.with_primed_resources()?;
    let provisioners = load_provisioners(dir.path())?;
    let engine = TemplateEngine::new();
    let (resource_manifests, state) = provision(&state, &provisioners, &engine)?;

    let mut workloads = Vec::new();
    for name in state.workloads.keys() {
        workloads.push((name.clone(), substitute_workload(&state, name)?));
    }
    let mut document = render_document(&workloads)?;
    document.push_str(&resource_manifests);

    let output = resolve(base, &args.output);
    fs::write(&output, &document)
        .with_context(|| format!("failed to write manifest to {}", output.display()))?;
    info!("Wrote manifest to {:?}", output);

    dir.state = state;
    dir.persist()?;
    Ok(())
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
