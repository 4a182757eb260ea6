//! Init command - Initialize the state directory.

use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use weft_state::StateDirectory;

const SAMPLE_SPEC_FILE: &str = "weft.yaml";

const SAMPLE_SPEC: &str = r#"apiVersion: weft/v1
metadata:
  name: example
containers:
  main:
    image: stefanprodan/podinfo
service:
  ports:
    web:
      port: 8080
"#;

#[derive(Args)]
pub struct InitArgs {
    /// Skip writing the sample workload spec
    #[arg(long)]
    pub no_sample: bool,
}

pub fn execute(args: &InitArgs) -> Result<()> {
    let base = std::env::current_dir()?;
    run(&base, args)
}

pub fn run(base: &Path, args: &InitArgs) -> Result<()> {
    let dir = StateDirectory::init(base)?;
    info!("Initialized state directory {:?}", dir.path());

    if !args.no_sample {
        let sample = base.join(SAMPLE_SPEC_FILE);
        if !sample.exists() {
            fs::write(&sample, SAMPLE_SPEC)?;
            info!("Wrote sample workload spec {:?}", sample);
        }
    }
    Ok(())
}
