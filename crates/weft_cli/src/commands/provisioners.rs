//! Provisioners command - Inspect registered resource provisioners.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use weft_provision::{load_provisioners, Provisioner};
use weft_state::StateDirectory;

#[derive(Args)]
pub struct ProvisionersArgs {
    #[command(subcommand)]
    pub command: ProvisionersCommand,
}

#[derive(Subcommand)]
pub enum ProvisionersCommand {
    /// List the registered resource provisioners
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Format of the output: table (default), json
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct ProvisionerRow {
    #[serde(rename = "type")]
    res_type: String,
    class: String,
    params: Vec<String>,
    outputs: Vec<String>,
    description: Option<String>,
}

pub fn execute(args: &ProvisionersArgs) -> Result<()> {
    let base = std::env::current_dir()?;
    run(&base, args)
}

pub fn run(base: &Path, args: &ProvisionersArgs) -> Result<()> {
    let ProvisionersCommand::List(list) = &args.command;
    let dir = StateDirectory::load(base)?
        .context("state directory does not exist, please run \"init\" first")?;

    let mut provisioners = load_provisioners(dir.path())?;
    provisioners.sort_by(|a, b| {
        (a.res_type.as_str(), a.class.as_str()).cmp(&(b.res_type.as_str(), b.class.as_str()))
    });

    match list.format.as_str() {
        "json" => print_json(&provisioners)?,
        _ => print_table(&provisioners),
    }
    Ok(())
}

fn print_json(provisioners: &[Provisioner]) -> Result<()> {
    let rows: Vec<ProvisionerRow> = provisioners
        .iter()
        .map(|p| ProvisionerRow {
            res_type: p.res_type.clone(),
            class: p.class.clone(),
            params: p.params.clone(),
            outputs: p.expected_outputs.clone(),
            description: p.description.clone(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_table(provisioners: &[Provisioner]) {
    if provisioners.is_empty() {
        println!("No provisioners found");
        return;
    }
    let headers = ["TYPE", "CLASS", "PARAMS", "OUTPUTS", "DESCRIPTION"];
    let rows: Vec<[String; 5]> = provisioners
        .iter()
        .map(|p| {
            [
                p.res_type.clone(),
                p.class.clone(),
                p.params.join(", "),
                p.expected_outputs.join(", "),
                p.description.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    print_row(&headers.map(String::from), &widths);
    for row in &rows {
        print_row(row, &widths);
    }
}

fn print_row(cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    println!("{}", line.join("  ").trim_end());
}
