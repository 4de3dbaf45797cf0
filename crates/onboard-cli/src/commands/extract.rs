//! Extract command - show the raw fields found in source files.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use onboard_core::Extraction;

use super::config::load_config;
use super::{expand_inputs, source_name};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array, one entry per source
    Json,
    /// Field listing
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let pipeline = config.pipeline();
    let files = expand_inputs(&args.inputs)?;

    let mut extractions = Vec::with_capacity(files.len());
    for path in &files {
        info!("Extracting {}", path.display());
        let data = fs::read(path)?;
        let extraction = pipeline
            .extract(&source_name(path), &data)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

        for warning in &extraction.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
        extractions.push(extraction);
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&extractions)?,
        OutputFormat::Text => format_text(&extractions),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(extractions: &[Extraction]) -> String {
    let mut output = String::new();

    for extraction in extractions {
        output.push_str(&format!(
            "{} ({}, {} records)\n",
            extraction.source,
            extraction.kind.name(),
            extraction.records.len()
        ));
        for (i, record) in extraction.records.iter().enumerate() {
            if extraction.records.len() > 1 {
                output.push_str(&format!("  Record {}:\n", i + 1));
            }
            for (field, value) in record.iter() {
                output.push_str(&format!("  {}: {}\n", field, value.render().replace('\n', " / ")));
            }
        }
        output.push('\n');
    }

    output
}
