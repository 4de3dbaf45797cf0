//! Append command - add source files to a master file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use onboard_core::{
    export, load_master, ExportFormat, FailurePolicy, MasterTable, OnboardError, OutputProfile,
    SurnameRule,
};

use super::config::load_config;
use super::{expand_inputs, source_name};

/// Arguments for the append command.
#[derive(Args)]
pub struct AppendArgs {
    /// Existing master file (.xlsx or .csv)
    #[arg(short, long)]
    master: PathBuf,

    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: Updated_Master_File.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from the output file extension, then config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output column layout
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// How full names are split into first name and surname
    #[arg(long, value_enum)]
    surname_rule: Option<SurnameRuleArg>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Start from an empty table when the master file does not exist
    #[arg(long)]
    new: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// XLSX workbook
    Spreadsheet,
    /// CSV text
    Delimited,
    /// JSON columns and rows
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ProfileArg {
    /// HR master record
    Hr,
    /// Pension enrolment record
    Pension,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SurnameRuleArg {
    /// Everything after the first name
    RemainingTokens,
    /// Last word only
    LastToken,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Spreadsheet => Self::Spreadsheet,
            FormatArg::Delimited => Self::Delimited,
            FormatArg::Json => Self::Json,
        }
    }
}

impl From<ProfileArg> for OutputProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Hr => Self::Hr,
            ProfileArg::Pension => Self::Pension,
        }
    }
}

impl From<SurnameRuleArg> for SurnameRule {
    fn from(arg: SurnameRuleArg) -> Self {
        match arg {
            SurnameRuleArg::RemainingTokens => Self::RemainingTokens,
            SurnameRuleArg::LastToken => Self::LastToken,
        }
    }
}

pub fn run(args: AppendArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(profile) = args.profile {
        config.mapping.profile = profile.into();
    }
    if let Some(rule) = args.surname_rule {
        config.mapping.surname_rule = Some(rule.into());
    }
    if let Some(format) = args.format {
        config.export.format = format.into();
    } else if let Some(format) = args
        .output
        .as_deref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_str)
    {
        debug!("Output format {:?} taken from the output file name", format);
        config.export.format = format;
    }
    let pipeline = config.pipeline();

    let mut table = if args.master.exists() {
        let data = fs::read(&args.master)?;
        load_master(&data, &source_name(&args.master), config.mapping.profile)?
    } else if args.new {
        debug!("Master file {} not found, starting empty", args.master.display());
        MasterTable::new()
    } else {
        anyhow::bail!(
            "Master file not found: {}. Use --new to start an empty one.",
            args.master.display()
        );
    };
    let existing_rows = table.len();

    let files = expand_inputs(&args.inputs)?;
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let policy = if args.continue_on_error {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Stop
    };
    let sources = files.iter().map(|path| {
        let data = fs::read(path).map_err(OnboardError::from);
        (source_name(path), data)
    });
    let batch = pipeline.ingest_batch(&mut table, pb.wrap_iter(sources), policy);

    if policy == FailurePolicy::Stop {
        if let Some(failure) = batch.failures.first() {
            pb.abandon();
            error!("Failed to process {}: {}", failure.source, failure.error);
            anyhow::bail!("Processing {} failed: {}", failure.source, failure.error);
        }
    }
    pb.finish_and_clear();

    let payload = export(&table, config.export.format)?;
    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(payload.file_name(&config.export.file_stem)));
    fs::write(&output_path, &payload.bytes)?;

    println!(
        "{} Appended {} rows to {} existing in {:?}",
        style("✓").green(),
        batch.appended(),
        existing_rows,
        start.elapsed()
    );
    let ids: Vec<i64> = batch.reports.iter().flat_map(|r| r.ids.iter().copied()).collect();
    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        println!("   IDs {}-{}", first, last);
    }
    println!(
        "{} Master file written to {}",
        style("✓").green(),
        output_path.display()
    );

    if batch.warning_count() > 0 {
        println!();
        println!("{}", style("Warnings:").yellow());
        for warning in batch.reports.iter().flat_map(|r| &r.warnings) {
            println!("  - {}", warning);
        }
    }

    if batch.has_failures() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &batch.failures {
            println!("  - {}: {}", failure.source, failure.error);
        }
    }

    Ok(())
}
