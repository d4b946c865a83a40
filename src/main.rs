//! IBX1 CLI - Command-line tool for converting IBX1 binary tree files.
//!
//! This is the main entry point for the `ibx` command-line application.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

use ibx::prelude::*;

/// IBX1 - binary tree file to XML converter
#[derive(Parser)]
#[command(name = "ibx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert IBX1 files to XML
    Decode {
        /// Input file or directory
        #[arg(env = "IBX_INPUT")]
        input: PathBuf,

        /// Output file or directory
        #[arg(env = "IBX_OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        hex: HexArgs,

        /// Convert files on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Convert XML files to IBX1
    Encode {
        /// Input file or directory
        #[arg(env = "IBX_INPUT")]
        input: PathBuf,

        /// Output file or directory
        #[arg(env = "IBX_OUTPUT")]
        output: PathBuf,

        /// Do not re-use typed values (produces larger IBX1 files)
        #[arg(long)]
        no_share: bool,

        /// Convert files on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Show the tables and structure of an IBX1 file
    Inspect {
        /// Input IBX1 file
        #[arg(env = "IBX_INPUT")]
        input: PathBuf,

        /// Print the element tree as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        hex: HexArgs,
    },
}

#[derive(Args)]
struct HexArgs {
    /// Render 8-bit integers as hexadecimal
    #[arg(long)]
    hex8: bool,

    /// Render 16-bit integers as hexadecimal
    #[arg(long)]
    hex16: bool,

    /// Render 32-bit integers as hexadecimal
    #[arg(long)]
    hex32: bool,
}

impl From<&HexArgs> for RenderOptions {
    fn from(args: &HexArgs) -> Self {
        Self {
            hex8: args.hex8,
            hex16: args.hex16,
            hex32: args.hex32,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decode {
            input,
            output,
            hex,
            parallel,
        } => {
            let converter = Converter::decoder(RenderOptions::from(&hex));
            cmd_convert(&input, &output, &converter, parallel)?;
        }
        Commands::Encode {
            input,
            output,
            no_share,
            parallel,
        } => {
            let converter = Converter::encoder(BuildOptions {
                share_values: !no_share,
            });
            cmd_convert(&input, &output, &converter, parallel)?;
        }
        Commands::Inspect { input, json, hex } => {
            cmd_inspect(&input, json, &RenderOptions::from(&hex))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG, when set, overrides the verbosity flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn cmd_convert(input: &Path, output: &Path, converter: &Converter, parallel: bool) -> Result<()> {
    let jobs = plan(input, output, converter.direction())
        .with_context(|| format!("Failed to read input {}", input.display()))?;

    if jobs.is_empty() {
        println!("No files found in {}", input.display());
        return Ok(());
    }

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = converter.run_all(&jobs, parallel, |job, result| {
        if !parallel {
            pb.println(format!(
                "converting {} --> {} ... {}",
                job.input.display(),
                job.output.display(),
                status(result)
            ));
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");
    println!(
        "files processed: {} ({} converted, {} unchanged, {} failed) in {:?}",
        report.total(),
        report.converted,
        report.unchanged,
        report.failed.len(),
        start.elapsed()
    );

    if !report.is_success() {
        for (path, message) in &report.failed {
            eprintln!("Error converting {}: {}", path.display(), message);
        }
        anyhow::bail!("{} of {} files failed to convert", report.failed.len(), report.total());
    }

    Ok(())
}

fn status(result: &ibx::Result<Outcome>) -> Cow<'static, str> {
    match result {
        Ok(Outcome::Converted) => Cow::Borrowed("OK"),
        Ok(Outcome::Unchanged) => Cow::Borrowed("OK (unchanged)"),
        Err(e) => Cow::Owned(format!("FAILED: {}", e)),
    }
}

fn cmd_inspect(input: &Path, json: bool, render: &RenderOptions) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    if !Document::is_ibx(&data) {
        anyhow::bail!("Input file is not an IBX1 file");
    }

    let document = Document::parse(&data).context("Failed to parse IBX1")?;

    if json {
        let element = document
            .to_element(render)
            .context("Failed to resolve element tree")?;
        let text = serde_json::to_string_pretty(&element).context("Failed to serialize element tree")?;
        println!("{}", text);
        return Ok(());
    }

    let strings = document.strings();
    println!("num strings: 0x{:x} ({})", strings.len(), strings.len());
    for (i, s) in strings.iter().enumerate() {
        println!("0x{:x} ({}): 0x{:x} {{{}}}", i, i, s.len(), s);
    }

    let values = document.values();
    println!("num typed-values: 0x{:x} ({})", values.len(), values.len());
    for (i, value) in values.iter().enumerate() {
        println!("0x{:x} ({}): {}", i, i, value);
    }

    let root = document.root();
    println!("encoding flag: 0x{:02x}", document.encoding_flag());
    println!("nodes: {} (depth {})", root.count(), root.depth());

    Ok(())
}
