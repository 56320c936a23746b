//! gostfmt CLI - GOST document formatting tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use gostfmt::{format_file, Block, FormatConfig, FormatReport, Gostfmt};

#[derive(Parser)]
#[command(name = "gostfmt")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Format .docx documents to the GOST layout rules", long_about = None)]
struct Cli {
    /// Input .docx file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSON file with formatting parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format one or more documents
    #[command(alias = "fmt")]
    Format {
        /// Input .docx files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input) or directory (multiple inputs)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// JSON file with formatting parameters
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the formatting report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Classify a document and show what formatting would change
    Check {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON file with formatting parameters
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Format {
            inputs,
            output,
            config,
            report,
        }) => cmd_format(&inputs, output.as_deref(), config.as_deref(), report),
        Some(Commands::Check { input, config }) => cmd_check(&input, config.as_deref()),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: format if input is provided
            if let Some(input) = cli.input {
                cmd_format(
                    std::slice::from_ref(&input),
                    cli.output.as_deref(),
                    cli.config.as_deref(),
                    false,
                )
            } else {
                println!("{}", "Usage: gostfmt <FILE> [OUTPUT]".yellow());
                println!("       gostfmt --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<FormatConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(FormatConfig::from_json(&json)?)
        }
        None => Ok(FormatConfig::default()),
    }
}

/// Default output path: `report.docx` → `report_formatted.docx`.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_formatted.{ext}"))
}

fn cmd_format(
    inputs: &[PathBuf],
    output: Option<&Path>,
    config: Option<&Path>,
    print_report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    if inputs.len() == 1 {
        let input = &inputs[0];
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output(input));

        let report = format_file(input, &output, &config)?;

        println!("{} {}", "Saved to".green(), output.display());
        print_summary(&report);
        if print_report {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    // Batch mode: each document is an independent pipeline invocation.
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, Result<FormatReport, gostfmt::Error>)> = inputs
        .par_iter()
        .map(|input| {
            let file_name = input.file_name().unwrap_or_default().to_string_lossy();
            let out = output_dir.join(format!(
                "{}_formatted.docx",
                input.file_stem().unwrap_or_default().to_string_lossy()
            ));
            let result = format_file(input, &out, &config);
            pb.set_message(file_name.to_string());
            pb.inc(1);
            (input.clone(), result)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failures = 0;
    for (input, result) in &results {
        match result {
            Ok(report) => println!(
                "{} {} ({} paragraphs)",
                "ok".green(),
                input.display(),
                report.categories.total()
            ),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "failed".red(), input.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} files failed", results.len()).into());
    }
    Ok(())
}

fn cmd_check(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let data = fs::read(input)?;

    // Run the full pipeline in memory, discarding the output bytes.
    let (_, report) = Gostfmt::new().with_config(config).format_bytes(&data)?;

    println!("{}", "Classification".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let c = &report.categories;
    println!("{}: {}", "Section headings".bold(), c.section_headings);
    println!("{}: {}", "Numbered headings".bold(), c.numbered_headings);
    println!("{}: {}", "Appendix headings".bold(), c.appendix_headings);
    println!("{}: {}", "Figure captions".bold(), c.figure_captions);
    println!("{}: {}", "Table captions".bold(), c.table_captions);
    println!("{}: {}", "Formula lines".bold(), c.formula_lines);
    println!("{}: {}", "List items".bold(), c.list_items);
    println!("{}: {}", "Bibliography entries".bold(), c.bibliography_entries);
    println!("{}: {}", "Regular paragraphs".bold(), c.regular);
    println!("{}: {}", "Blank paragraphs".bold(), c.empty);

    println!();
    print_summary(&report);

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    gostfmt::detect::detect_format_from_bytes(&data)?;
    let doc = gostfmt::docx::read_document(&data)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref modified_by) = doc.metadata.last_modified_by {
        println!("{}: {}", "Last modified by".bold(), modified_by);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let words: usize = text.split_whitespace().count();
    let paragraphs = doc.paragraphs().count();
    let tables = doc.tables().count();
    let images = doc
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::Paragraph(p) if p.has_image()))
        .count();

    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Sections".bold(), doc.sections.len());

    Ok(())
}

fn print_summary(report: &FormatReport) {
    println!("{}", "Formatting Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), report.categories.total());
    println!("{}: {}", "Figures".bold(), report.figure_count);
    println!("{}: {}", "Tables".bold(), report.table_count);
    println!("{}: {}", "Captions inserted".bold(), report.captions_inserted);
    println!(
        "{}: {}",
        "Captions renumbered".bold(),
        report.captions_renumbered
    );
    println!("{}: {}", "Page breaks".bold(), report.page_breaks_set);
    println!("{}: {}", "Blanks removed".bold(), report.blanks_removed);
    println!(
        "{}: {}",
        "List terminals fixed".bold(),
        report.list_terminals_fixed
    );
    println!(
        "{}: {}",
        "Text edits".bold(),
        report.normalize.total()
    );
}

fn cmd_version() {
    println!("{} {}", "gostfmt".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("GOST document formatting tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/gostfmt".dimmed());
    println!("License: MIT");
}
