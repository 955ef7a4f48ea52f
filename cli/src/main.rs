//! wordocr CLI - word-level OCR export tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use wordocr::engine::parse_engine_output;
use wordocr::export::to_json;
use wordocr::{
    segment_lines, JsonFormat, NormalizedDocument, ProcessRecognizer, Uploader, WkHtmlToPdf,
    WordOcr,
};

#[derive(Parser)]
#[command(name = "wordocr")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Export word-level OCR boxes from documents, PDFs and images", long_about = None)]
struct Cli {
    /// Input file (jpg, png, heic, tiff, pdf, docx)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Write single-line JSON instead of indented JSON
    #[arg(long)]
    compact: bool,

    /// Upload the output directory with rclone when done
    #[arg(long, requires_all = ["remote_name", "remote_path"])]
    upload: bool,

    /// rclone remote name
    #[arg(long, value_name = "NAME", env = "WORDOCR_RCLONE_REMOTE")]
    remote_name: Option<String>,

    /// Path on the rclone remote
    #[arg(long, value_name = "PATH", env = "WORDOCR_REMOTE_PATH")]
    remote_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EngineArgs {
    /// Recognition engine executable
    #[arg(long, value_name = "PROG", env = "WORDOCR_ENGINE")]
    engine: Option<PathBuf>,

    /// Extra argument passed to the engine before the image (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Kill the engine if one page takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    engine_timeout: Option<u64>,

    /// Do not ask the engine to classify text angle
    #[arg(long)]
    no_angle_cls: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Directory containing the PDFium library
    #[arg(long, value_name = "DIR", env = "PDFIUM_LIB_DIR")]
    pdfium_dir: Option<PathBuf>,

    /// HTML to PDF renderer used for documents
    #[arg(long, value_name = "PROG", env = "WORDOCR_HTML_RENDERER")]
    html_renderer: Option<PathBuf>,

    /// Encode pages one at a time
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Only convert the input into page images
    Normalize {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Print the page list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split the lines of an engine result file into words
    Segment {
        /// Engine JSON output for one page
        #[arg(value_name = "LINES_JSON")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Normalize {
            input,
            render,
            json,
        }) => cmd_normalize(&input, &render, json),
        Some(Commands::Segment {
            input,
            output,
            compact,
        }) => cmd_segment(&input, output.as_deref(), compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input.as_deref() {
                let remote = if cli.upload {
                    cli.remote_name.as_deref().zip(cli.remote_path.as_deref())
                } else {
                    None
                };
                cmd_export(input, &cli.engine, &cli.render, cli.compact, remote)
            } else {
                println!("{}", "Usage: wordocr <FILE> --engine <PROG>".yellow());
                println!("       wordocr --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn builder(render: &RenderArgs) -> WordOcr {
    let mut ocr = WordOcr::new();
    if let Some(dir) = &render.pdfium_dir {
        ocr = ocr.with_pdfium_dir(dir);
    }
    if let Some(program) = &render.html_renderer {
        ocr = ocr.with_html_renderer(Arc::new(WkHtmlToPdf::with_program(program)));
    }
    if render.sequential {
        ocr = ocr.sequential();
    }
    ocr
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn normalize_with_progress(ocr: &WordOcr, input: &Path) -> wordocr::Result<NormalizedDocument> {
    let pb = spinner(&format!("Converting {}...", input.display()));
    let result = ocr.normalize(input);
    match &result {
        Ok(doc) => pb.finish_with_message(format!("{} page(s) ready", doc.pages.len())),
        Err(_) => pb.abandon_with_message("Conversion failed"),
    }
    result
}

fn cmd_export(
    input: &Path,
    engine: &EngineArgs,
    render: &RenderArgs,
    compact: bool,
    remote: Option<(&str, &str)>,
) -> CliResult {
    let program = engine
        .engine
        .as_ref()
        .ok_or("no recognition engine configured (use --engine or WORDOCR_ENGINE)")?;

    log::debug!("engine: {} {:?}", program.display(), engine.engine_args);
    let mut recognizer = ProcessRecognizer::new(program).args(&engine.engine_args);
    if let Some(secs) = engine.engine_timeout {
        recognizer = recognizer.with_timeout(Duration::from_secs(secs));
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let ocr = builder(render)
        .with_angle_classification(!engine.no_angle_cls)
        .with_json_format(format);

    let normalized = normalize_with_progress(&ocr, input)?;
    let exporter = ocr.exporter(recognizer);

    let pb = ProgressBar::new(normalized.pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut words = 0;
    for page in &normalized.pages {
        pb.set_message(format!("page {}", page.index));
        let export = exporter.export_page(page).map_err(|e| {
            pb.abandon_with_message(format!("page {} failed", page.index));
            e
        })?;
        words += export.word_count;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "{} {} page(s), {} word(s) in {}",
        "Exported".green(),
        normalized.pages.len(),
        words,
        normalized.output_dir.display()
    );

    match remote {
        Some((name, path)) => {
            let status = Uploader::new().upload_folder(&normalized.output_dir, name, path)?;
            if status != 0 {
                return Err(format!("rclone exited with status {}", status).into());
            }
            println!("{}", "Upload success!".green().bold());
        }
        None => println!("{}", "Saved to local!".green().bold()),
    }

    Ok(())
}

fn cmd_normalize(input: &Path, render: &RenderArgs, json: bool) -> CliResult {
    let normalized = normalize_with_progress(&builder(render), input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }

    println!("\n{}", "Page images:".green().bold());
    let last = normalized.pages.len().saturating_sub(1);
    for (i, page) in normalized.pages.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!(
            "  {} {} ({}x{})",
            branch.dimmed(),
            page.path.display(),
            page.width,
            page.height
        );
    }

    Ok(())
}

fn cmd_segment(input: &Path, output: Option<&Path>, compact: bool) -> CliResult {
    let content = fs::read_to_string(input)?;
    let lines = parse_engine_output(&content)?;
    let record = segment_lines(&lines);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&record, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "wordocr".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word-level OCR export tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/wordocr".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_requires_remote() {
        let result = Cli::try_parse_from(["wordocr", "scan.png", "--upload", "--remote-name", "drive"]);
        if std::env::var_os("WORDOCR_REMOTE_PATH").is_none() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::try_parse_from([
            "wordocr",
            "scan.png",
            "--engine",
            "ocr",
            "--engine-arg",
            "--lang",
            "--engine-arg",
            "en",
            "--no-angle-cls",
            "--compact",
            "--sequential",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("scan.png")));
        assert_eq!(cli.engine.engine, Some(PathBuf::from("ocr")));
        assert_eq!(cli.engine.engine_args, vec!["--lang", "en"]);
        assert!(cli.engine.no_angle_cls);
        assert!(cli.compact);
        assert!(cli.render.sequential);
        assert!(!cli.upload);
    }

    #[test]
    fn test_segment_subcommand() {
        let temp = tempfile::tempdir().unwrap();
        let lines = temp.path().join("lines.json");
        let out = temp.path().join("words.json");
        fs::write(&lines, r#"[[[[0,0],[100,0],[100,10],[0,10]],["ab cd",0.9]]]"#).unwrap();

        cmd_segment(&lines, Some(&out), true).unwrap();

        let json = fs::read_to_string(&out).unwrap();
        assert!(json.starts_with(r#"[["ab",[[0.0,0.0],[40.0,0.0]"#));
        assert!(json.contains(r#"["cd",[[60.0,0.0],[100.0,0.0]"#));
    }
}
