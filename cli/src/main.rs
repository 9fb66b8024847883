//! pptxdom CLI - PPTX decoding tool
//!
//! Decodes PowerPoint packages into the normalized presentation model and
//! prints it as JSON, a text outline or a summary.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pptxdom::container::Package;
use pptxdom::render::{JsonFormat, TextOptions};
use pptxdom::{Decoder, ImportSettings, ParseResult, ProgressEvent, TargetSlideSize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// PPTX decoding into a normalized presentation model
#[derive(Parser)]
#[command(
    name = "pptxdom",
    author = "iyulab",
    version,
    about = "Decode PowerPoint presentations",
    long_about = "pptxdom - PPTX decoding into a render-agnostic presentation model.\n\n\
                  Outputs slides, shapes, text, images and themes as JSON or text."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v warnings, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a presentation to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Wrap the presentation with success, warnings and timing
        #[arg(long)]
        full: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the text of every slide
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a header line before each slide
        #[arg(long)]
        headers: bool,

        /// Include hidden slides
        #[arg(long)]
        hidden: bool,
    },

    /// Show presentation information and statistics
    Info {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Extract media files (images, video, audio)
    Extract {
        /// Input file path
        input: PathBuf,

        /// Output directory for media
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Dump one package part as a generic JSON tree
    Dump {
        /// Input file path
        input: PathBuf,

        /// Part path inside the package (e.g. ppt/slides/slide1.xml)
        part: Option<String>,

        /// List the package entries instead
        #[arg(long)]
        list: bool,
    },

    /// Show version information
    Version,
}

/// Import settings shared by the decoding commands.
#[derive(Args, Clone, Default)]
struct SettingsArgs {
    /// JSON file with import settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Target slide size: 1920x1080, 1280x720 or WIDTHxHEIGHT
    #[arg(long)]
    target: Option<String>,

    /// Skip images and media bytes
    #[arg(long)]
    no_images: bool,

    /// Skip shapes and lines
    #[arg(long)]
    no_shapes: bool,

    /// Skip text boxes and text in shapes
    #[arg(long)]
    no_text: bool,

    /// Do not inherit master backgrounds
    #[arg(long)]
    no_master_background: bool,

    /// Map slides in parallel
    #[arg(long)]
    parallel: bool,
}

impl SettingsArgs {
    fn build(&self) -> pptxdom::Result<ImportSettings> {
        let mut settings = match &self.settings {
            Some(path) => ImportSettings::from_json_file(path)?,
            None => ImportSettings::default(),
        };
        if let Some(target) = &self.target {
            settings = settings.with_target_size(TargetSlideSize::parse(target)?);
        }
        if self.no_images {
            settings = settings.with_images(false);
        }
        if self.no_shapes {
            settings = settings.with_shapes(false);
        }
        if self.no_text {
            settings = settings.with_text(false);
        }
        if self.no_master_background {
            settings = settings.with_master_background(false);
        }
        if self.parallel {
            settings = settings.with_parallel(true);
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
            full,
            settings,
        } => {
            let result = decode(&input, settings.build()?)?;
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = if full {
                pptxdom::render::result_to_json(&result, format)?
            } else {
                print_warnings(&result);
                pptxdom::render::to_json(&result.into_result()?, format)?
            };

            write_output(output.as_ref(), &json)?;
            if let Some(path) = output {
                println!(
                    "{} Converted to JSON: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Text {
            input,
            output,
            headers,
            hidden,
        } => {
            let result = decode(&input, ImportSettings::default().with_images(false))?;
            print_warnings(&result);
            let presentation = result.into_result()?;
            let options = TextOptions::default()
                .with_slide_headers(headers)
                .with_hidden(hidden);
            let text = pptxdom::render::to_text(&presentation, &options);

            write_output(output.as_ref(), &text)?;
            if let Some(path) = output {
                println!("{} Converted to text: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input, settings } => {
            let result = decode(&input, settings.build()?)?;
            let warnings = result.warnings.len();
            let elapsed = result.processing_time_ms;
            let presentation = result.into_result()?;

            println!("{}", "Presentation Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), presentation.file_name);
            if let Some(ref title) = presentation.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = presentation.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref created) = presentation.metadata.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = presentation.metadata.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }
            let size = presentation.slide_size;
            println!(
                "{}: {}x{} EMU → {:.0}x{:.0} px (scale {:.3})",
                "Slide size".bold(),
                size.width_emu,
                size.height_emu,
                size.width,
                size.height,
                size.scale
            );
            println!("{}: {}", "Slides".bold(), presentation.slide_count);
            println!("{}: {}", "Masters".bold(), presentation.masters.len());
            println!("{}: {}", "Themes".bold(), presentation.themes.len());
            println!("{}: {}", "Media".bold(), presentation.media.len());

            println!("\n{}", "Slides".cyan().bold());
            println!("{}", "─".repeat(40));
            for slide in &presentation.slides {
                let hidden = if slide.hidden { " (hidden)".dimmed().to_string() } else { String::new() };
                println!(
                    "{:>3}  {:<28} {:>4} elements{}",
                    slide.number,
                    slide.name,
                    slide.element_count(),
                    hidden
                );
            }

            let text = presentation.plain_text();
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Words".bold(), text.split_whitespace().count());
            println!("{}: {}", "Characters".bold(), text.chars().count());
            println!("{}: {}", "Warnings".bold(), warnings);
            println!("{}: {} ms", "Decode time".bold(), elapsed);
        }

        Commands::Extract { input, output } => {
            let result = decode(&input, ImportSettings::default())?;
            let presentation = result.into_result()?;

            fs::create_dir_all(&output)?;
            let mut count = 0;
            for media in presentation.media.iter().filter(|m| m.has_data()) {
                media.save_to(output.join(&media.name))?;
                count += 1;
            }

            if count > 0 {
                println!(
                    "{} Extracted {} media files to {}",
                    "✓".green().bold(),
                    count,
                    output.display()
                );
            } else {
                println!("{} No media found in presentation", "!".yellow().bold());
            }
        }

        Commands::Dump { input, part, list } => {
            let package = Package::open(&input)?;
            if list || part.is_none() {
                for entry in package.list_entries().iter().filter(|e| !e.is_dir) {
                    println!("{:>10}  {}", entry.size, entry.path);
                }
            } else if let Some(part) = part {
                let tree = package.read_tree(&part)?;
                let json = serde_json::to_string_pretty(&tree.to_value())?;
                write_output(None, &json)?;
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Decode a file with a progress bar on stderr.
fn decode(input: &Path, settings: ImportSettings) -> Result<ParseResult, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let name = input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();

    let pb = create_progress_bar();
    let report = |event: &ProgressEvent| {
        pb.set_position(event.progress as u64);
        pb.set_message(event.message.clone());
    };
    let result = Decoder::new(settings)
        .with_progress(&report)
        .decode(bytes, &name);
    pb.finish_and_clear();
    log::debug!(
        "decoded {} in {} ms ({} warnings)",
        name,
        result.processing_time_ms,
        result.warnings.len()
    );

    if !result.success {
        for error in &result.errors {
            eprintln!("{}: {}", "Error".red().bold(), error);
        }
    }
    Ok(result)
}

fn print_warnings(result: &ParseResult) {
    for warning in &result.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }
}

fn print_version() {
    println!("{} {}", "pptxdom".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PPTX decoding into a normalized presentation model");
    println!();
    println!("Repository: https://github.com/iyulab/pptxdom");
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
