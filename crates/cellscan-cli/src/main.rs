mod commands;
mod error;
mod output;
mod source;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::Overrides;

#[derive(Parser)]
#[command(
    name = "cellscan",
    version,
    about = "Extract text from regions of scanned financial reports into spreadsheet cells"
)]
struct Cli {
    /// JSON settings file (defaults are used for anything it leaves out)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OcrArgs {
    /// Minimum OCR confidence; detections must score strictly above it
    #[arg(long, value_name = "0..1")]
    threshold: Option<f32>,

    /// Rasterization resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Tesseract language code(s), e.g. --lang vie --lang eng
    #[arg(long = "lang", value_name = "CODE")]
    languages: Vec<String>,
}

impl From<&OcrArgs> for Overrides {
    fn from(args: &OcrArgs) -> Self {
        Overrides {
            threshold: args.threshold,
            dpi: args.dpi,
            languages: args.languages.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract region text from a local PDF
    Extract {
        /// Path to the report PDF
        pdf_file: PathBuf,

        /// Region token "page,label,x1,y1,x2,y2" (repeatable)
        #[arg(short, long = "region", value_name = "TOKEN")]
        regions: Vec<String>,

        /// File with one region token per line
        #[arg(long, value_name = "FILE")]
        regions_file: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Save the rasterized pages that regions refer to into DIR
        #[arg(long, value_name = "DIR")]
        keep_images: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,
    },
    /// Locate, download and extract reports for every company in a workbook
    Batch {
        /// Company configuration workbook (.xlsx)
        workbook: PathBuf,

        /// Sheet holding the company rows (overrides settings)
        #[arg(long)]
        sheet: Option<String>,

        /// Directory for per-company JSON results
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,

        /// Keep downloaded PDFs under <out-dir>/reports
        #[arg(long)]
        keep_pdf: bool,

        /// Keep rasterized pages under <out-dir>/images/<code>
        #[arg(long)]
        keep_images: bool,

        /// Write extracted text into this xlsx, one sheet per company code,
        /// each value in the cell its region label names
        #[arg(long, value_name = "FILE")]
        results_workbook: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,
    },
    /// Print the report PDF URL for a company code
    Locate {
        /// Company ticker code
        code: String,
    },
    /// Check region tokens and show how they group by page
    Regions {
        /// Region tokens
        tokens: Vec<String>,

        /// File with one region token per line
        #[arg(long, value_name = "FILE")]
        regions_file: Option<PathBuf>,
    },
    /// Show raw OCR detections for one page of a PDF
    Detections {
        /// Path to the report PDF
        pdf_file: PathBuf,

        /// 1-based page number
        #[arg(short, long)]
        page: u32,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        #[command(flatten)]
        ocr: OcrArgs,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), error::CliError> {
    let settings_path = cli.settings.as_deref();

    match cli.command {
        Commands::Extract {
            pdf_file,
            regions,
            regions_file,
            output,
            keep_images,
            ocr,
        } => {
            let settings = commands::load_settings(settings_path, &(&ocr).into())?;
            let tokens = commands::read_tokens(regions, regions_file.as_deref())?;
            commands::extract::run(pdf_file, tokens, &settings, &output, keep_images)
        }
        Commands::Batch {
            workbook,
            sheet,
            out_dir,
            keep_pdf,
            keep_images,
            results_workbook,
            ocr,
        } => {
            let mut settings = commands::load_settings(settings_path, &(&ocr).into())?;
            if let Some(sheet) = sheet {
                settings.workbook.sheet = sheet;
            }
            let options = commands::batch::BatchOptions {
                out_dir,
                keep_pdf,
                keep_images,
                results_workbook,
            };
            commands::batch::run(workbook, &settings, &options)
        }
        Commands::Locate { code } => {
            let settings = commands::load_settings(settings_path, &Overrides::default())?;
            commands::locate::run(&code, &settings)
        }
        Commands::Regions {
            tokens,
            regions_file,
        } => {
            let tokens = commands::read_tokens(tokens, regions_file.as_deref())?;
            commands::regions::check(&tokens)
        }
        Commands::Detections {
            pdf_file,
            page,
            output,
            ocr,
        } => {
            let settings = commands::load_settings(settings_path, &(&ocr).into())?;
            commands::detections::run(pdf_file, page, &settings, &output)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
