use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Fill PDF forms, or overlay values onto PDFs that have no form.
#[derive(Debug, Parser)]
#[command(name = "pdffill", about, version)]
pub struct Cli {
    /// Log each field as it is placed
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill a PDF with field values
    Fill {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON object mapping field names to values
        #[arg(long, value_name = "JSON")]
        values: PathBuf,

        /// JSON array of field definitions for overlay placement
        #[arg(long, value_name = "JSON")]
        fields: Option<PathBuf>,

        /// Analysis-to-page scale factor
        #[arg(long, conflicts_with_all = ["analysis_width", "analysis_height"])]
        scale: Option<f64>,

        /// Width of the page as the analysis step saw it
        #[arg(long, requires = "analysis_height")]
        analysis_width: Option<f64>,

        /// Height of the page as the analysis step saw it
        #[arg(long, requires = "analysis_width")]
        analysis_height: Option<f64>,

        /// Font size for overlay text (default: 10)
        #[arg(long)]
        font_size: Option<f64>,

        /// Mark filled form fields read-only
        #[arg(long)]
        lock: bool,

        /// Draw every value as an overlay, even on documents with a form
        #[arg(long)]
        overlay_only: bool,

        /// Output path. Default: filled-<name>.pdf next to the input
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        report: ReportFormat,
    },

    /// List the AcroForm fields of a PDF
    Fields {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for the fill report.
#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    /// One line per placed field or warning
    Text,
    /// JSON object
    Json,
}

/// Output format for field listings.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text
    Text,
    /// JSON array
    Json,
    /// CSV with header row
    Csv,
}
