use std::path::Path;

use pdffill::{FieldDefinition, FieldValues, FillOptions, FillReport, Filler, OverlayStyle};

use crate::cli::ReportFormat;
use crate::shared::{default_output, read_json, read_pdf};

/// Arguments of the `fill` subcommand.
pub struct FillArgs<'a> {
    pub file: &'a Path,
    pub values: &'a Path,
    pub fields: Option<&'a Path>,
    pub scale: Option<f64>,
    pub analysis_size: Option<(f64, f64)>,
    pub font_size: Option<f64>,
    pub lock: bool,
    pub overlay_only: bool,
    pub output: Option<&'a Path>,
    pub report: &'a ReportFormat,
}

impl FillArgs<'_> {
    fn options(&self) -> FillOptions {
        let mut options = FillOptions::default().lock_filled_fields(self.lock);
        if let Some(scale) = self.scale {
            options = options.with_scale(scale);
        }
        if let Some((width, height)) = self.analysis_size {
            options = options.with_analysis_size(width, height);
        }
        if let Some(font_size) = self.font_size {
            options = options.with_style(OverlayStyle {
                font_size,
                ..OverlayStyle::default()
            });
        }
        if self.overlay_only {
            options = options.overlay_only();
        }
        options
    }
}

pub fn run(args: &FillArgs<'_>) -> Result<(), i32> {
    let bytes = read_pdf(args.file)?;
    let values: FieldValues = read_json(args.values, "values")?;
    let definitions: Vec<FieldDefinition> = match args.fields {
        Some(path) => read_json(path, "fields")?,
        None => Vec::new(),
    };

    let filled = Filler::new(args.options())
        .fill(&bytes, &values, &definitions)
        .map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;

    let output = args
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(args.file));
    std::fs::write(&output, &filled.bytes).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", output.display());
        1
    })?;
    tracing::info!(output = %output.display(), "wrote filled document");

    match args.report {
        ReportFormat::Text => write_text(&filled.report),
        ReportFormat::Json => write_json(&filled.report)?,
    }
    Ok(())
}

fn write_text(report: &FillReport) {
    println!("field\tmode\tpage");
    for field in &report.filled {
        let page = field.page.map(|p| (p + 1).to_string()).unwrap_or_default();
        println!("{}\t{}\t{}", field.field_name, field.mode, page);
    }
    for warning in &report.warnings {
        println!("warning\t{warning}");
    }
}

fn write_json(report: &FillReport) -> Result<(), i32> {
    let json = serde_json::to_string_pretty(report).map_err(|e| {
        eprintln!("Error: failed to serialize report: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}
