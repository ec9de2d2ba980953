use std::path::Path;

use pdffill::FormFieldInfo;

use crate::cli::OutputFormat;
use crate::shared::{csv_escape, read_pdf};

pub fn run(file: &Path, format: &OutputFormat) -> Result<(), i32> {
    let bytes = read_pdf(file)?;
    let fields = pdffill::form_fields(&bytes).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    match format {
        OutputFormat::Text => write_text(&fields),
        OutputFormat::Json => write_json(&fields)?,
        OutputFormat::Csv => write_csv(&fields),
    }
    Ok(())
}

/// 1-based page number, empty when the field has no widget on a page.
fn page_label(field: &FormFieldInfo) -> String {
    field
        .page_index
        .map(|p| (p + 1).to_string())
        .unwrap_or_default()
}

fn write_text(fields: &[FormFieldInfo]) {
    println!("page\tname\ttype\tvalue\toptions\tflags");
    for field in fields {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            page_label(field),
            field.name,
            field.kind,
            field.value.as_deref().unwrap_or(""),
            field.options.join("; "),
            field.flags,
        );
    }
}

fn field_to_json(field: &FormFieldInfo) -> serde_json::Value {
    serde_json::json!({
        "page": field.page_index.map(|p| p + 1),
        "name": field.name,
        "type": field.kind.as_str(),
        "value": field.value,
        "options": field.options,
        "flags": field.flags,
        "read_only": field.is_read_only(),
        "bbox": field.bbox.map(|b| [b.x0, b.top, b.x1, b.bottom]),
    })
}

fn write_json(fields: &[FormFieldInfo]) -> Result<(), i32> {
    let all: Vec<_> = fields.iter().map(field_to_json).collect();
    let json = serde_json::to_string(&all).map_err(|e| {
        eprintln!("Error: failed to serialize fields: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}

fn write_csv(fields: &[FormFieldInfo]) {
    println!("page,name,type,value,options,flags");
    for field in fields {
        println!(
            "{},{},{},{},{},{}",
            page_label(field),
            csv_escape(&field.name),
            field.kind,
            csv_escape(field.value.as_deref().unwrap_or("")),
            csv_escape(&field.options.join("; ")),
            field.flags,
        );
    }
}
