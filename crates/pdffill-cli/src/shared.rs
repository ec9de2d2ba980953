use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Read a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing
/// or unreadable.
pub fn read_pdf(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })
}

/// Read and parse a JSON input file.
pub fn read_json<T: DeserializeOwned>(file: &Path, what: &str) -> Result<T, i32> {
    let text = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("Error: failed to read {what} file {}: {e}", file.display());
        1
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: invalid {what} JSON in {}: {e}", file.display());
        1
    })
}

/// Default output path: `filled-<name>.pdf` in the input's directory.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("filled-{stem}.pdf"))
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
