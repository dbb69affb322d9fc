//! Output file naming.
//!
//! `/in/sample.ome.tif` with suffix `_FILTERED` and extension `ome.tiff`
//! becomes `<output_dir>/sample_FILTERED.ome.tiff`. Both the true extension
//! and a trailing format token such as `.ome` are stripped before the suffix
//! is added, and a stem that already ends with the suffix is not suffixed
//! again, so feeding an output path back through yields the same path.

use std::path::{Path, PathBuf};

/// Secondary format tokens stripped regardless of the target extension.
const FORMAT_TOKENS: &[&str] = &["ome"];

/// Derive the output path for `input_path`.
///
/// # Arguments
/// * `input_path` - Source image; only its file name is used
/// * `output_dir` - Directory the output is placed in
/// * `suffix` - Appended to the stem, e.g. `_FILTERED`
/// * `target_extension` - Extension without leading dot, e.g. `ome.tiff`
pub fn resolve(
    input_path: &Path,
    output_dir: &Path,
    suffix: &str,
    target_extension: &str,
) -> PathBuf {
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut stem = strip_extension(&file_name);

    let secondary: Vec<&str> = {
        let mut tokens: Vec<&str> = target_extension.split('.').collect();
        tokens.pop();
        tokens.extend_from_slice(FORMAT_TOKENS);
        tokens
    };
    for token in secondary {
        if let Some(stripped) = stem
            .strip_suffix(token)
            .and_then(|s| s.strip_suffix('.'))
            .filter(|s| !s.is_empty())
        {
            stem = stripped;
            break;
        }
    }

    let mut name = stem.to_string();
    if !stem.ends_with(suffix) {
        name.push_str(suffix);
    }
    name.push('.');
    name.push_str(target_extension);

    output_dir.join(name)
}

/// Drop the last `.ext`, leaving dotfiles and extensionless names alone.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(pos) => &file_name[..pos],
    }
}
