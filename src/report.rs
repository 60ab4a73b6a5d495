//! Read-only reports over a directory of annotation bundles (native only).
//!
//! These back the `stats`, `flagged`, `coverage` and `export-csv` commands.
//! Bundle files are never modified; unreadable entries and files are logged and skipped.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::error::ViewerError;
use crate::model::AnnotationBundle;

/// Match a file name against a `prefix*suffix` pattern.
///
/// A pattern without `*` must match exactly.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => name == pattern,
    }
}

/// Find bundle files under a directory, sorted by path.
pub fn find_bundle_files(
    dir: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, ViewerError> {
    if !dir.is_dir() {
        return Err(ViewerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file()
            && matches_pattern(&entry.file_name().to_string_lossy(), pattern)
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::debug!("Found {} bundle files in {:?}", files.len(), dir);
    Ok(files)
}

/// A bundle read from disk.
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    /// Source file
    pub path: PathBuf,
    /// Image id from the bundle, else derived from the file name
    pub image_id: String,
    /// Parsed contents
    pub bundle: AnnotationBundle,
}

impl LoadedBundle {
    /// Read and parse one bundle file.
    pub fn read(path: &Path) -> Result<Self, ViewerError> {
        let text = std::fs::read_to_string(path)?;
        let bundle = AnnotationBundle::from_json(&text)?;
        let image_id = bundle
            .image
            .as_ref()
            .map(|image| image.id.clone())
            .unwrap_or_else(|| id_from_file_name(path));
        Ok(Self {
            path: path.to_path_buf(),
            image_id,
            bundle,
        })
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn id_from_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_suffix("_annotations")
        .map(str::to_string)
        .unwrap_or(stem)
}

/// Read every file, skipping the ones that fail.
pub fn load_bundles(files: &[PathBuf]) -> Vec<LoadedBundle> {
    files
        .iter()
        .filter_map(|path| match LoadedBundle::read(path) {
            Ok(loaded) => Some(loaded),
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                None
            }
        })
        .collect()
}

/// Counts over a set of bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    /// Bundles read successfully
    pub files_processed: usize,
    /// Model entries across all bundles
    pub total_annotations: usize,
    /// Model entries per model name
    pub model_counts: BTreeMap<String, usize>,
}

impl AnnotationStats {
    /// Count model entries.
    pub fn from_bundles(bundles: &[LoadedBundle]) -> Self {
        let mut stats = Self {
            files_processed: bundles.len(),
            ..Self::default()
        };
        for loaded in bundles {
            for annotation in &loaded.bundle.annotations {
                *stats.model_counts.entry(annotation.model.clone()).or_default() += 1;
                stats.total_annotations += 1;
            }
        }
        stats
    }

    /// Model names, sorted.
    pub fn models(&self) -> Vec<&str> {
        self.model_counts.keys().map(String::as_str).collect()
    }
}

/// A prompt result that carries quality flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedAnnotation {
    /// Source file name
    pub file: String,
    /// Image id
    pub image_id: String,
    /// Model name
    pub model: String,
    /// Prompt key
    pub prompt_key: String,
    /// Flags as recorded
    pub flags: Vec<String>,
    /// Response length in characters
    pub response_length: usize,
    /// Generation error, if any
    pub error: Option<String>,
}

/// List prompt results with recorded quality flags.
pub fn list_flagged(bundles: &[LoadedBundle]) -> Vec<FlaggedAnnotation> {
    let mut flagged = Vec::new();
    for loaded in bundles {
        for annotation in &loaded.bundle.annotations {
            for (key, prompt) in &annotation.prompts {
                if prompt.quality_flags.is_empty() {
                    continue;
                }
                flagged.push(FlaggedAnnotation {
                    file: loaded.file_name(),
                    image_id: loaded.image_id.clone(),
                    model: annotation.model.clone(),
                    prompt_key: key.clone(),
                    flags: prompt.quality_flags.clone(),
                    response_length: prompt.response.chars().count(),
                    error: prompt.error.clone(),
                });
            }
        }
    }
    flagged
}

/// Expected prompt keys some models lack within one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    /// Image id
    pub image_id: String,
    /// Model name to the expected keys it lacks, in expected order
    pub missing: IndexMap<String, Vec<String>>,
}

/// For each bundle, the expected prompt keys each model has no result for.
/// Bundles without gaps are left out.
pub fn coverage_gaps(bundles: &[LoadedBundle], expected: &[String]) -> Vec<CoverageGap> {
    bundles
        .iter()
        .filter_map(|loaded| {
            let mut missing = IndexMap::new();
            for annotation in &loaded.bundle.annotations {
                let lacking: Vec<String> = expected
                    .iter()
                    .filter(|key| !annotation.has_prompt(key))
                    .cloned()
                    .collect();
                if !lacking.is_empty() {
                    // Duplicate model entries: the first one is reported
                    missing
                        .entry(annotation.model.clone())
                        .or_insert(lacking);
                }
            }

            (!missing.is_empty()).then(|| CoverageGap {
                image_id: loaded.image_id.clone(),
                missing,
            })
        })
        .collect()
}

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    quoted.join(",")
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write one row per (image, model, prompt). Returns the number of data rows.
pub fn write_csv<W: Write>(
    writer: &mut W,
    bundles: &[LoadedBundle],
    include_metrics: bool,
) -> Result<usize, ViewerError> {
    let mut header: Vec<String> = ["image_id", "image_path", "model", "prompt_type", "response"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if include_metrics {
        header.extend(
            ["input_tokens", "output_tokens", "total_tokens", "generation_duration_ms"]
                .iter()
                .map(|s| s.to_string()),
        );
    }
    writeln!(writer, "{}", csv_row(&header))?;

    let mut rows = 0;
    for loaded in bundles {
        let image_path = loaded
            .bundle
            .image
            .as_ref()
            .and_then(|image| image.path.clone())
            .unwrap_or_default();

        for annotation in &loaded.bundle.annotations {
            for (key, prompt) in &annotation.prompts {
                let mut fields = vec![
                    loaded.image_id.clone(),
                    image_path.clone(),
                    annotation.model.clone(),
                    key.clone(),
                    prompt.response.clone(),
                ];
                if include_metrics {
                    let tokens = prompt.token_metrics.unwrap_or_default();
                    let perf = prompt.performance_metrics.unwrap_or_default();
                    fields.push(opt_cell(tokens.input_tokens));
                    fields.push(opt_cell(tokens.output_tokens));
                    fields.push(opt_cell(tokens.total_tokens));
                    fields.push(opt_cell(perf.generation_duration_ms));
                }
                writeln!(writer, "{}", csv_row(&fields))?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    Ok(rows)
}
