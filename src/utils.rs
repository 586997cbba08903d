use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputMode;
use crate::types::VocAnnotation;

/// Read and parse a single VOC XML file.
pub fn read_and_parse_xml(path: &Path) -> Result<VocAnnotation> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read annotation file {}", path.display()))?;
    parse_voc_xml(&content)
        .with_context(|| format!("failed to parse annotation file {}", path.display()))
}

/// Parse the content of a VOC XML file.
///
/// Fails when the image size is zero in either dimension.
pub fn parse_voc_xml(content: &str) -> Result<VocAnnotation> {
    let annotation: VocAnnotation = serde_xml_rs::from_str(content)?;
    let size = annotation.size;
    ensure!(
        size.width > 0 && size.height > 0,
        "invalid image size {}x{}",
        size.width,
        size.height
    );
    Ok(annotation)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create an output directory, emptying it first in clean mode
pub fn create_output_directory(path: &Path, mode: OutputMode) -> std::io::Result<PathBuf> {
    if mode == OutputMode::Clean && path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}
