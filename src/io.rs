use anyhow::{ensure, Context, Result};
use glob::{glob, Pattern};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{ConverterConfig, OutputMode};
use crate::types::{Class, OutputDirs};
use crate::utils::create_output_directory;

/// File name of the dataset descriptor written next to `images` and `labels`.
pub const DATASET_YAML: &str = "data.yaml";

/// Set up the directory structure for YOLO dataset output
pub fn setup_output_directories(config: &ConverterConfig) -> std::io::Result<OutputDirs> {
    let root = config.output_dir.clone();
    let labels_dir = create_output_directory(&root.join("labels"), config.mode)?;
    let images_dir = create_output_directory(&root.join("images"), config.mode)?;

    if config.mode == OutputMode::Clean {
        let dataset_yaml_path = root.join(DATASET_YAML);
        if dataset_yaml_path.exists() {
            fs::remove_file(dataset_yaml_path)?;
        }
    }

    Ok(OutputDirs {
        train_labels_dir: create_output_directory(&labels_dir.join("train"), OutputMode::Merge)?,
        val_labels_dir: create_output_directory(&labels_dir.join("val"), OutputMode::Merge)?,
        train_images_dir: create_output_directory(&images_dir.join("train"), OutputMode::Merge)?,
        val_images_dir: create_output_directory(&images_dir.join("val"), OutputMode::Merge)?,
        root,
    })
}

/// List the `*.xml` files of the annotations directory in name order
pub fn list_annotation_files(annotations_dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(
        annotations_dir.is_dir(),
        "annotations directory {} does not exist",
        annotations_dir.display()
    );

    let xml_pattern = format!(
        "{}/*.xml",
        Pattern::escape(&annotations_dir.to_string_lossy())
    );
    let mut xml_files = glob(&xml_pattern)
        .with_context(|| format!("invalid glob pattern {}", xml_pattern))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to list {}", annotations_dir.display()))?;
    xml_files.sort();

    Ok(xml_files)
}

/// Create the data.yaml file for YOLO training
pub fn create_dataset_yaml(output_dirs: &OutputDirs) -> std::io::Result<PathBuf> {
    let dataset_yaml_path = output_dirs.root.join(DATASET_YAML);
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let absolute_path = fs::canonicalize(&output_dirs.root)?;

    let mut yaml_content = format!(
        "path: {}\ntrain: images/train\nval: images/val\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");
    for class in Class::ALL {
        yaml_content.push_str(&format!("  {}: {}\n", class.index(), class));
    }

    dataset_yaml.write_all(yaml_content.as_bytes())?;
    dataset_yaml.flush()?;
    Ok(dataset_yaml_path)
}
