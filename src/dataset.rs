use anyhow::{bail, ensure, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

use crate::config::{ConverterConfig, OutputMode};
use crate::conversion::process_annotations;
use crate::io::{create_dataset_yaml, list_annotation_files, setup_output_directories};
use crate::types::{OutputDirs, ProcessingStats, Split, SplitData};
use crate::utils::create_progress_bar;

/// Shuffle the annotation files and split them into training and validation sets.
///
/// The first `floor(len * train_size)` shuffled files go to training. The same seed and
/// input order always give the same split.
pub fn split_annotations(mut xml_files: Vec<PathBuf>, train_size: f64, seed: u64) -> SplitData {
    let mut rng = StdRng::seed_from_u64(seed);
    xml_files.shuffle(&mut rng);

    let train_len = ((xml_files.len() as f64 * train_size).floor() as usize).min(xml_files.len());
    let val_files = xml_files.split_off(train_len);

    SplitData {
        train_files: xml_files,
        val_files,
    }
}

/// Process both splits in order, train first.
pub fn process_all_annotations(
    split_data: &SplitData,
    output_dirs: &OutputDirs,
    config: &ConverterConfig,
) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();

    for (split, label) in [(Split::Train, "Train"), (Split::Val, "Val")] {
        let xml_files = split_data.files(split);
        let pb = create_progress_bar(xml_files.len() as u64, label);
        match process_annotations(xml_files, split, output_dirs, config, &pb) {
            Ok(split_stats) => {
                pb.finish_with_message(format!("{} processing complete", label));
                stats.merge(&split_stats);
            }
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        }
    }

    Ok(stats)
}

/// Refuse a clean run whose deletions would reach the input images or annotations.
pub fn check_clean_target(config: &ConverterConfig) -> Result<()> {
    if config.mode != OutputMode::Clean {
        return Ok(());
    }

    let inputs = [config.images_dir(), config.annotations_dir()]
        .into_iter()
        .filter(|dir| dir.exists())
        .map(|dir| {
            fs::canonicalize(&dir).with_context(|| format!("failed to resolve {}", dir.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    for name in ["images", "labels"] {
        let target = config.output_dir.join(name);
        if !target.exists() {
            continue;
        }
        let target = fs::canonicalize(&target)
            .with_context(|| format!("failed to resolve {}", target.display()))?;
        if let Some(input) = inputs.iter().find(|input| input.starts_with(&target)) {
            bail!(
                "refusing to clean {}: it contains the input directory {}",
                target.display(),
                input.display()
            );
        }
    }

    Ok(())
}

/// Main dataset processing pipeline
pub fn process_dataset(config: &ConverterConfig) -> Result<ProcessingStats> {
    let images_dir = config.images_dir();
    ensure!(
        images_dir.is_dir(),
        "images directory {} does not exist",
        images_dir.display()
    );

    let xml_files = list_annotation_files(&config.annotations_dir())?;
    info!("Found {} annotation files.", xml_files.len());

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Splitting with seed {}.", seed);
    let split_data = split_annotations(xml_files, config.train_size, seed);
    info!(
        "Train: {} files, val: {} files.",
        split_data.train_files.len(),
        split_data.val_files.len()
    );

    check_clean_target(config)?;
    let output_dirs = setup_output_directories(config).with_context(|| {
        format!(
            "failed to set up output directories in {}",
            config.output_dir.display()
        )
    })?;

    let stats = process_all_annotations(&split_data, &output_dirs, config)?;

    info!("Creating data.yaml file...");
    let dataset_yaml_path =
        create_dataset_yaml(&output_dirs).context("failed to create data.yaml")?;
    info!("Wrote {}", dataset_yaml_path.display());

    stats.print_summary();
    Ok(stats)
}
