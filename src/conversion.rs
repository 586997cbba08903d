use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::geometry::{bbox_iou, voc_to_yolo};
use crate::types::{
    Class, Label, OutputDirs, ProcessingStats, Split, VocAnnotation, VocBox, VocObject, HEAD,
    HELMET,
};
use crate::utils::read_and_parse_xml;

/// Head and helmet boxes of one image, in annotation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketedObjects {
    pub heads: Vec<VocBox>,
    pub helmets: Vec<VocBox>,
    pub ignored: usize,
}

/// Sort objects into heads and helmets. Any other category is dropped.
pub fn bucket_objects(objects: &[VocObject]) -> BucketedObjects {
    let mut buckets = BucketedObjects::default();
    for object in objects {
        match object.name.trim() {
            HEAD => buckets.heads.push(object.bndbox),
            HELMET => buckets.helmets.push(object.bndbox),
            _ => buckets.ignored += 1,
        }
    }
    buckets
}

/// Decide whether a head wears a helmet.
///
/// Any helmet reaching the threshold is enough; the search stops at the first one.
pub fn classify_head(head: &VocBox, helmets: &[VocBox], iou_threshold: f64) -> Class {
    let has_helmet = helmets
        .iter()
        .any(|helmet| bbox_iou(head, helmet) >= iou_threshold);

    if has_helmet {
        Class::PersonWithHelmet
    } else {
        Class::PersonWithoutHelmet
    }
}

/// Derive the YOLO labels of one annotation: every helmet first, then every head.
pub fn convert_annotation(
    annotation: &VocAnnotation,
    iou_threshold: f64,
) -> (Vec<Label>, ProcessingStats) {
    let BucketedObjects {
        heads,
        helmets,
        ignored,
    } = bucket_objects(&annotation.objects);

    let mut stats = ProcessingStats {
        files_processed: 1,
        helmets: helmets.len(),
        ignored_objects: ignored,
        ..ProcessingStats::default()
    };

    let mut labels = Vec::with_capacity(helmets.len() + heads.len());
    labels.extend(helmets.iter().map(|helmet| Label {
        class: Class::Helmet,
        bbox: voc_to_yolo(helmet, annotation.size),
    }));

    for head in &heads {
        let class = classify_head(head, &helmets, iou_threshold);
        match class {
            Class::PersonWithHelmet => stats.heads_with_helmet += 1,
            _ => stats.heads_without_helmet += 1,
        }
        labels.push(Label {
            class,
            bbox: voc_to_yolo(head, annotation.size),
        });
    }

    (labels, stats)
}

/// Render labels as the lines of a YOLO label file.
///
/// Without a precision each value is written in its shortest exact form.
pub fn format_labels(labels: &[Label], precision: Option<usize>) -> String {
    let mut yolo_data = String::with_capacity(labels.len() * 64);

    for label in labels {
        yolo_data.push_str(&format!("{}", label.class.index()));
        for value in [label.bbox.cx, label.bbox.cy, label.bbox.w, label.bbox.h] {
            match precision {
                Some(precision) => yolo_data.push_str(&format!(" {:.*}", precision, value)),
                None => yolo_data.push_str(&format!(" {}", value)),
            }
        }
        yolo_data.push('\n');
    }

    yolo_data
}

/// Output file names for the image referenced by an annotation.
///
/// Returns the image file name and the label file name.
pub fn output_file_names(image_filename: &str) -> Result<(String, String)> {
    let path = Path::new(image_filename);
    let (Some(file_name), Some(stem)) = (path.file_name(), path.file_stem()) else {
        bail!("invalid image file name '{}'", image_filename);
    };

    let image_name = sanitize_filename::sanitize(file_name.to_string_lossy());
    let label_name = format!("{}.txt", sanitize_filename::sanitize(stem.to_string_lossy()));
    Ok((image_name, label_name))
}

/// Convert a single annotation file, copying its image and writing its label file.
pub fn process_annotation(
    xml_path: &Path,
    split: Split,
    output_dirs: &OutputDirs,
    config: &ConverterConfig,
) -> Result<ProcessingStats> {
    let annotation = read_and_parse_xml(xml_path)?;
    let (image_name, label_name) = output_file_names(&annotation.filename)
        .with_context(|| format!("in annotation file {}", xml_path.display()))?;

    // Copy the image file
    let image_path = config.images_dir().join(&annotation.filename);
    let image_output_path = output_dirs.images_dir(split).join(&image_name);
    fs::copy(&image_path, &image_output_path).with_context(|| {
        format!(
            "failed to copy image {} referenced by {}",
            image_path.display(),
            xml_path.display()
        )
    })?;

    // Generate label file
    let (labels, stats) = convert_annotation(&annotation, config.iou_threshold);
    let label_output_path = output_dirs.labels_dir(split).join(&label_name);
    fs::write(
        &label_output_path,
        format_labels(&labels, config.precision),
    )
    .with_context(|| {
        format!(
            "failed to write label file {}",
            label_output_path.display()
        )
    })?;

    debug!(
        "{} -> {} ({} labels)",
        xml_path.display(),
        label_output_path.display(),
        labels.len()
    );

    Ok(stats)
}

/// Process the annotation files of one split in order, stopping at the first failure.
pub fn process_annotations(
    xml_files: &[PathBuf],
    split: Split,
    output_dirs: &OutputDirs,
    config: &ConverterConfig,
    pb: &ProgressBar,
) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();
    for xml_path in xml_files {
        let file_stats = process_annotation(xml_path, split, output_dirs, config)?;
        stats.merge(&file_stats);
        pb.inc(1);
    }
    Ok(stats)
}
