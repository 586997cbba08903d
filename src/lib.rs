//! Hard hat dataset to YOLO format converter
//!
//! This library converts the VOC XML annotations of the hard hat detection dataset to a
//! YOLO dataset. Head boxes are relabeled as persons with or without a helmet, depending
//! on whether a helmet box overlaps them.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod geometry;
pub mod io;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, ConverterConfig, OutputMode};
pub use conversion::{classify_head, convert_annotation, format_labels};
pub use dataset::{process_dataset, split_annotations};
pub use geometry::{bbox_iou, voc_to_yolo, yolo_to_voc};
pub use io::{create_dataset_yaml, setup_output_directories};
pub use types::{Class, Label, OutputDirs, ProcessingStats, Split, SplitData, VocBox, YoloBox};
