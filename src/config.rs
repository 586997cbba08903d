use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// Command-line arguments for converting the hard hat VOC dataset to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Dataset root containing the `images` and `annotations` directories
    #[arg(short = 'd', long = "dataset_dir", default_value = "hard-hat-detection")]
    pub dataset_dir: String,

    /// Directory the YOLO dataset is written to
    #[arg(short = 'o', long = "output_dir", default_value = "yolo_dataset")]
    pub output_dir: String,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_size", default_value_t = 0.8, value_parser = validate_size)]
    pub train_size: f64,

    /// Minimum head/helmet IoU for a head to count as wearing a helmet
    #[arg(long = "iou_threshold", default_value_t = 0.3, value_parser = validate_size)]
    pub iou_threshold: f64,

    /// Seed for random shuffling; drawn from entropy when omitted
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// What to do with output left by a previous run
    #[arg(long = "mode", value_enum, default_value = "merge")]
    pub mode: OutputMode,

    /// Number of decimals written for label values
    #[arg(long = "precision")]
    pub precision: Option<usize>,
}

// How existing output is treated
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputMode {
    /// Remove previous images, labels and data.yaml before converting
    Clean,
    /// Keep previous output and overwrite files with the same name
    #[default]
    Merge,
}

// Validate that the size is between 0.0 and 1.0
fn validate_size(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0".to_string()),
    }
}

/// Settings of one conversion run, independent of the command line.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub dataset_dir: PathBuf,
    pub output_dir: PathBuf,
    pub train_size: f64,
    pub iou_threshold: f64,
    pub seed: Option<u64>,
    pub mode: OutputMode,
    pub precision: Option<usize>,
}

impl ConverterConfig {
    pub const DEFAULT_TRAIN_SIZE: f64 = 0.8;
    pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

    pub fn new(dataset_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            output_dir: output_dir.into(),
            train_size: Self::DEFAULT_TRAIN_SIZE,
            iou_threshold: Self::DEFAULT_IOU_THRESHOLD,
            seed: None,
            mode: OutputMode::default(),
            precision: None,
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dataset_dir.join("images")
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.dataset_dir.join("annotations")
    }
}

impl From<&Args> for ConverterConfig {
    fn from(args: &Args) -> Self {
        Self {
            dataset_dir: PathBuf::from(&args.dataset_dir),
            output_dir: PathBuf::from(&args.output_dir),
            train_size: args.train_size,
            iou_threshold: args.iou_threshold,
            seed: args.seed,
            mode: args.mode,
            precision: args.precision,
        }
    }
}
