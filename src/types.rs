use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Category name of a head box in the source annotations.
pub const HEAD: &str = "head";
/// Category name of a helmet box in the source annotations.
pub const HELMET: &str = "helmet";

// The <annotation> root of a VOC XML file
#[derive(Debug, Deserialize, Clone)]
pub struct VocAnnotation {
    pub filename: String,
    pub size: Size,
    #[serde(rename = "object", default)]
    pub objects: Vec<VocObject>,
}

// Image size as recorded in the annotation
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

// One <object> entry
#[derive(Debug, Deserialize, Clone)]
pub struct VocObject {
    pub name: String,
    pub bndbox: VocBox,
}

/// Box in absolute pixel coordinates.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct VocBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl VocBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn area(&self) -> f64 {
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }
}

/// Box as center and extent, each relative to the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// The fixed class taxonomy of the generated dataset.
///
/// The discriminant is the class index written to label files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Class {
    PersonWithHelmet = 0,
    PersonWithoutHelmet = 1,
    Helmet = 2,
    Head = 3,
}

impl Class {
    pub const ALL: [Class; 4] = [
        Class::PersonWithHelmet,
        Class::PersonWithoutHelmet,
        Class::Helmet,
        Class::Head,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Class::PersonWithHelmet => "person_with_helmet",
            Class::PersonWithoutHelmet => "person_without_helmet",
            Class::Helmet => "helmet",
            Class::Head => "head",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of a YOLO label file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub class: Class,
    pub bbox: YoloBox,
}

/// Which half of the dataset a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

// Struct to hold the paths to the output directories for train/val splits
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

impl OutputDirs {
    pub fn labels_dir(&self, split: Split) -> &PathBuf {
        match split {
            Split::Train => &self.train_labels_dir,
            Split::Val => &self.val_labels_dir,
        }
    }

    pub fn images_dir(&self, split: Split) -> &PathBuf {
        match split {
            Split::Train => &self.train_images_dir,
            Split::Val => &self.val_images_dir,
        }
    }
}

// Annotation files assigned to the training and validation sets
#[derive(Debug, Clone, Default)]
pub struct SplitData {
    pub train_files: Vec<PathBuf>,
    pub val_files: Vec<PathBuf>,
}

impl SplitData {
    pub fn files(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train_files,
            Split::Val => &self.val_files,
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub helmets: usize,
    pub heads_with_helmet: usize,
    pub heads_without_helmet: usize,
    pub ignored_objects: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.files_processed += other.files_processed;
        self.helmets += other.helmets;
        self.heads_with_helmet += other.heads_with_helmet;
        self.heads_without_helmet += other.heads_without_helmet;
        self.ignored_objects += other.ignored_objects;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Annotation files processed: {}", self.files_processed);
        log::info!("Helmets: {}", self.helmets);
        log::info!("Heads with helmet: {}", self.heads_with_helmet);
        log::info!("Heads without helmet: {}", self.heads_without_helmet);
        if self.ignored_objects > 0 {
            log::info!(
                "Objects with other category names (ignored): {}",
                self.ignored_objects
            );
        }
    }
}
