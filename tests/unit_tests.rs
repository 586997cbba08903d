use hardhat2yolo::{process_dataset, ConverterConfig, OutputMode, ProcessingStats};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

struct Fixture {
    _temp_dir: tempfile::TempDir,
    dataset_dir: PathBuf,
    output_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let dataset_dir = temp_dir.path().join("hard-hat-detection");
        let output_dir = temp_dir.path().join("yolo_dataset");
        fs::create_dir_all(dataset_dir.join("images")).unwrap();
        fs::create_dir_all(dataset_dir.join("annotations")).unwrap();
        Self {
            _temp_dir: temp_dir,
            dataset_dir,
            output_dir,
        }
    }

    fn config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::new(&self.dataset_dir, &self.output_dir);
        config.seed = Some(42);
        config
    }

    /// Add an image and its annotation. Objects are (name, xmin, ymin, xmax, ymax).
    fn add(&self, stem: &str, width: u32, height: u32, objects: &[(&str, f64, f64, f64, f64)]) {
        let filename = format!("{}.png", stem);
        fs::write(self.dataset_dir.join("images").join(&filename), stem.as_bytes()).unwrap();

        let mut xml = format!(
            "<annotation>\n  <folder>images</folder>\n  <filename>{}</filename>\n  \
             <size><width>{}</width><height>{}</height><depth>3</depth></size>\n  \
             <segmented>0</segmented>\n",
            filename, width, height
        );
        for (name, xmin, ymin, xmax, ymax) in objects {
            xml.push_str(&format!(
                "  <object>\n    <name>{}</name>\n    <pose>Unspecified</pose>\n    \
                 <truncated>0</truncated>\n    <occluded>0</occluded>\n    <difficult>0</difficult>\n    \
                 <bndbox><xmin>{}</xmin><ymin>{}</ymin><xmax>{}</xmax><ymax>{}</ymax></bndbox>\n  \
                 </object>\n",
                name, xmin, ymin, xmax, ymax
            ));
        }
        xml.push_str("</annotation>\n");
        fs::write(
            self.dataset_dir.join("annotations").join(format!("{}.xml", stem)),
            xml,
        )
        .unwrap();
    }

    fn split_of(&self, stem: &str) -> &'static str {
        let train = self.output_dir.join("labels/train").join(format!("{}.txt", stem));
        let val = self.output_dir.join("labels/val").join(format!("{}.txt", stem));
        match (train.exists(), val.exists()) {
            (true, false) => "train",
            (false, true) => "val",
            other => panic!("{} is in both or neither split: {:?}", stem, other),
        }
    }

    fn label_file(&self, stem: &str) -> String {
        let split = self.split_of(stem);
        fs::read_to_string(
            self.output_dir
                .join("labels")
                .join(split)
                .join(format!("{}.txt", stem)),
        )
        .unwrap()
    }
}

fn file_names(dir: &Path) -> HashSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_head_with_helmet_end_to_end() {
    let fixture = Fixture::new();
    fixture.add(
        "hard_hat_workers0",
        100,
        100,
        &[
            ("helmet", 10.0, 10.0, 50.0, 50.0),
            ("head", 10.0, 10.0, 50.0, 50.0),
        ],
    );

    process_dataset(&fixture.config()).unwrap();

    assert_eq!(
        fixture.label_file("hard_hat_workers0"),
        "2 0.3 0.3 0.4 0.4\n0 0.3 0.3 0.4 0.4\n"
    );
}

#[test]
fn test_head_without_helmet_end_to_end() {
    let fixture = Fixture::new();
    fixture.add("hard_hat_workers1", 100, 100, &[("head", 10.0, 10.0, 50.0, 50.0)]);

    process_dataset(&fixture.config()).unwrap();

    assert_eq!(
        fixture.label_file("hard_hat_workers1"),
        "1 0.3 0.3 0.4 0.4\n"
    );
}

#[test]
fn test_unknown_categories_are_dropped() {
    let fixture = Fixture::new();
    fixture.add(
        "hard_hat_workers2",
        200,
        100,
        &[
            ("person", 0.0, 0.0, 200.0, 100.0),
            ("head", 0.0, 0.0, 20.0, 10.0),
        ],
    );

    let stats = process_dataset(&fixture.config()).unwrap();

    assert_eq!(
        fixture.label_file("hard_hat_workers2"),
        "1 0.05 0.05 0.1 0.1\n"
    );
    assert_eq!(stats.ignored_objects, 1);
}

#[test]
fn test_full_dataset_layout() {
    let fixture = Fixture::new();
    for i in 0..10 {
        fixture.add(
            &format!("hard_hat_workers{}", i),
            416,
            416,
            &[
                ("helmet", 100.0, 100.0, 150.0, 140.0),
                ("head", 100.0, 105.0, 150.0, 150.0),
                ("head", 300.0, 300.0, 340.0, 350.0),
            ],
        );
    }

    let stats = process_dataset(&fixture.config()).unwrap();

    assert_eq!(
        stats,
        ProcessingStats {
            files_processed: 10,
            helmets: 10,
            heads_with_helmet: 10,
            heads_without_helmet: 10,
            ignored_objects: 0,
        }
    );

    let out = &fixture.output_dir;
    let train_labels = file_names(&out.join("labels/train"));
    let val_labels = file_names(&out.join("labels/val"));
    let train_images = file_names(&out.join("images/train"));
    let val_images = file_names(&out.join("images/val"));

    assert_eq!(train_labels.len(), 8);
    assert_eq!(val_labels.len(), 2);
    assert!(train_labels.is_disjoint(&val_labels));

    let stems = |names: &HashSet<String>| -> HashSet<String> {
        names
            .iter()
            .map(|name| Path::new(name).file_stem().unwrap().to_string_lossy().into_owned())
            .collect()
    };
    assert_eq!(stems(&train_labels), stems(&train_images));
    assert_eq!(stems(&val_labels), stems(&val_images));

    // images are copied unmodified
    for name in &val_images {
        let copied = fs::read(out.join("images/val").join(name)).unwrap();
        let source = fs::read(fixture.dataset_dir.join("images").join(name)).unwrap();
        assert_eq!(copied, source);
    }

    for i in 0..10 {
        let lines: Vec<_> = fixture
            .label_file(&format!("hard_hat_workers{}", i))
            .lines()
            .map(|line| line.split(' ').next().unwrap().to_string())
            .collect();
        assert_eq!(lines, vec!["2", "0", "1"]);
    }

    let yaml_content = fs::read_to_string(out.join("data.yaml")).unwrap();
    assert!(yaml_content.contains("train: images/train\n"));
    assert!(yaml_content.contains("val: images/val\n"));
    assert!(yaml_content.contains("  0: person_with_helmet\n"));
    assert!(yaml_content.contains("  3: head\n"));
}

#[test]
fn test_same_seed_gives_same_split() {
    let fixture = Fixture::new();
    for i in 0..20 {
        fixture.add(&format!("img{:02}", i), 50, 50, &[]);
    }

    let mut config = fixture.config();
    config.seed = Some(99);
    config.mode = OutputMode::Clean;

    process_dataset(&config).unwrap();
    let first = file_names(&fixture.output_dir.join("labels/val"));

    process_dataset(&config).unwrap();
    let second = file_names(&fixture.output_dir.join("labels/val"));

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}

#[test]
fn test_merge_mode_keeps_previous_output() {
    let fixture = Fixture::new();
    fixture.add("a", 10, 10, &[]);
    let config = fixture.config();

    process_dataset(&config).unwrap();
    let stale = fixture.output_dir.join("labels/train/stale.txt");
    fs::write(&stale, "").unwrap();

    process_dataset(&config).unwrap();
    assert!(stale.exists());

    let mut clean = config.clone();
    clean.mode = OutputMode::Clean;
    process_dataset(&clean).unwrap();
    assert!(!stale.exists());
}

#[test]
fn test_malformed_annotation_aborts_run() {
    let fixture = Fixture::new();
    fixture.add("good", 10, 10, &[("head", 1.0, 1.0, 5.0, 5.0)]);
    fs::write(
        fixture.dataset_dir.join("annotations/bad.xml"),
        "<annotation><filename>bad.png</filename></annotation>",
    )
    .unwrap();

    let err = process_dataset(&fixture.config()).unwrap_err();
    assert!(format!("{:#}", err).contains("bad.xml"));
    assert!(!fixture.output_dir.join("data.yaml").exists());
}

#[test]
fn test_missing_image_aborts_run() {
    let fixture = Fixture::new();
    fixture.add("lost", 10, 10, &[]);
    fs::remove_file(fixture.dataset_dir.join("images/lost.png")).unwrap();

    let err = process_dataset(&fixture.config()).unwrap_err();
    assert!(format!("{:#}", err).contains("lost.png"));
}

#[test]
fn test_zero_image_size_aborts_run() {
    let fixture = Fixture::new();
    fixture.add("flat", 0, 100, &[("head", 10.0, 10.0, 50.0, 50.0)]);

    let err = process_dataset(&fixture.config()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("flat.xml"), "{}", message);
    assert!(message.contains("invalid image size 0x100"), "{}", message);
    assert!(!fixture.output_dir.join("labels/val/flat.txt").exists());
}

#[test]
fn test_clean_mode_refuses_to_delete_input() {
    let fixture = Fixture::new();
    fixture.add("a", 10, 10, &[("head", 1.0, 1.0, 5.0, 5.0)]);

    let mut config = ConverterConfig::new(&fixture.dataset_dir, &fixture.dataset_dir);
    config.seed = Some(42);
    config.mode = OutputMode::Clean;

    let err = process_dataset(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("refusing to clean"), "{:#}", err);
    assert!(fixture.dataset_dir.join("images/a.png").exists());
    assert!(fixture.dataset_dir.join("annotations/a.xml").exists());
}

#[test]
fn test_missing_annotations_directory_aborts_run() {
    let fixture = Fixture::new();
    fs::remove_dir_all(fixture.dataset_dir.join("annotations")).unwrap();

    assert!(process_dataset(&fixture.config()).is_err());
}
