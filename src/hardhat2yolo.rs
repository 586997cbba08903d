use clap::Parser;
use log::{error, info};

use hardhat2yolo::{process_dataset, Args, ConverterConfig};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ConverterConfig::from(&args);

    if !config.dataset_dir.exists() {
        error!(
            "The specified dataset_dir does not exist: {}",
            args.dataset_dir
        );
        std::process::exit(1);
    }

    info!("Starting the conversion process...");

    match process_dataset(&config) {
        Ok(_) => info!("Preprocessing done."),
        Err(e) => {
            error!("Failed to process dataset: {:?}", e);
            std::process::exit(1);
        }
    }
}
