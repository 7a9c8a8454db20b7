use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2voc::{process_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting LabelMe to VOC conversion process...");

    match process_dataset(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to create dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
