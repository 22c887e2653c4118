mod datasource;
mod model;
mod utils;

use std::{env, sync::Arc, thread};

use anyhow::Result;
use log::{error, info};

use crate::{
    datasource::{
        board_config::BoardConfig,
        file_path::{BOARD_CONFIG_FILE, HINT_NODE, INTERACTIVE_NODE},
        node_monitor::{monitor_hints, monitor_interactive},
    },
    model::{coordinator::{ConstraintCoordinator, QosWriter}, plugin::PowerHal},
    utils::{log_monitor::monitor_log_level, logger::init_logger},
};

const NOTES: &str = "Tegra Ardbeg Power HAL";
const VERSION: &str = "Version: v1.3";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "-h" => {
                println!("{NOTES}");
                println!("Usage:");
                println!("\t-v show version");
                println!("\t-h show help");
                return Ok(());
            }
            "-v" => {
                println!("{NOTES}");
                println!("{VERSION}");
                return Ok(());
            }
            other => {
                println!("Unknown argument: {other}");
                println!("Use -h for help");
                return Ok(());
            }
        }
    }

    init_logger()?;

    info!("{NOTES}");
    info!("{VERSION}");

    let config = BoardConfig::load(BOARD_CONFIG_FILE);

    // Discovery runs to completion before any hint source exists
    let coordinator: Arc<dyn ConstraintCoordinator> = Arc::new(QosWriter::new()?);
    let hal = Arc::new(PowerHal::init(&config, coordinator));

    info!("LP cluster max: {}KHz", hal.catalog().lp_max());
    info!("CPU0 max: {}KHz", hal.catalog().cpu0_max());
    info!("Interaction boost: {}KHz", hal.catalog().interaction_boost());
    info!("Animation boost: {}KHz", hal.catalog().animation_boost());
    info!("Hint node: {HINT_NODE}");
    info!("Interactive node: {INTERACTIVE_NODE}");

    // The device boots with the screen on
    hal.set_interactive(true);

    let hal_clone = hal.clone();
    thread::spawn(move || {
        if let Err(e) = monitor_interactive(hal_clone) {
            error!("Interactive monitor error: {e}");
        }
    });

    thread::spawn(move || {
        if let Err(e) = monitor_log_level() {
            error!("Log level monitor error: {e}");
        }
    });

    info!("Power HAL Started");

    monitor_hints(hal)
}
