use clap::Parser;
use seterm::core::config::{self, ResolvedConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{self, File};

#[derive(Parser)]
#[command(
    name = "seterm",
    version,
    about = "Minimal terminal emulator: a prompt line that runs commands through bash"
)]
struct Args {}

fn main() -> std::io::Result<()> {
    let _args = Args::parse();

    // Config is read before the logger exists, so its error is logged afterwards
    let (config, config_error) = match config::load_config() {
        Ok(file_config) => (config::resolve(&file_config), None),
        Err(e) => (ResolvedConfig::default(), Some(e)),
    };

    // Initialize file logger - writes to ~/.seterm/seterm.log
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Some(dir) = config::app_dir()
        && fs::create_dir_all(&dir).is_ok()
        && let Ok(log_file) = File::create(dir.join("seterm.log"))
    {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("Ignoring config file, using defaults: {}", e);
    }
    log::info!(
        "seterm starting up (command timeout: {:?})",
        config.command_timeout
    );

    seterm::tui::run(config)
}
