//! droid-screen - Android device table and mirroring session monitor
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use dscreen_app::config::init_config_dir;
use dscreen_core::prelude::*;
use droid_screen::HeadlessOptions;

/// droid-screen - Android device table and mirroring session monitor
#[derive(Parser, Debug)]
#[command(name = "dscreen")]
#[command(about = "Tracks Android devices and their mirroring sessions", long_about = None)]
struct Args {
    /// Directory holding .droid-screen/config.toml
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Run one discovery pass, print the device table and exit
    #[arg(long)]
    once: bool,

    /// Show every device as soon as it connects
    #[arg(long)]
    show_all: bool,

    /// Label language for the table headers (english, swedish, german)
    #[arg(long, value_name = "LANGUAGE")]
    language: Option<String>,

    /// adb command or path
    #[arg(long, value_name = "ADB")]
    adb: Option<String>,

    /// Write a default .droid-screen/config.toml and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Get base path from args or use current directory
    let base_path = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init {
        init_config_dir(&base_path)?;
        eprintln!(
            "Config written to {}",
            base_path.join(".droid-screen").join("config.toml").display()
        );
        return Ok(());
    }

    let options = HeadlessOptions {
        once: args.once,
        show_all: args.show_all,
        language: args.language,
        adb: args.adb,
    };

    droid_screen::run(&base_path, options).await
}
