//! `sphere-menu`: open a window with a spherical menu built from a TOML
//! item list.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use sphere_menu::{MenuConfig, Viewer};

#[derive(Parser, Debug)]
#[command(name = "sphere-menu", about = "Spherical item menu viewer")]
struct Cli {
    /// Menu definition: `[[items]]` plus an optional `[options]` table.
    /// Without it a single placeholder item is shown.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Overrides `options.scale` (camera distance and card size).
    #[arg(long)]
    scale: Option<f32>,

    /// Overrides `options.cell_size` (atlas cell edge in pixels).
    #[arg(long)]
    cell_size: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match cli.items.as_deref().map(MenuConfig::load) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::error!("cannot read menu definition: {e}");
            return ExitCode::FAILURE;
        }
        None => MenuConfig::default(),
    };
    if let Some(scale) = cli.scale {
        config.options.scale = scale;
    }
    if let Some(cell_size) = cli.cell_size {
        config.options.cell_size = cell_size.max(1);
    }

    match Viewer::builder().with_config(config).build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
