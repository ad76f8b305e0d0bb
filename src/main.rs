// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `poseviz` command-line entry point.

use std::process;

use clap::Parser;

use poseviz::cli::args::{Cli, Commands};
use poseviz::cli::render::run_render;
use poseviz::error;

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Render(args) => run_render(args),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}
