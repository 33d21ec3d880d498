// Entry point: loads config, renders one topography from the command line.
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use topomap::cli::Args;
use topomap::core::electrodes;
use topomap::{TopoConfig, Topomap};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    if args.list_electrodes {
        for label in electrodes::labels() {
            if let Some(p) = electrodes::lookup(label) {
                println!("{label:>5} {:>8.4} {:>8.4}", p.x, p.y);
            }
        }
        return ExitCode::SUCCESS;
    }

    if args.write_config {
        return match TopoConfig::write_template(&args.config) {
            Ok(()) => {
                info!("Wrote default config to {}", args.config);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        };
    }

    let mut config = TopoConfig::load_or_default(&args.config);
    if let Some(path) = args.output.as_deref() {
        config = config.with_output_path(path);
    }

    let result = Topomap::new(config)
        .and_then(|topo| topo.render(&args.electrodes, &args.values, args.grid_size));
    match result {
        Ok(figure) => {
            info!(
                electrodes = figure.electrodes.len(),
                grid = figure.field.width(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
