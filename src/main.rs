use clap::Parser;
use log::info;

use astronotes::{App, Cli, Config};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let mut config = Config::default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
