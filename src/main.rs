//! `pyro [config.json]`: open a window and set off fireworks where you click.

use pyro::{AppConfig, Simulation};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}: {e}", path.to_string_lossy());
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    if let Err(e) = Simulation::from_config(config).run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
