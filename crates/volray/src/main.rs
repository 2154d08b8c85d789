//! The volray viewer binary.

use volray::{RootDir, ROOT_ENV_VAR};

fn main() {
    env_logger::init();

    // Missing root configuration is reported to standard output before
    // exiting, so it is visible even without a logger configured.
    let config = match RootDir::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!("Error: {err}.");
            std::process::exit(1);
        }
    };
    log::info!("{ROOT_ENV_VAR} = {}", config.path().display());

    if let Err(err) = volray::show(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
