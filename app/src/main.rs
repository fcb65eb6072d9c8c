use std::process;

use strata_cli::CliControl;
use strata_framework::Registries;

mod components;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let registries = Registries::new();
    if let Err(error) = components::register(&registries) {
        log::error!("{error}");
        eprintln!("error: {error}");
        process::exit(1);
    }

    let control = CliControl::new(&registries);
    process::exit(control.start());
}
