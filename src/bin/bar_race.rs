use covid_bars::bar_race::{init_logger, parse_cli, run};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = parse_cli();
    init_logger(config.verbose);
    info!(
        "read data from {} and render frames to {}",
        config.csvin.display(),
        config.outdir.display()
    );
    match run(&config) {
        Ok(frames) => {
            info!("rendered {} frames", frames);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("bar_race: {}", e);
            ExitCode::FAILURE
        }
    }
}
