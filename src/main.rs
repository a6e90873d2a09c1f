// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, build the configuration, hand both
//   to the upload flow in `ui`.
// - Every failure ends up here and becomes a stderr message plus exit code.

use clap::Parser;
use ilab_attach::{cli::Args, config::Config, error::AttachError, logging, ui};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn execute(args: Args) -> Result<(), AttachError> {
    let config = Config::from_env(&args.api_base)?;
    let request = args.into_request()?;
    ui::run(&config, &request)
}
