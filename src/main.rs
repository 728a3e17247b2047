use std::process::ExitCode;

use s3_image_upload::cli::{self, Cli};
use s3_image_upload::core::WorkflowError;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(e) = cli::init_logging(cli.verbose, cli.debug) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<WorkflowError>() {
            Some(failure) => {
                tracing::debug!(stage = ?failure.stage(), "workflow failed");
                println!("{}", failure);
                ExitCode::from(failure.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
