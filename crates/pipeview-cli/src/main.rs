use pipeview_core::logging;

mod cli;

fn main() {
    // Initialize logging as early as possible; stderr is only a fallback
    // because it carries the status line.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::debug!("file logging unavailable: {:#}", err);
    }

    match cli::run_from_args() {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("pipeview error: {:#}", err);
            std::process::exit(1);
        }
    }
}
