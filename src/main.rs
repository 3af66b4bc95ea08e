use clap::Parser;
use issue_metrics::cli::Cli;
use issue_metrics::format::OutputContext;
use issue_metrics::logging::init_logging;
use issue_metrics::{StructuredError, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("error: failed to initialize logging: {err:#}");
        return ExitCode::from(1);
    }

    let ctx = OutputContext::from_flags(cli.json, cli.quiet);
    let project_dir = std::env::current_dir().unwrap_or_default();

    match run(&cli, &project_dir, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let structured = StructuredError::from_error(&err);
            if ctx.is_json() {
                match serde_json::to_string_pretty(&serde_json::json!({ "error": &structured })) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("error: {}", structured.message),
                }
            } else {
                eprintln!("error: {}", structured.message);
                if let Some(hint) = &structured.hint {
                    eprintln!("hint: {hint}");
                }
            }
            ExitCode::from(structured.exit_code)
        }
    }
}
