use std::process::ExitCode;

use mptt_urls_cli::{execute_from_command_line, ViewRegistry};

#[tokio::main]
async fn main() -> ExitCode {
    match execute_from_command_line(std::env::args_os(), ViewRegistry::new()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
