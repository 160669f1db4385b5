use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dineline_cli::run().await
}
