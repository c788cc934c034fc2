use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    pool_creator::start(std::env::args()).await
}
