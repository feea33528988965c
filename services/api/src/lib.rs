mod cli;
mod creators;
mod demo;
mod infra;
mod routes;
mod server;

use matchly::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
