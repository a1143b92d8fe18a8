mod cli;
mod infra;
mod render;
mod routes;
mod server;

use repo_insights::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
