pub mod agent;
pub mod cli;
pub mod client;
pub mod kaggle;
pub mod models;
pub mod server;
pub mod tools;

use agent::KaggleAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Kaggle API Base URL: {}", args.kaggle_base_url);
    info!("Download Directory: {}", args.download_dir);
    info!("Search Result Limit: {}", args.search_limit);
    info!("Sample Preview Rows: {}", args.sample_rows);
    info!("Upstream Timeout (s): {}", args.request_timeout_secs);
    info!("-------------------------");

    let agent = Arc::new(KaggleAgent::from_args(&args)?);
    info!("Starting server on: {}", args.server_addr);
    let server = Server::new(args.server_addr.clone(), agent);
    server.run().await?;

    Ok(())
}
