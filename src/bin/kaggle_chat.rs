use clap::{ Parser, Subcommand };
use dotenv::dotenv;
use kaggle_bridge::client::{ html, ChatApiClient };
use serde_json::Value as JsonValue;
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the Kaggle bridge server", long_about = None)]
struct Cli {
    /// Base URL of the Kaggle bridge server.
    #[arg(long, env = "SERVER_URL", default_value = "http://localhost:8000")]
    server_url: String,

    /// Render results as HTML tables instead of pretty-printed JSON.
    #[arg(long, default_value = "false")]
    html: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search Kaggle for datasets matching a query.
    Search {
        query: String,
    },
    /// Fetch metadata for a dataset (owner/dataset-name).
    Dataset {
        name: String,
        /// Include a sample preview of the first CSV file.
        #[arg(long, default_value = "false")]
        sample: bool,
    },
    /// Fetch metadata for a competition.
    Competition {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut client = ChatApiClient::new(cli.server_url.clone());
    let (response, render): (_, fn(&JsonValue) -> String) = match &cli.command {
        Command::Search { query } => {
            (client.search_datasets(query).await?, html::render_search_results)
        }
        Command::Dataset { name, sample } => {
            (client.get_dataset_info(name, *sample).await?, html::render_dataset_info)
        }
        Command::Competition { name } => {
            (client.get_competition_info(name).await?, html::render_competition_info)
        }
    };

    println!("{}", response.message.content);
    let context = response.message.context.unwrap_or_else(|| serde_json::json!({}));
    if cli.html {
        println!("{}", render(&context));
    } else {
        println!("{}", serde_json::to_string_pretty(&context)?);
    }

    Ok(())
}
