use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Kaggle account user name for upstream API authentication.
    #[arg(long, env = "KAGGLE_USERNAME", default_value = "")]
    pub kaggle_username: String,

    /// Kaggle API key paired with the user name.
    #[arg(long, env = "KAGGLE_KEY", default_value = "")]
    pub kaggle_key: String,

    /// Base URL of the Kaggle public API.
    #[arg(long, env = "KAGGLE_BASE_URL", default_value = "https://www.kaggle.com/api/v1")]
    pub kaggle_base_url: String,

    /// Directory datasets are unzipped into when no explicit path is given.
    #[arg(long, env = "DOWNLOAD_DIR", default_value = "datasets")]
    pub download_dir: String,

    /// Maximum number of dataset search results returned per query.
    #[arg(long, env = "SEARCH_LIMIT", default_value = "10")]
    pub search_limit: usize,

    /// Number of rows included in a CSV sample preview.
    #[arg(long, env = "SAMPLE_ROWS", default_value = "5")]
    pub sample_rows: usize,

    /// Timeout in seconds for upstream Kaggle API requests.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,
}
