pub mod api;

use crate::agent::KaggleAgent;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    agent: Arc<KaggleAgent>,
}

impl Server {
    pub fn new(addr: String, agent: Arc<KaggleAgent>) -> Self {
        Self { addr, agent }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.agent.clone()).await
    }
}
