pub mod api;

use crate::cli::Args;
use crate::handler::ChatHandler;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    handler: Arc<ChatHandler>,
    args: Args,
}

impl Server {
    pub fn new(
        addr: String,
        handler: Arc<ChatHandler>,
        args: Args,
    ) -> Self {
        Self {
            addr,
            handler,
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(
            &self.addr,
            self.handler.clone(),
            &self.args,
        ).await
    }
}
