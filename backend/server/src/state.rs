use std::sync::Arc;

use anyhow::Result;
use graph::{Gateway, upstream::UpstreamGateway};

use super::config::Config;

pub struct State {
    pub config: Config,
    pub gateway: Arc<dyn Gateway>,
}

impl State {
    pub fn new() -> Result<Arc<Self>> {
        let config = Config::load()?;

        let gateway = Arc::new(UpstreamGateway::new(config.upstream.clone())?);

        Ok(Arc::new(Self { config, gateway }))
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn Gateway>) -> Arc<Self> {
        Arc::new(Self { config, gateway })
    }
}
