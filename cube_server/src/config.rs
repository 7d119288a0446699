use anyhow::{Context, Result};
use std::env;

pub const ENV_VAR_BIND_ADDR: &str = "CUBE_BIND_ADDR";

pub const ENV_VAR_CNODE_COUNT: &str = "CUBE_CNODE_COUNT";

pub fn default_bind_addr() -> &'static str {
    "127.0.0.1:3300"
}

pub const DEFAULT_CNODE_COUNT: usize = 16;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cnode_count: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            env::var(ENV_VAR_BIND_ADDR).unwrap_or_else(|_| default_bind_addr().to_string());
        let cnode_count = match env::var(ENV_VAR_CNODE_COUNT) {
            Err(_) => DEFAULT_CNODE_COUNT,
            Ok(s) => s
                .parse()
                .with_context(|| format!("{ENV_VAR_CNODE_COUNT}={s} is not a count"))?,
        };
        Ok(Self {
            bind_addr,
            cnode_count,
        })
    }
}
