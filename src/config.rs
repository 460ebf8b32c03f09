use crate::error::{Result, ServiceError};
use crate::model::{seed_users, NewUser};

pub const HOST_ENV: &str = "USER_REGISTRY_HOST";
pub const PORT_ENV: &str = "USER_REGISTRY_PORT";

pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Records loaded into the store at startup, ids assigned from 1.
    pub seed: Vec<NewUser>,
    pub port: Option<u16>,
    pub host: String,
}

impl ServiceConfig {
    pub fn new(seed: Vec<NewUser>) -> Self {
        Self {
            seed,
            port: None,
            host: "127.0.0.1".to_string(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_users())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Reads the bind address from `USER_REGISTRY_HOST` and
    /// `USER_REGISTRY_PORT`, falling back to `0.0.0.0:8080`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with an explicit variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(HOST_ENV)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ServiceError::InvalidConfig(format!("{PORT_ENV} must be a port number, got {raw:?}"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self::seeded().with_host(host).with_port(port))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_seed(mut self, seed: Vec<NewUser>) -> Self {
        self.seed = seed;
        self
    }

    pub(crate) fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::seeded()
    }
}
