use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_DATABASE_URL: &str = "sqlite://messenger.db";
const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    /// Reads `DATABASE_URL`, `MESSENGER_BIND` and `MESSENGER_MAX_CONNECTIONS`,
    /// after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let bind = lookup("MESSENGER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("MESSENGER_BIND is not a socket address: {bind}"))?;

        let max_connections = match lookup("MESSENGER_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MESSENGER_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn overrides_apply() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("MESSENGER_BIND", "127.0.0.1:8080"),
            ("MESSENGER_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config_from(&[("MESSENGER_MAX_CONNECTIONS", "lots")]).is_err());
        assert!(config_from(&[("MESSENGER_BIND", "localhost")]).is_err());
    }
}
