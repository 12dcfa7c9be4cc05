use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub api_url: String,
    pub csrf_ttl: Duration,
    pub http_timeout: Duration,
    pub session_idle: Duration,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("CARTE_PORT", 3000),
            bind: try_load("CARTE_BIND", "0.0.0.0".to_string()),
            api_url: try_load("CARTE_API_URL", "http://localhost:3001".to_string()),
            csrf_ttl: Duration::from_secs(try_load("CARTE_CSRF_TTL_SECS", 3000)),
            http_timeout: Duration::from_secs(try_load("CARTE_HTTP_TIMEOUT_SECS", 10)),
            session_idle: Duration::from_secs(try_load("CARTE_SESSION_IDLE_SECS", 7200)),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_falls_back() {
        assert_eq!(try_load("CARTE_TEST_SURELY_UNSET", 42u16), 42);
    }

    #[test]
    fn invalid_value_falls_back() {
        env::set_var("CARTE_TEST_BAD_PORT", "not-a-port");
        assert_eq!(try_load("CARTE_TEST_BAD_PORT", 7u16), 7);
        env::set_var("CARTE_TEST_GOOD_PORT", "8080");
        assert_eq!(try_load("CARTE_TEST_GOOD_PORT", 7u16), 8080);
    }

    #[test]
    fn address_joins_bind_and_port() {
        let config = Config {
            port: 3000,
            bind: "127.0.0.1".to_string(),
            api_url: String::new(),
            csrf_ttl: Duration::from_secs(1),
            http_timeout: Duration::from_secs(1),
            session_idle: Duration::from_secs(1),
        };
        assert_eq!(config.address(), "127.0.0.1:3000");
    }
}
