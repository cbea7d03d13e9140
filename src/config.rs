use std::{env, fmt::Display, str::FromStr};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub event_buffer: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://./data/aurora.db".to_string()),
            host: lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5),
            event_buffer: parse_or(&lookup, "EVENT_BUFFER", 64),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|err| {
            log::warn!("Invalid {key} value {raw:?} ({err}), using default {default}");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]);
        assert_eq!(config.database_url, "sqlite://./data/aurora.db");
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.event_buffer, 64);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("EVENT_BUFFER", "128"), ("BIND_HOST", "127.0.0.1")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.event_buffer, 128);
        assert_eq!(config.address(), "127.0.0.1:8080");
    }
}
