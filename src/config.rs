use crate::result::{Result, ScriptError};

pub const ENV_HOST: &str = "POSTGRES_HOST";
pub const ENV_PORT: &str = "POSTGRES_PORT";
pub const ENV_DATABASE: &str = "POSTGRES_DATABASE";
pub const ENV_USER: &str = "POSTGRES_USER";
pub const ENV_PASSWORD: &str = "POSTGRES_PASSWORD";

pub const DEFAULT_PORT: u16 = 5432;

/// Variables that must be set (and non-empty) to connect
pub const REQUIRED_VARS: [&str; 4] = [ENV_HOST, ENV_DATABASE, ENV_USER, ENV_PASSWORD];

/// Help text listing every connection variable
pub const ENV_HELP: &str = "Please set the following environment variables:
  - POSTGRES_HOST
  - POSTGRES_PORT (optional, defaults to 5432)
  - POSTGRES_DATABASE
  - POSTGRES_USER
  - POSTGRES_PASSWORD";

/// PostgreSQL connection settings read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl PostgresConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ScriptError::new_missing_environment(missing));
        }

        let port = match get(ENV_PORT) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ScriptError::InvalidPort {
                    variable: ENV_PORT.to_string(),
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: get(ENV_HOST).unwrap_or_default(),
            port,
            database: get(ENV_DATABASE).unwrap_or_default(),
            user: get(ENV_USER).unwrap_or_default(),
            password: get(ENV_PASSWORD).unwrap_or_default(),
        })
    }

    /// Build the tokio-postgres connection configuration
    #[cfg(feature = "postgresql")]
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(&self.password);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_HOST, "db.internal"),
            (ENV_DATABASE, "netflix"),
            (ENV_USER, "loader"),
            (ENV_PASSWORD, "s3cret"),
        ]
    }

    #[test]
    fn test_from_lookup_defaults_port() {
        let config = PostgresConfig::from_lookup(lookup_from(&full_env())).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, "netflix");
        assert_eq!(config.user, "loader");
        assert_eq!(config.password, "s3cret");
    }

    #[test]
    fn test_from_lookup_explicit_port() {
        let mut env = full_env();
        env.push((ENV_PORT, "6543"));
        let config = PostgresConfig::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.port, 6543);
    }

    #[test]
    fn test_from_lookup_invalid_port() {
        let mut env = full_env();
        env.push((ENV_PORT, "not-a-port"));
        let err = PostgresConfig::from_lookup(lookup_from(&env)).unwrap_err();
        match err {
            ScriptError::InvalidPort { variable, value } => {
                assert_eq!(variable, ENV_PORT);
                assert_eq!(value, "not-a-port");
            }
            other => panic!("Expected InvalidPort, got {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_lists_missing_variables_in_order() {
        let env = [(ENV_HOST, "localhost"), (ENV_USER, "")];
        let err = PostgresConfig::from_lookup(lookup_from(&env)).unwrap_err();
        match &err {
            ScriptError::MissingEnvironment { missing } => {
                assert_eq!(missing, &vec![ENV_DATABASE, ENV_USER, ENV_PASSWORD]);
            }
            other => panic!("Expected MissingEnvironment, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: POSTGRES_DATABASE, POSTGRES_USER, POSTGRES_PASSWORD"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = PostgresConfig::from_lookup(lookup_from(&full_env())).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("s3cret"));
    }

    #[cfg(feature = "postgresql")]
    #[test]
    fn test_to_pg_config() {
        let config = PostgresConfig::from_lookup(lookup_from(&full_env())).unwrap();
        let pg = config.to_pg_config();
        assert_eq!(pg.get_ports(), &[DEFAULT_PORT]);
        assert_eq!(pg.get_dbname(), Some("netflix"));
        assert_eq!(pg.get_user(), Some("loader"));
        assert_eq!(pg.get_password(), Some("s3cret".as_bytes()));
    }
}
