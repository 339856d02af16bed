use sqlx::postgres::PgConnectOptions;
use std::borrow::Cow;
use std::time::Duration;

use crate::error::DbError;

/// Database configuration with `Cow` for flexible string handling
#[derive(Debug, Clone)]
pub struct DbConfig<'a> {
    pub host: Cow<'a, str>,
    pub port: u16,
    pub database: Cow<'a, str>,
    pub user: Cow<'a, str>,
    pub password: Cow<'a, str>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl<'a> DbConfig<'a> {
    /// Create new database configuration
    pub fn new(
        host: impl Into<Cow<'a, str>>,
        port: u16,
        database: impl Into<Cow<'a, str>>,
        user: impl Into<Cow<'a, str>>,
        password: impl Into<Cow<'a, str>>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Set max connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set how long a request may wait for a pooled connection
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Connection options for the pool. Built field by field so credentials
    /// never need URL escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// Read `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS` from the process
    /// environment, falling back to defaults for anything unset.
    pub fn from_env() -> Result<DbConfig<'static>, DbError> {
        DbConfig::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<DbConfig<'static>, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DbConfig::default();

        let port = parse_var(&lookup, "DB_PORT", defaults.port)?;
        let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let acquire_secs =
            parse_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout.as_secs())?;

        if max_connections == 0 {
            return Err(DbError::Config("DB_MAX_CONNECTIONS must be at least 1".into()));
        }

        let mut config = DbConfig::new(
            lookup("DB_HOST").unwrap_or_else(|| defaults.host.into_owned()),
            port,
            lookup("DB_NAME").unwrap_or_else(|| defaults.database.into_owned()),
            lookup("DB_USER").unwrap_or_else(|| defaults.user.into_owned()),
            lookup("DB_PASSWORD").unwrap_or_default(),
        );
        config.max_connections = max_connections;
        config.acquire_timeout = Duration::from_secs(acquire_secs);

        Ok(config)
    }
}

impl<'a> Default for DbConfig<'a> {
    fn default() -> Self {
        Self {
            host: Cow::Borrowed("localhost"),
            port: 5432,
            database: Cow::Borrowed("patients"),
            user: Cow::Borrowed("postgres"),
            password: Cow::Borrowed(""),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, DbError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DbError::Config(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}
