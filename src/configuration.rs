use config::ConfigError;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub session: SessionSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Deployment environment. Only `production` changes behaviour (secure cookies).
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Upper bound for waiting on a pooled connection inside a request.
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// JWT signing settings, read once at startup.
#[derive(Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    pub issuer: String,
}

impl JwtSettings {
    /// Access token lifetime. Values past chrono's range saturate; `validate`
    /// refuses them at startup.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.access_token_expiry_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.refresh_token_expiry_days).unwrap_or(chrono::Duration::MAX)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        check_lifetime(
            "jwt.access_token_expiry_minutes",
            self.access_token_expiry_minutes,
            chrono::Duration::try_minutes(self.access_token_expiry_minutes),
        )?;
        check_lifetime(
            "jwt.refresh_token_expiry_days",
            self.refresh_token_expiry_days,
            chrono::Duration::try_days(self.refresh_token_expiry_days),
        )
    }
}

/// A lifetime must be positive and keep `now + lifetime` representable.
fn check_lifetime(
    key: &str,
    value: i64,
    lifetime: Option<chrono::Duration>,
) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::Message(format!("{} must be positive", key)));
    }
    lifetime
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .map(|_| ())
        .ok_or_else(|| ConfigError::Message(format!("{} is out of range", key)))
}

#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    pub mode: SessionMode,
}

/// Whether refresh tokens are tracked server-side.
///
/// Fixed for the lifetime of the process.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Stateless,
    #[serde(alias = "jwt_server_stateful")]
    Stateful,
}

impl SessionMode {
    pub fn is_stateful(&self) -> bool {
        matches!(self, SessionMode::Stateful)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()
    }
}

/// Load settings from defaults, an optional `configuration.*` file and
/// `APP__`-prefixed environment variables, in increasing priority.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 9000)?
        .set_default("application.environment", "local")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "password")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.database_name", "session_auth")?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("jwt.access_token_expiry_minutes", 15)?
        .set_default("jwt.refresh_token_expiry_days", 7)?
        .set_default("jwt.issuer", "session-auth")?
        .set_default("session.mode", "stateless")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
