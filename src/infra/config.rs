use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use super::InfraError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnv::Production),
            "development" | "dev" | "test" => Ok(AppEnv::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Which deliverability check the form path runs.
#[derive(Debug)]
pub enum VerifierConfig {
    /// Third-party verification API reached over HTTP.
    Http {
        url: Url,
        token: SecretString,
        timeout: Duration,
    },
    /// Local checker script, email passed as the last argument.
    Process { command: String, timeout: Duration },
    /// Accept every well-formed address.
    Skip,
}

impl VerifierConfig {
    pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
    pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn timeout(&self) -> Duration {
        match self {
            VerifierConfig::Http { timeout, .. } | VerifierConfig::Process { timeout, .. } => {
                *timeout
            }
            VerifierConfig::Skip => Duration::from_secs(1),
        }
    }
}

pub struct MailConfig {
    pub resend_api_key: SecretString,
    pub email_from: String,
}

pub struct AppConfig {
    pub env: AppEnv,
    pub bind_addr: SocketAddr,
    pub database_url: SecretString,
    pub run_migrations: bool,
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    /// Brand used in response messages and the welcome email.
    pub product_name: String,
    pub verifier: VerifierConfig,
    /// `None` disables the welcome email.
    pub mail: Option<MailConfig>,
    /// `None` disables rate limiting.
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy.
    pub trust_proxy: bool,
    /// Built frontend to serve for non-API paths.
    pub static_dir: Option<PathBuf>,
    pub log_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let env: AppEnv = parse_var("APP_ENV", "development")?;

        let database_url = SecretString::new(required("DATABASE_URL")?.into());
        let run_migrations: bool = get_env_default("RUN_MIGRATIONS", true);

        let mut bind_addr: SocketAddr = parse_var("BIND_ADDR", "0.0.0.0:5000")?;
        if let Some(port) = optional("PORT") {
            let port: u16 = port.parse().map_err(|_| InfraError::ConfigInvalid {
                var: "PORT",
                reason: format!("'{port}' is not a port number"),
            })?;
            bind_addr.set_port(port);
        }

        let app_origin: Url = parse_var("APP_ORIGIN", "http://localhost:5173")?;
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:5173"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "CORS_ORIGIN",
                    reason: "not a valid header value".into(),
                })?;
        let product_name: String = get_env_default("PRODUCT_NAME", "Qlue".to_string());

        let verifier = verifier_from_env()?;

        let welcome_email_enabled: bool = get_env_default("WELCOME_EMAIL_ENABLED", true);
        let mail = if welcome_email_enabled {
            Some(MailConfig {
                resend_api_key: SecretString::new(required("RESEND_API_KEY")?.into()),
                email_from: required("EMAIL_FROM")?,
            })
        } else {
            None
        };

        let redis_url = optional("REDIS_URL");
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 900);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 100);
        // Default to false - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let static_dir = optional("STATIC_DIR").map(PathBuf::from);
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());

        Ok(Self {
            env,
            bind_addr,
            database_url,
            run_migrations,
            app_origin,
            cors_origin,
            product_name,
            verifier,
            mail,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
            static_dir,
            log_file,
        })
    }

    /// Error responses carry a `details` field outside production.
    pub fn expose_error_details(&self) -> bool {
        self.env != AppEnv::Production
    }
}

fn verifier_from_env() -> Result<VerifierConfig, InfraError> {
    let mode = get_env_default("EMAIL_VERIFIER", "http".to_string());
    let timeout_override = optional("VERIFIER_TIMEOUT_SECS")
        .map(|secs| {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "VERIFIER_TIMEOUT_SECS",
                    reason: format!("'{secs}' is not a number of seconds"),
                })
        })
        .transpose()?;

    match mode.trim().to_lowercase().as_str() {
        "http" => {
            let raw_url = required("VERIFIER_URL")?;
            let url = Url::parse(&raw_url).map_err(|e| InfraError::ConfigInvalid {
                var: "VERIFIER_URL",
                reason: e.to_string(),
            })?;
            Ok(VerifierConfig::Http {
                url,
                token: SecretString::new(
                    get_env_default("VERIFIER_TOKEN", "12345".to_string()).into(),
                ),
                timeout: timeout_override.unwrap_or(VerifierConfig::DEFAULT_HTTP_TIMEOUT),
            })
        }
        "process" => Ok(VerifierConfig::Process {
            command: get_env_default("VERIFIER_COMMAND", "python3 email-check.py".to_string()),
            timeout: timeout_override.unwrap_or(VerifierConfig::DEFAULT_PROCESS_TIMEOUT),
        }),
        "skip" | "none" => Ok(VerifierConfig::Skip),
        other => Err(InfraError::ConfigInvalid {
            var: "EMAIL_VERIFIER",
            reason: format!("expected http, process or skip, got '{other}'"),
        }),
    }
}

/// Blank values count as unset.
fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Missing required variables surface as `InfraError`, never a panic.
fn required(var: &'static str) -> Result<String, InfraError> {
    optional(var).ok_or(InfraError::ConfigMissing { var })
}

fn parse_var<T>(var: &'static str, default: &str) -> Result<T, InfraError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = optional(var).unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|e: T::Err| InfraError::ConfigInvalid {
        var,
        reason: e.to_string(),
    })
}
