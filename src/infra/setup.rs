use crate::{
    adapters::{
        email::resend::ResendEmailSender,
        http::app_state::AppState,
        verifier::{HttpEmailVerifier, ProcessEmailVerifier, SkipEmailVerifier},
    },
    application::ports::email_verifier::EmailVerifier,
    infra::{
        InfraError, RateLimiterTrait,
        config::{AppConfig, VerifierConfig},
        postgres_persistence,
        rate_limit::RedisRateLimiter,
    },
    use_cases::intake::{EmailSender, IntakeUseCases, WaitlistRepo},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::fs::File;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds every process-wide resource once. The returned pool is the same one
/// the state uses, handed back so `main` can close it on shutdown.
pub async fn init_app_state(config: AppConfig) -> Result<(AppState, PgPool), InfraError> {
    let postgres = postgres_persistence(
        config.database_url.expose_secret(),
        config.run_migrations,
    )
    .await?;
    let pool = postgres.pool().clone();
    let repo = Arc::new(postgres) as Arc<dyn WaitlistRepo>;

    let verifier = build_verifier(&config.verifier)?;
    info!(verifier = verifier.name(), "Email verifier ready");

    let email = match &config.mail {
        Some(mail) => {
            let sender =
                ResendEmailSender::new(mail.resend_api_key.clone(), mail.email_from.clone())
                    .map_err(InfraError::HttpClient)?;
            Some(Arc::new(sender) as Arc<dyn EmailSender>)
        }
        None => {
            info!("Welcome email disabled");
            None
        }
    };

    let rate_limiter = match &config.redis_url {
        Some(redis_url) => {
            let limiter = RedisRateLimiter::new(
                redis_url,
                config.rate_limit_window_secs,
                config.rate_limit_per_ip,
            )
            .await?;
            Some(Arc::new(limiter) as Arc<dyn RateLimiterTrait>)
        }
        None => {
            info!("REDIS_URL not set, rate limiting disabled");
            None
        }
    };

    let intake_use_cases = IntakeUseCases::new(
        repo,
        verifier,
        email,
        config.verifier.timeout(),
        config.product_name.clone(),
        config.app_origin.to_string(),
    );

    Ok((
        AppState {
            config: Arc::new(config),
            intake_use_cases: Arc::new(intake_use_cases),
            rate_limiter,
        },
        pool,
    ))
}

pub fn build_verifier(config: &VerifierConfig) -> Result<Arc<dyn EmailVerifier>, InfraError> {
    let verifier: Arc<dyn EmailVerifier> = match config {
        VerifierConfig::Http {
            url,
            token,
            timeout,
        } => Arc::new(
            HttpEmailVerifier::new(url.clone(), token.clone(), *timeout)
                .map_err(InfraError::HttpClient)?,
        ),
        VerifierConfig::Process { command, timeout } => Arc::new(
            ProcessEmailVerifier::from_command_line(command, *timeout).ok_or(
                InfraError::ConfigInvalid {
                    var: "VERIFIER_COMMAND",
                    reason: "command is empty".into(),
                },
            )?,
        ),
        VerifierConfig::Skip => Arc::new(SkipEmailVerifier),
    };
    Ok(verifier)
}

pub fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "waitlist=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let json_layer = match File::create(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create log file {log_file}: {err}; logging to console only");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
