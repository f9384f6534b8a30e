use std::sync::Arc;

use crate::{
    infra::{RateLimiterTrait, config::AppConfig},
    use_cases::intake::IntakeUseCases,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub intake_use_cases: Arc<IntakeUseCases>,
    /// `None` when no Redis is configured.
    pub rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
}
