use crate::client::{ApiError, WaterClient};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::controller::{ControllerOptions, DashboardController};
use crate::fallback::{FallbackData, SampleData};
use crate::models::Settings;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type Dashboard = DashboardController<WaterClient>;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub fallback: Arc<dyn FallbackData>,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<Mutex<Settings>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Arc::new(WaterClient::new(config.api_base.clone())?);
        let fallback: Arc<dyn FallbackData> = Arc::new(SampleData);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let settings = Settings::default();

        let dashboard = DashboardController::new(
            client,
            Arc::clone(&fallback),
            Arc::clone(&clock),
            ControllerOptions {
                tag: config.tag.clone(),
                refresh_every: config.refresh_every,
                drink_amount_ml: f64::from(settings.default_drink_amount),
                policy: config.policy,
            },
        );

        Ok(Self {
            dashboard: Arc::new(dashboard),
            fallback,
            clock,
            settings: Arc::new(Mutex::new(settings)),
        })
    }
}
