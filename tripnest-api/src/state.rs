use std::sync::Arc;
use std::time::Duration;

use tripnest_core::payment::{PaymentOrchestrator, SimulatedPaymentAdapter};
use tripnest_store::app_config::BusinessRules;
use tripnest_store::Repositories;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub payments: Arc<PaymentOrchestrator>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

impl AppState {
    /// State with the simulated payment provider configured from `business_rules`.
    pub fn new(repos: Repositories, auth: AuthConfig, business_rules: BusinessRules) -> Self {
        let adapter = SimulatedPaymentAdapter::new(Duration::from_millis(business_rules.payment_delay_ms));
        Self {
            repos,
            payments: Arc::new(PaymentOrchestrator::new(Arc::new(adapter))),
            auth,
            business_rules,
        }
    }
}
