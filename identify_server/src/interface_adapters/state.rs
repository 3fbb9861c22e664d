use crate::domain::IdentifyTransport;
use crate::use_cases::IdentifySettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // We use Arc<dyn Trait> to hold any implementation (dependency injection).
    pub transport: Arc<dyn IdentifyTransport>,
    pub settings: Arc<IdentifySettings>,
}
