use std::sync::Arc;

use crate::application::services::{Dispatcher, JobService};

#[derive(Clone)]
pub struct AppState {
    pub job_service: Arc<JobService>,
    pub dispatcher: Arc<Dispatcher>,
}
