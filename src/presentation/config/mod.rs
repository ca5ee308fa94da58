mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    DatabaseProvider, DatabaseSettings, DurationRangeSettings, LoggingSettings, SchedulerSettings,
    ServerSettings, Settings, WorkloadSettings,
};
