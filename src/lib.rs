pub mod config;
pub mod logic;
pub mod model;
pub mod store;

pub use logic::{
    CommitError, DirectorReassignmentStaging, Field, ReconciliationCommitter, ScheduleError,
    ScheduleWindowValidator, StepGate, SubmitError, SubmitOutcome, WizardSession, WizardStep,
};

pub use model::*;

pub use store::{HttpBackend, InstitutionBackend, MemoryBackend};

/// Initialise env_logger. `RUST_LOG` wins over `default_level`; HTTP client
/// internals are capped at warn.
pub fn init_logging(default_level: &str) {
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .try_init();
}
