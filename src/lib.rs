pub mod bridge;
pub mod config;
pub mod error;
pub mod mediation;
pub mod platform;
pub mod service;
pub mod telemetry;

pub use config::{Config, MediationConfig};
pub use error::{MediatorError, Result};
pub use mediation::{MediationEngine, MediationOutcome, UiNode, UiStateChangeEvent};
pub use service::{MediatorService, ServiceSummary};
