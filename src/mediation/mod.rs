//! UI mediation
//!
//! Watches UI-state-change notifications from one target application,
//! searches the foreground element tree for a configured text, and clicks at
//! most one matching element per notification.
//!
//! ## Example
//!
//! ```rust,ignore
//! use aura_mediator::config::MediationConfig;
//! use aura_mediator::mediation::{MediationEngine, UiStateChangeEvent};
//!
//! let config = MediationConfig::new("com.gojek.app", ["Pesan", "Order"])?;
//! let engine = MediationEngine::new(config);
//!
//! let outcome = engine.handle_event(&UiStateChangeEvent::new("com.gojek.app"), window);
//! ```

pub mod engine;
pub mod node;
pub mod search;
pub mod types;

pub use engine::MediationEngine;
pub use node::{NodeError, UiNode};
pub use types::{MatchMode, MediationOutcome, OutcomeKind, SkipReason, UiStateChangeEvent};
