use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::node::UiNode;
use super::search::{collect_candidates, first_clickable, Candidate};
use super::types::{MediationOutcome, SkipReason, UiStateChangeEvent};
use crate::config::MediationConfig;
use crate::telemetry::Telemetry;

/// Event filter, tree search and single click dispatch
///
/// One engine lives for the lifetime of the hosting service. It carries no
/// state between events apart from its configuration, and `handle_event`
/// never lets a failure escape to the caller.
pub struct MediationEngine {
    config: MediationConfig,
    telemetry: Telemetry,
}

impl MediationEngine {
    /// Create an engine that reports outcomes through `tracing`
    pub fn new(config: MediationConfig) -> Self {
        Self::with_telemetry(config, Telemetry::default())
    }

    pub fn with_telemetry(config: MediationConfig, telemetry: Telemetry) -> Self {
        tracing::info!(
            target_package = %config.target_package(),
            match_texts = ?config.match_texts(),
            match_mode = ?config.match_mode(),
            "Mediation engine created"
        );
        Self { config, telemetry }
    }

    pub fn config(&self) -> &MediationConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Handle one UI-state-change notification
    ///
    /// `current_tree` is the root of the foreground window at the time of the
    /// call. At most one `perform_click` is issued. Node handles are dropped
    /// before this returns.
    pub fn handle_event<N: UiNode>(
        &self,
        event: &UiStateChangeEvent,
        current_tree: Option<N>,
    ) -> MediationOutcome {
        let started = Instant::now();
        let outcome = self.mediate(event, current_tree);
        self.telemetry.record(event, &outcome, started.elapsed());
        outcome
    }

    /// Advisory hook called by the host when the platform interrupts the service
    pub fn on_interrupted(&self) {
        tracing::info!("Mediation interrupted by the host platform");
    }

    fn mediate<N: UiNode>(
        &self,
        event: &UiStateChangeEvent,
        current_tree: Option<N>,
    ) -> MediationOutcome {
        if event.source_package != self.config.target_package() {
            return MediationOutcome::Skipped(SkipReason::NotTargetPackage);
        }

        let Some(root) = current_tree else {
            return MediationOutcome::Skipped(SkipReason::NoActiveWindow);
        };

        tracing::debug!(package = %event.source_package, "Activity detected in target package");

        let search = panic::catch_unwind(AssertUnwindSafe(|| {
            let candidates = collect_candidates(
                root,
                self.config.match_texts(),
                self.config.match_mode(),
            );
            let found = candidates.len();
            (found, first_clickable(candidates))
        }));

        match search {
            Ok((0, _)) => MediationOutcome::NotFound,
            Ok((found, None)) => {
                tracing::debug!(found, "Matching nodes found but none is clickable");
                MediationOutcome::NoClickableMatch
            }
            Ok((_, Some(candidate))) => dispatch_click(candidate),
            Err(payload) => MediationOutcome::search_aborted(panic_message(payload.as_ref())),
        }
    }
}

fn dispatch_click<N: UiNode>(candidate: Candidate<N>) -> MediationOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| candidate.node.perform_click()));

    match result {
        Ok(Ok(true)) => MediationOutcome::Acted(candidate.text),
        Ok(Ok(false)) => MediationOutcome::ActionFailed,
        Ok(Err(e)) => MediationOutcome::ActionError(e.to_string()),
        Err(payload) => MediationOutcome::ActionError(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
