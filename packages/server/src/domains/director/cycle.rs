//! Cycle orchestrator.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use agones_client::Allocation;
use futures::FutureExt;
use open_match_api::Match;

use super::{assign_tickets, build_profile, fetch_matches, function_config};
use crate::common::panic_message;
use crate::config::DirectorConfig;
use crate::kernel::DirectorDeps;

/// Everything a cycle needs from configuration.
#[derive(Debug, Clone)]
pub struct DirectorSettings {
    pub profile_name: String,
    pub pool_names: Vec<String>,
    pub match_function_host: String,
    pub match_function_port: u16,
    pub fetch_timeout: Duration,
    pub assign_timeout: Duration,
}

impl From<&DirectorConfig> for DirectorSettings {
    fn from(config: &DirectorConfig) -> Self {
        Self {
            profile_name: config.profile_name.clone(),
            pool_names: config.pool_names.clone(),
            match_function_host: config.match_function_host.clone(),
            match_function_port: config.match_function_port,
            fetch_timeout: config.fetch_timeout,
            assign_timeout: config.assign_timeout,
        }
    }
}

/// Where one match ended up. `Allocated` is only ever an intermediate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    AllocationFailed { reason: String },
    Assigned { connection: String },
    AssignmentFailed { connection: String },
}

impl MatchOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }
}

enum MatchState {
    Pending,
    Allocated(Allocation),
    Done(MatchOutcome),
}

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub assigned: usize,
    pub allocation_failures: usize,
    pub assignment_failures: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::Assigned { .. } => self.assigned += 1,
            MatchOutcome::AllocationFailed { .. } => self.allocation_failures += 1,
            MatchOutcome::AssignmentFailed { .. } => self.assignment_failures += 1,
        }
    }
}

pub struct Director {
    deps: DirectorDeps,
    settings: DirectorSettings,
}

impl Director {
    pub fn new(deps: DirectorDeps, settings: DirectorSettings) -> Self {
        Self { deps, settings }
    }

    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }

    /// Fetch, then allocate and assign each match in order.
    pub async fn run_cycle(&self) -> CycleReport {
        let profile = build_profile(&self.settings.profile_name, &self.settings.pool_names);
        let config = function_config(
            &self.settings.match_function_host,
            self.settings.match_function_port,
        );

        let matches = fetch_matches(
            self.deps.backend.as_ref(),
            config,
            profile,
            self.settings.fetch_timeout,
        )
        .await;

        let mut report = CycleReport {
            fetched: matches.len(),
            ..Default::default()
        };

        if matches.is_empty() {
            tracing::debug!("No matches this cycle");
            return report;
        }

        tracing::info!(count = matches.len(), "Processing matches");
        for m in &matches {
            let outcome = match AssertUnwindSafe(self.process_match(m)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    tracing::error!(
                        match_id = %m.match_id,
                        panic = %reason,
                        "Match processing panicked, skipping match"
                    );
                    MatchOutcome::AllocationFailed { reason }
                }
            };
            report.record(&outcome);
        }

        tracing::info!(
            fetched = report.fetched,
            assigned = report.assigned,
            allocation_failures = report.allocation_failures,
            assignment_failures = report.assignment_failures,
            "Cycle complete"
        );
        report
    }

    /// Drive one match to a terminal outcome.
    pub async fn process_match(&self, m: &Match) -> MatchOutcome {
        let mut state = MatchState::Pending;

        loop {
            state = match state {
                MatchState::Pending => match self.deps.allocator.allocate().await {
                    Ok(allocation) => {
                        tracing::info!(
                            match_id = %m.match_id,
                            fleet = self.deps.allocator.fleet(),
                            connection = %allocation.connection(),
                            game_server = allocation.game_server_name.as_deref().unwrap_or(""),
                            "Allocated game server"
                        );
                        MatchState::Allocated(allocation)
                    }
                    Err(e) => {
                        tracing::error!(
                            match_id = %m.match_id,
                            fleet = self.deps.allocator.fleet(),
                            error = %e,
                            "Game server allocation failed, skipping match"
                        );
                        MatchState::Done(MatchOutcome::AllocationFailed {
                            reason: e.to_string(),
                        })
                    }
                },
                MatchState::Allocated(allocation) => {
                    let connection = allocation.connection();
                    let assigned = assign_tickets(
                        self.deps.backend.as_ref(),
                        m,
                        &connection,
                        self.settings.assign_timeout,
                    )
                    .await;

                    if assigned {
                        tracing::info!(
                            match_id = %m.match_id,
                            tickets = m.tickets.len(),
                            connection = %connection,
                            "Assigned tickets"
                        );
                        MatchState::Done(MatchOutcome::Assigned { connection })
                    } else {
                        tracing::error!(
                            match_id = %m.match_id,
                            connection = %connection,
                            "Ticket assignment failed"
                        );
                        MatchState::Done(MatchOutcome::AssignmentFailed { connection })
                    }
                }
                MatchState::Done(outcome) => return outcome,
            };
        }
    }
}
