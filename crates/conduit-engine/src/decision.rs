// crates/conduit-engine/src/decision.rs
// ============================================================================
// Module: Decision Engine
// Description: Maps a task's terminal failure to a remediation action.
// Purpose: Give the Phase Manager one place to decide retry/skip/escalate/
//          rollback instead of scattering that policy across the run loop.
// Dependencies: conduit-core, conduit-logic
// ============================================================================

//! ## Overview
//! Consulted only once a task has entered `FAILED` with its retry budget
//! exhausted (the Agent Invoker already owns the in-budget retry loop).
//! Custom rules, expressed as [`conduit_logic::Requirement`] trees over
//! [`Condition`] leaves, are tried in registration order before the
//! compiled-in default table; the first rule whose predicate evaluates to
//! [`conduit_logic::TriState::True`] wins. `ROLLBACK` is never chosen by the
//! default table on its own — only a custom rule selects it, since unwinding
//! policy is delegated to a caller-supplied [`RollbackHandler`].

use conduit_core::errors::ErrorCategory;
use conduit_core::Capability;
use conduit_core::Task;
use conduit_logic::ConditionResolver;
use conduit_logic::Requirement;
use conduit_logic::TriState;

/// A leaf predicate a custom Decision Engine rule can test.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// True iff the failing task's error category equals this one.
    CategoryIs(ErrorCategory),
    /// True iff the failing task is marked `required`.
    TaskRequired,
    /// True iff the task has made at least this many attempts.
    AttemptsAtLeast(u32),
    /// True iff the task's retry budget is exhausted (`attempts > retry_budget`).
    RetryBudgetExhausted,
    /// True iff this is a repeated timeout (at least this many consecutive
    /// `Timeout` failures for the same task).
    ConsecutiveTimeoutsAtLeast(u32),
}

/// Everything a rule (default or custom) needs to decide one failing task.
pub struct DecisionContext<'a> {
    /// The error category the task's final attempt failed with.
    pub category: &'a ErrorCategory,
    /// The task that failed.
    pub task: &'a Task,
    /// Attempts made so far, including the failing one.
    pub attempts: u32,
    /// The task's configured retry budget.
    pub retry_budget: u32,
    /// Consecutive `Timeout` failures observed for this task.
    pub consecutive_timeouts: u32,
}

impl DecisionContext<'_> {
    fn budget_exhausted(&self) -> bool {
        self.attempts > self.retry_budget
    }
}

impl ConditionResolver<Condition> for DecisionContext<'_> {
    fn resolve(&self, condition: &Condition) -> TriState {
        match condition {
            Condition::CategoryIs(category) => (self.category == category).into(),
            Condition::TaskRequired => self.task.required.into(),
            Condition::AttemptsAtLeast(n) => (self.attempts >= *n).into(),
            Condition::RetryBudgetExhausted => self.budget_exhausted().into(),
            Condition::ConsecutiveTimeoutsAtLeast(n) => (self.consecutive_timeouts >= *n).into(),
        }
    }
}

/// The remediation action chosen for one failed task.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionAction {
    /// Retry after the given delay; only chosen while budget remains.
    Retry {
        /// Delay in milliseconds before the retried attempt.
        delay_ms: u64,
    },
    /// Mark this task and its transitive dependents `SKIPPED`.
    Skip,
    /// Surface this task for human attention; the Run continues around it.
    Escalate,
    /// Cancel every not-yet-started task in the Run.
    Halt,
    /// Unwind completed tasks' artifacts in LIFO order via a [`RollbackHandler`].
    Rollback,
}

/// A named custom rule: a predicate over [`Condition`] and the action to
/// take when it evaluates to [`TriState::True`].
pub struct CustomRule {
    /// Rule name, surfaced in status events for diagnostics.
    pub name: String,
    /// Predicate tried against the failing task's context.
    pub predicate: Requirement<Condition>,
    /// Action to take when the predicate is true.
    pub action: DecisionAction,
}

/// Repeated-timeout threshold past which the default table escalates instead
/// of leaving the task `SKIPPED`.
const REPEATED_TIMEOUT_THRESHOLD: u32 = 3;

/// Maps a task's terminal failure to a remediation action.
pub struct DecisionEngine {
    custom_rules: Vec<CustomRule>,
    retry_policy: conduit_core::RetryPolicy,
}

impl DecisionEngine {
    /// Builds a Decision Engine with no custom rules, using `capability`'s
    /// retry policy to compute `RETRY` delays.
    #[must_use]
    pub fn new(capability: &Capability) -> Self {
        Self { custom_rules: Vec::new(), retry_policy: capability.retry_policy }
    }

    /// Registers a custom rule, tried before the default table in registration order.
    #[must_use]
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Decides the remediation action for one failed task.
    #[must_use]
    pub fn decide(&self, ctx: &DecisionContext<'_>) -> DecisionAction {
        for rule in &self.custom_rules {
            if rule.predicate.eval(ctx).is_true() {
                return rule.action.clone();
            }
        }
        self.default_decision(ctx)
    }

    fn default_decision(&self, ctx: &DecisionContext<'_>) -> DecisionAction {
        if ctx.category.is_retryable() && !ctx.budget_exhausted() {
            return DecisionAction::Retry { delay_ms: self.retry_policy.delay_ms(ctx.attempts) };
        }
        if *ctx.category == ErrorCategory::Timeout && ctx.consecutive_timeouts >= REPEATED_TIMEOUT_THRESHOLD {
            return DecisionAction::Escalate;
        }
        match ctx.category {
            ErrorCategory::InputValidationError => DecisionAction::Escalate,
            ErrorCategory::GateFailed(_) => {
                if ctx.task.required {
                    DecisionAction::Halt
                } else {
                    DecisionAction::Skip
                }
            }
            ErrorCategory::WorkerPermanent => DecisionAction::Skip,
            _ => DecisionAction::Skip,
        }
    }
}

/// Unwinds artifacts produced by completed tasks, in LIFO order, when the
/// Decision Engine selects [`DecisionAction::Rollback`].
///
/// # Invariants
/// - No default implementation is bundled: a Run that can reach `ROLLBACK`
///   must supply one explicitly.
pub trait RollbackHandler: Send + Sync {
    /// Unwinds the given task's artifacts. Called once per completed task,
    /// most-recently-completed first.
    fn rollback(&self, task_id: &conduit_core::ids::TaskId) -> Result<(), crate::error::OrchestrationError>;
}
