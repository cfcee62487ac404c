//! `Filler`: the recursive backtracker that ties `Bank` and `FillState` together and reports to a
//! `FillListener`.
//!
//! The search branches on *which word* to try in the single most-constrained unfilled slot, never
//! on *which slot* to try next -- different slot orderings fall out implicitly as recursion
//! advances committed letters. See `Filler::walk` for the one-slot-per-level rule.

use std::collections::HashSet;
use std::time::Duration;

use instant::Instant;
use log::{info, trace};

use crate::answer::most_constrained_first_key;
use crate::bank::Bank;
use crate::error::BankError;
use crate::fill_state::FillState;
use crate::types::SlotIndex;

/// What a listener decides after observing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Stop,
}

/// The built-in slot orderings a `Filler` can be configured with. Rather than accepting arbitrary
/// closures (which would need to be `Debug`/`Clone` to keep `FillConfig` itself inspectable), the
/// core exposes the orderings it actually knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSortKey {
    /// `(-normalized_strength, length)`: most letters already known first, ties broken by the
    /// shorter slot. The default, and the only ordering most callers ever need.
    MostConstrainedFirst,
}

/// Every tunable knob the core recognizes, gathered onto one value instead of scattered across
/// function signatures.
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Stop after visiting this many nodes.
    pub node_threshold: Option<usize>,
    /// Stop after this wall-clock budget has elapsed.
    pub duration_threshold: Option<Duration>,
    /// Bank indexing cap, honored by [`build_bank`] when it constructs a `Bank` on the caller's
    /// behalf. Has no effect on a `Bank` the caller already built and handed to `Filler::new`.
    pub pattern_registry_cap: usize,
    /// Slot visitation order.
    pub slot_sort_key: SlotSortKey,
}

impl Default for FillConfig {
    fn default() -> FillConfig {
        FillConfig {
            node_threshold: None,
            duration_threshold: None,
            pattern_registry_cap: crate::bank::DEFAULT_PATTERN_REGISTRY_CAP,
            slot_sort_key: SlotSortKey::MostConstrainedFirst,
        }
    }
}

/// Build a `Bank` honoring `config.pattern_registry_cap`. A convenience for callers who don't
/// otherwise need to construct their own `Bank`.
pub fn build_bank(
    words: impl IntoIterator<Item = impl AsRef<str>>,
    config: &FillConfig,
) -> Result<Bank, BankError> {
    Bank::with_registry(words, config.pattern_registry_cap)
}

/// Node-count and wall-clock budget shared by every listener.
#[derive(Debug)]
pub struct Budget {
    node_threshold: Option<usize>,
    duration_threshold: Option<Duration>,
    start: Instant,
    count: usize,
}

impl Budget {
    #[must_use]
    pub fn new(node_threshold: Option<usize>, duration_threshold: Option<Duration>) -> Budget {
        Budget {
            node_threshold,
            duration_threshold,
            start: Instant::now(),
            count: 0,
        }
    }

    /// Record a visited node and report whether the budget is now exhausted. Checks the
    /// threshold before incrementing: once `count` has already reached `node_threshold`, the
    /// next node is refused outright (its count never advances), so `node_count()` settles at
    /// exactly the threshold rather than one past it.
    fn tick(&mut self) -> ControlFlow {
        if let Some(threshold) = self.node_threshold {
            if self.count >= threshold {
                return ControlFlow::Stop;
            }
        }
        if let Some(threshold) = self.duration_threshold {
            if self.start.elapsed() >= threshold {
                return ControlFlow::Stop;
            }
        }
        self.count += 1;
        ControlFlow::Continue
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A node visited during the search: the state at that point, and its depth (number of
/// commitments made since the root). Handed to the optional tracer callback.
#[derive(Debug, Clone)]
pub struct FillStateNode {
    pub state: FillState,
    pub depth: usize,
}

/// The observer that decides when a fill should stop, and (via whichever concrete type
/// implements this trait) what result comes out the other end.
///
/// `accept` is the non-overridable entry point the `Filler` calls exactly once per visited node:
/// it applies the node/duration budget first and only then defers to `check_state`, the
/// overridable decision point. Implementors should not override `accept`.
pub trait FillListener {
    fn budget(&self) -> &Budget;
    fn budget_mut(&mut self) -> &mut Budget;

    /// The overridable decision point: given a freshly-visited state (budget aside), continue or
    /// stop.
    fn check_state(&mut self, state: &FillState) -> ControlFlow;

    fn accept(&mut self, state: &FillState) -> ControlFlow {
        if self.budget_mut().tick() == ControlFlow::Stop {
            return ControlFlow::Stop;
        }
        self.check_state(state)
    }
}

/// Stops at the first complete state found.
#[derive(Debug)]
pub struct FirstComplete {
    budget: Budget,
    solution: Option<FillState>,
}

impl FirstComplete {
    #[must_use]
    pub fn new(node_threshold: Option<usize>, duration_threshold: Option<Duration>) -> FirstComplete {
        FirstComplete {
            budget: Budget::new(node_threshold, duration_threshold),
            solution: None,
        }
    }

    /// The solution found, if any, consuming the listener.
    #[must_use]
    pub fn into_solution(self) -> Option<FillState> {
        self.solution
    }
}

impl FillListener for FirstComplete {
    fn budget(&self) -> &Budget {
        &self.budget
    }
    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
    fn check_state(&mut self, state: &FillState) -> ControlFlow {
        if state.is_complete() {
            self.solution = Some(state.clone());
            ControlFlow::Stop
        } else {
            ControlFlow::Continue
        }
    }
}

/// Accumulates every complete state reached, never stopping early (budget aside).
#[derive(Debug)]
pub struct AllComplete {
    budget: Budget,
    solutions: Vec<FillState>,
}

impl AllComplete {
    #[must_use]
    pub fn new(node_threshold: Option<usize>, duration_threshold: Option<Duration>) -> AllComplete {
        AllComplete {
            budget: Budget::new(node_threshold, duration_threshold),
            solutions: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_solutions(self) -> Vec<FillState> {
        self.solutions
    }
}

impl FillListener for AllComplete {
    fn budget(&self) -> &Budget {
        &self.budget
    }
    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
    fn check_state(&mut self, state: &FillState) -> ControlFlow {
        if state.is_complete() {
            self.solutions.push(state.clone());
        }
        ControlFlow::Continue
    }
}

/// The recursive backtracker. Borrows a `Bank` so the same bank can drive many independent fills.
pub struct Filler<'a> {
    bank: &'a Bank,
    config: FillConfig,
    tracer: Option<Box<dyn Fn(&FillStateNode)>>,
}

impl<'a> Filler<'a> {
    #[must_use]
    pub fn new(bank: &'a Bank, config: FillConfig) -> Filler<'a> {
        Filler {
            bank,
            config,
            tracer: None,
        }
    }

    /// Attach a callback invoked once per visited node, before the listener is consulted.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Box<dyn Fn(&FillStateNode)>) -> Filler<'a> {
        self.tracer = Some(tracer);
        self
    }

    /// Run the search from `state`, reporting every visited node to `listener`.
    pub fn fill<L: FillListener>(&self, state: FillState, listener: &mut L) {
        let outcome = self.walk(state, listener, 0);
        if outcome == ControlFlow::Stop {
            info!(
                "fill stopped after visiting {} nodes",
                listener.budget().node_count()
            );
        }
    }

    fn unfilled_slots(&self, state: &FillState) -> Vec<SlotIndex> {
        match self.config.slot_sort_key {
            SlotSortKey::MostConstrainedFirst => state.provide_unfilled(most_constrained_first_key),
        }
    }

    fn walk<L: FillListener>(&self, state: FillState, listener: &mut L, depth: usize) -> ControlFlow {
        if let Some(tracer) = &self.tracer {
            let node = FillStateNode {
                state: state.clone(),
                depth,
            };
            tracer(&node);
        }
        trace!("visiting node at depth {depth}");

        if listener.accept(&state) == ControlFlow::Stop {
            return ControlFlow::Stop;
        }

        // Single-slot-per-level: only ever the first (most constrained) unfilled slot is tried at
        // this depth. Do not loop over further slot candidates here.
        let unfilled = self.unfilled_slots(&state);
        if let Some(&slot_idx) = unfilled.first() {
            for suggestion in self.bank.suggest(&state, slot_idx) {
                let child_state = state.advance(&suggestion);
                if self.walk(child_state, listener, depth + 1) == ControlFlow::Stop {
                    return ControlFlow::Stop;
                }
            }
        }
        ControlFlow::Continue
    }
}
