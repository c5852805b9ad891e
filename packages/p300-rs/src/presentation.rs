//! Presentation-cycle bookkeeping.
//!
//! The display side shows each symbol of the alphabet exactly once per
//! sweep, in random order, for a configured number of sweeps. This models
//! that protocol as an explicit state object instead of the shared
//! used/unused map the recorded sessions were driven by: the remaining
//! symbols of the current sweep, a sweep counter, and a monotonically
//! increasing draw id that doubles as the marker id.

use rand::Rng;

use crate::error::{PipelineError, Result};

/// One emitted symbol presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDraw {
    pub id: u64,
    pub label: String,
}

/// Finite-state presentation cycle over a fixed symbol alphabet.
#[derive(Debug, Clone)]
pub struct SymbolCycle {
    alphabet: Vec<String>,
    remaining: Vec<String>,
    completed_sweeps: usize,
    max_sweeps: usize,
    next_id: u64,
}

impl SymbolCycle {
    pub fn new(alphabet: &[String], max_sweeps: usize) -> Result<Self> {
        if alphabet.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "symbol alphabet must not be empty".to_string(),
            ));
        }
        if max_sweeps == 0 {
            return Err(PipelineError::InvalidParameter(
                "at least one presentation sweep is required".to_string(),
            ));
        }

        Ok(Self {
            alphabet: alphabet.to_vec(),
            remaining: alphabet.to_vec(),
            completed_sweeps: 0,
            max_sweeps,
            next_id: 0,
        })
    }

    /// Draw the next symbol, or None once all sweeps are complete.
    pub fn next_symbol<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SymbolDraw> {
        if self.remaining.is_empty() {
            if self.completed_sweeps < self.max_sweeps {
                self.completed_sweeps += 1;
            }
            if self.completed_sweeps >= self.max_sweeps {
                return None;
            }
            self.remaining = self.alphabet.clone();
        }

        let pick = rng.gen_range(0..self.remaining.len());
        let label = self.remaining.swap_remove(pick);
        self.next_id += 1;
        Some(SymbolDraw {
            id: self.next_id,
            label,
        })
    }

    /// Completed full sweeps so far.
    pub fn completed_sweeps(&self) -> usize {
        self.completed_sweeps
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty() && self.completed_sweeps + 1 >= self.max_sweeps
    }

    /// Symbols not yet shown in the current sweep, in draw-pool order.
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// A fully shuffled presentation schedule for `max_sweeps` sweeps.
    pub fn schedule<R: Rng + ?Sized>(mut self, rng: &mut R) -> Vec<SymbolDraw> {
        let mut draws = Vec::with_capacity(self.alphabet.len() * self.max_sweeps);
        while let Some(draw) = self.next_symbol(rng) {
            draws.push(draw);
        }
        draws
    }
}
