/*
Saved Patterns and the Chain Queue
==================================

A snapshot freezes everything needed to bring a loop back: both grids, the
step count and the full configuration. Snapshots are read-only once saved
and there are at most eight of them.

The chain queue is a FIFO of snapshot indices. During playback one entry is
consumed each time the step counter wraps back to 0:

    chain [2, 0]      loop ends → load 2, chain [0]
                      loop ends → load 0, chain []
                      loop ends → keep playing 0

Deleting a snapshot shifts the ones after it down by one; chain entries are
renumbered to match, and entries for the deleted snapshot are dropped.
*/

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::Configuration,
    error::{EngineError, Result},
    sequencing::grid::{Grid, GridKind},
};

pub const MAX_SAVED_PATTERNS: usize = 8;

/// Plain-data copy of a loop: grids as boolean matrices plus configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSnapshot {
    pub steps: usize,
    pub melody: Vec<Vec<bool>>,
    pub drums: Vec<Vec<bool>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: Configuration,
}

impl PatternSnapshot {
    pub fn capture(melody: &Grid, drums: &Grid, config: &Configuration) -> Self {
        Self {
            steps: melody.steps(),
            melody: melody.cells().to_vec(),
            drums: drums.cells().to_vec(),
            config: config.clone(),
        }
    }

    pub fn melody_grid(&self) -> Grid {
        Grid::from_cells(GridKind::Melody, self.steps, &self.melody)
    }

    pub fn drum_grid(&self) -> Grid {
        Grid::from_cells(GridKind::Drum, self.steps, &self.drums)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Default)]
pub struct PatternStore {
    saved: Vec<PatternSnapshot>,
    chain: VecDeque<usize>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and return its index. Fails without change when full.
    pub fn save(&mut self, snapshot: PatternSnapshot) -> Result<usize> {
        if self.saved.len() >= MAX_SAVED_PATTERNS {
            return Err(EngineError::PatternLimit {
                max: MAX_SAVED_PATTERNS,
            });
        }
        self.saved.push(snapshot);
        Ok(self.saved.len() - 1)
    }

    pub fn get(&self, index: usize) -> Result<&PatternSnapshot> {
        self.saved.get(index).ok_or(EngineError::UnknownPattern {
            index,
            saved: self.saved.len(),
        })
    }

    pub fn delete(&mut self, index: usize) -> Result<PatternSnapshot> {
        self.get(index)?;
        let removed = self.saved.remove(index);
        self.chain.retain(|&entry| entry != index);
        for entry in self.chain.iter_mut() {
            if *entry > index {
                *entry -= 1;
            }
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn snapshots(&self) -> &[PatternSnapshot] {
        &self.saved
    }

    pub fn add_to_chain(&mut self, index: usize) -> Result<()> {
        self.get(index)?;
        self.chain.push_back(index);
        Ok(())
    }

    pub fn clear_chain(&mut self) {
        self.chain.clear();
    }

    /// Take the next queued index, if any.
    pub fn next_in_chain(&mut self) -> Option<usize> {
        self.chain.pop_front()
    }

    pub fn chain(&self) -> Vec<usize> {
        self.chain.iter().copied().collect()
    }
}
