/*
Step Grids
==========

A grid is a boolean matrix: one row per melody degree or drum type, one
column per sixteenth-note step.

              step →  0 1 2 3 4 5 6 7 ...
    melody row 0      ■ · · · ■ · · ·
    melody row 1      · · ■ · · · ■ ·
    ...

Row counts are fixed by the grid kind (8 melody rows, 7 drum rows). The step
count is shared by every row, is at least 1, and changes only through
`resize`, which pads with silent steps or truncates from the end.

Quantize
--------

`quantize(q)` snaps to q notes per bar (q divides 16). With spacing
s = 16 / q, an active cell at an off-grid step j moves to round(j / s) · s,
or is dropped if that lands past the end:

    q = 4 (s = 4)   · ■ · · · · ■ ·   →   ■ · · · · · · ·   (1→0, 6→8 dropped at len 8)
*/

use rand::Rng;

use crate::{
    error::{EngineError, Result},
    log_recovery,
    voices::DRUM_TYPES,
};

pub const MELODY_ROWS: usize = 8;
pub const DRUM_ROWS: usize = DRUM_TYPES;
pub const DEFAULT_STEPS: usize = 16;

/// Steps per bar that quantize values divide.
const BAR_STEPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Melody,
    Drum,
}

impl GridKind {
    pub fn rows(self) -> usize {
        match self {
            GridKind::Melody => MELODY_ROWS,
            GridKind::Drum => DRUM_ROWS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    kind: GridKind,
    steps: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    /// All-off grid. A zero step count is bumped to 1.
    pub fn new(kind: GridKind, steps: usize) -> Self {
        let steps = steps.max(1);
        Self {
            kind,
            steps,
            cells: vec![vec![false; steps]; kind.rows()],
        }
    }

    /// Rebuild a grid from a saved matrix, padding or truncating rows and
    /// steps to the expected shape.
    pub fn from_cells(kind: GridKind, steps: usize, cells: &[Vec<bool>]) -> Self {
        let mut grid = Self::new(kind, steps);
        let shaped = cells.len() == kind.rows() && cells.iter().all(|row| row.len() == grid.steps);
        if !shaped {
            log_recovery!("{kind:?} grid snapshot is {} rows, reshaping to {}x{}", cells.len(), kind.rows(), grid.steps);
        }
        for (dst, src) in grid.cells.iter_mut().zip(cells) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = *s;
            }
        }
        grid
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn cells(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Cell state; anything out of range reads as off.
    pub fn get(&self, row: usize, step: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(step))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, step: usize, active: bool) -> Result<()> {
        *self.cell_mut(row, step)? = active;
        Ok(())
    }

    /// Flip a cell and return its new state.
    pub fn toggle(&mut self, row: usize, step: usize) -> Result<bool> {
        let cell = self.cell_mut(row, step)?;
        *cell = !*cell;
        Ok(*cell)
    }

    fn cell_mut(&mut self, row: usize, step: usize) -> Result<&mut bool> {
        let kind = self.kind;
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(step))
            .ok_or(EngineError::CellOutOfRange { kind, row, step })
    }

    /// Rows with an active cell at `step`, ascending.
    pub fn active_rows(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.get(step).copied().unwrap_or(false))
            .map(|(index, _)| index)
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }

    /// Change the step count, keeping the cells that still fit.
    pub fn resize(&mut self, steps: usize) -> Result<()> {
        if steps == 0 {
            return Err(EngineError::InvalidLength(steps));
        }
        for row in self.cells.iter_mut() {
            row.resize(steps, false);
        }
        self.steps = steps;
        Ok(())
    }

    pub fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(false);
        }
    }

    /// Replace every cell with a fresh coin flip at `density`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let density = density.clamp(0.0, 1.0);
        for cell in self.cells.iter_mut().flatten() {
            *cell = rng.gen_bool(density);
        }
    }

    /// Flip each cell independently with `probability`.
    pub fn vary<R: Rng + ?Sized>(&mut self, probability: f64, rng: &mut R) {
        let probability = probability.clamp(0.0, 1.0);
        for cell in self.cells.iter_mut().flatten() {
            if rng.gen_bool(probability) {
                *cell = !*cell;
            }
        }
    }

    /// Snap active cells to `notes_per_bar` positions per 16 steps.
    pub fn quantize(&mut self, notes_per_bar: usize) -> Result<()> {
        if notes_per_bar == 0 || BAR_STEPS % notes_per_bar != 0 {
            return Err(EngineError::InvalidQuantize(notes_per_bar));
        }
        let spacing = BAR_STEPS / notes_per_bar;
        let len = self.steps;

        for row in self.cells.iter_mut() {
            for step in 0..len {
                if step % spacing == 0 || !row[step] {
                    continue;
                }
                row[step] = false;
                let target = (step + spacing / 2) / spacing * spacing;
                if target < len {
                    row[target] = true;
                }
            }
        }
        Ok(())
    }

    /// Row count matches the kind and every row spans the step count.
    pub fn is_well_formed(&self) -> bool {
        self.steps > 0
            && self.cells.len() == self.kind.rows()
            && self.cells.iter().all(|row| row.len() == self.steps)
    }

    /// Copy `other`'s cells column by column over the overlapping region.
    pub fn copy_overlap_from(&mut self, other: &Grid) {
        for (dst, src) in self.cells.iter_mut().zip(other.cells.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s;
            }
        }
    }
}
