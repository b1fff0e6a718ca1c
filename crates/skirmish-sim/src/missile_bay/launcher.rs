//! One launcher group: a set of cells sharing a payload and a magazine.

use glam::Vec3;

use skirmish_core::catalog::MissileBayComponentDefinition;
use skirmish_core::constants::RELOAD_EPSILON;
use skirmish_core::enums::ReloadMode;

/// Launcher setup handed to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LauncherConfig {
    /// Cell launch points as ship-local offsets.
    pub cells: Vec<Vec3>,
    pub payload: MissileBayComponentDefinition,
}

/// Runtime state of a launcher group.
///
/// Rounds never exceed the cell count. A round is one trigger's worth of
/// fire regardless of how many missiles the payload spawns per shot.
#[derive(Debug, Clone)]
pub struct LauncherGroup {
    cells: Vec<Vec3>,
    payload: MissileBayComponentDefinition,
    rounds_remaining: u32,
    next_cell_index: usize,
    reload_progress_secs: f32,
    reloading: bool,
}

impl LauncherConfig {
    pub fn new(cells: Vec<Vec3>, payload: MissileBayComponentDefinition) -> Self {
        Self { cells, payload }
    }
}

impl LauncherGroup {
    pub fn new(config: LauncherConfig) -> Self {
        let rounds = config.cells.len() as u32;
        Self {
            cells: config.cells,
            payload: config.payload.sanitized(),
            rounds_remaining: rounds,
            next_cell_index: 0,
            reload_progress_secs: 0.0,
            reloading: false,
        }
    }

    pub fn payload(&self) -> &MissileBayComponentDefinition {
        &self.payload
    }

    pub fn capacity(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.rounds_remaining
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn next_cell_index(&self) -> usize {
        self.next_cell_index
    }

    /// Fraction of the current reload step completed, 0 when idle.
    pub fn reload_progress01(&self) -> f32 {
        if !self.reloading {
            return 0.0;
        }
        if self.payload.reload_secs <= 0.0 {
            return 1.0;
        }
        (self.reload_progress_secs / self.payload.reload_secs).clamp(0.0, 1.0)
    }

    /// Spend one round from the next cell, returning that cell's local offset.
    pub fn take_round(&mut self) -> Option<Vec3> {
        if self.rounds_remaining == 0 || self.cells.is_empty() {
            return None;
        }
        let cell = self.cells[self.next_cell_index % self.cells.len()];
        self.next_cell_index = (self.next_cell_index + 1) % self.cells.len();
        self.rounds_remaining -= 1;
        self.start_reload_if_needed();
        Some(cell)
    }

    fn start_reload_if_needed(&mut self) {
        let needs_reload = match self.payload.reload_mode {
            ReloadMode::PerRound => self.rounds_remaining < self.capacity(),
            ReloadMode::FullMagazine => self.rounds_remaining == 0,
        };
        if needs_reload && !self.reloading {
            self.reloading = true;
            self.reload_progress_secs = 0.0;
        }
    }

    /// Advance reload. Returns true on the frame the magazine becomes full.
    pub fn tick_reload(&mut self, dt: f32) -> bool {
        if !self.reloading || dt <= 0.0 {
            return false;
        }
        let capacity = self.capacity();
        let reload_secs = self.payload.reload_secs;
        self.reload_progress_secs += dt;

        if reload_secs <= 0.0 {
            self.rounds_remaining = capacity;
        } else {
            match self.payload.reload_mode {
                ReloadMode::PerRound => {
                    while self.rounds_remaining < capacity
                        && self.reload_progress_secs + RELOAD_EPSILON >= reload_secs
                    {
                        self.rounds_remaining += 1;
                        self.reload_progress_secs = (self.reload_progress_secs - reload_secs).max(0.0);
                    }
                }
                ReloadMode::FullMagazine => {
                    if self.reload_progress_secs + RELOAD_EPSILON >= reload_secs {
                        self.rounds_remaining = capacity;
                    }
                }
            }
        }

        if self.rounds_remaining >= capacity {
            self.rounds_remaining = capacity;
            self.reloading = false;
            self.reload_progress_secs = 0.0;
            if self.payload.reload_mode == ReloadMode::FullMagazine {
                self.next_cell_index = 0;
            }
            return true;
        }
        false
    }
}
