//! Per-target lock state machine.
//!
//! Hovering the reticle over an on-screen target accumulates lock time.
//! Reaching the acquire time locks the target with one stack; continued
//! hovering adds stacks up to the per-target cap, all within a shared
//! budget. Released targets hold their progress for a short delay and then
//! decay. Locked targets survive a few seconds off-screen before dropping.

use std::collections::BTreeMap;

use glam::Vec3;

use skirmish_core::catalog::MissileBayComponentDefinition;
use skirmish_core::constants::*;
use skirmish_core::events::CombatEvent;
use skirmish_core::ids::HurtboxId;
use skirmish_core::state::LockIndicatorView;
use skirmish_core::types::horizontal_distance;

use super::volley::VolleyPool;
use crate::camera::CameraProjection;
use crate::collision::TargetSample;

/// Lock timing and budget shared by every launcher in the bay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockParams {
    pub acquire_secs: f32,
    pub progress_decay_secs: f32,
    pub progress_decay_delay_secs: f32,
    pub max_locks_per_target: u32,
    pub max_lock_stacks_total: u32,
    pub reticle_radius_padding: f32,
}

/// Tracking state of one target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetLockState {
    pub locked: bool,
    /// Progress toward the next stack (or the initial lock), in seconds.
    pub lock_secs: f32,
    pub lock_stacks: u32,
    pub decay_delay_secs: f32,
    pub off_screen_secs: f32,
    /// Smoothed velocity estimate from frame-to-frame center deltas.
    pub lock_velocity: Vec3,
    pub lock_world_center: Vec3,
    pub has_velocity_sample: bool,
}

/// All tracked targets plus the pool of the volley in flight.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    states: BTreeMap<HurtboxId, TargetLockState>,
    volley: VolleyPool,
    is_locking: bool,
    locking_progress01: f32,
}

impl Default for LockParams {
    fn default() -> Self {
        Self::from_payloads(std::iter::empty::<&MissileBayComponentDefinition>())
    }
}

impl LockParams {
    /// Derive lock parameters from the payloads of every launcher.
    ///
    /// Timings come from the fastest-acquiring payload. When any payload
    /// spends lock stacks, the global budget equals the missiles one trigger
    /// pull launches across all launchers; otherwise it is the largest
    /// configured budget.
    pub fn from_payloads<'a>(
        payloads: impl IntoIterator<Item = &'a MissileBayComponentDefinition>,
    ) -> Self {
        let payloads: Vec<&MissileBayComponentDefinition> = payloads.into_iter().collect();
        let Some(primary) = payloads.iter().copied().min_by(|a, b| {
            a.acquire_secs
                .partial_cmp(&b.acquire_secs)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) else {
            return Self {
                acquire_secs: 0.0,
                progress_decay_secs: 0.0,
                progress_decay_delay_secs: 0.0,
                max_locks_per_target: 1,
                max_lock_stacks_total: 0,
                reticle_radius_padding: 0.0,
            };
        };

        let uses_stacks = payloads.iter().any(|p| p.use_lock_stacks);
        let max_lock_stacks_total = if uses_stacks {
            payloads.iter().map(|p| p.missiles_per_shot.max(1)).sum::<u32>()
        } else {
            payloads
                .iter()
                .map(|p| p.max_lock_stacks_total)
                .max()
                .unwrap_or(1)
                .max(1)
        };
        let max_locks_per_target = payloads
            .iter()
            .map(|p| p.max_locks_per_target)
            .max()
            .unwrap_or(1)
            .max(1);

        Self {
            acquire_secs: primary.acquire_secs.max(0.0),
            progress_decay_secs: primary.progress_decay_secs.max(0.0),
            progress_decay_delay_secs: primary.progress_decay_delay_secs.max(0.0),
            max_locks_per_target,
            max_lock_stacks_total,
            reticle_radius_padding: primary.reticle_radius_padding.max(0.0),
        }
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: HurtboxId) -> Option<&TargetLockState> {
        self.states.get(&id)
    }

    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    /// Locked targets in id order.
    pub fn locked_targets(&self) -> impl Iterator<Item = (HurtboxId, &TargetLockState)> {
        self.states
            .iter()
            .filter(|(_, state)| state.locked)
            .map(|(id, state)| (*id, state))
    }

    pub fn locked_count(&self) -> u32 {
        self.locked_targets().count() as u32
    }

    pub fn total_stacks(&self) -> u32 {
        self.locked_targets().map(|(_, s)| s.lock_stacks).sum()
    }

    pub fn is_locking(&self) -> bool {
        self.is_locking
    }

    pub fn locking_progress01(&self) -> f32 {
        self.locking_progress01
    }

    pub fn volley(&self) -> &VolleyPool {
        &self.volley
    }

    /// Forget every target and the current volley.
    pub fn clear(&mut self) {
        self.states.clear();
        self.volley.clear();
        self.is_locking = false;
        self.locking_progress01 = 0.0;
    }

    /// Drop states for targets that vanished or can no longer take damage.
    pub fn prune(&mut self, targets: &[TargetSample], events: &mut Vec<CombatEvent>) {
        self.states.retain(|id, state| {
            let alive = targets.iter().any(|t| t.id == *id && t.damageable);
            if !alive && state.locked {
                events.push(CombatEvent::LockLost { hurtbox_id: *id });
            }
            alive
        });
        let states = &self.states;
        self.volley.retain(|id| {
            states.get(&id).is_some_and(|s| s.locked)
                && targets.iter().any(|t| t.id == id && t.damageable)
        });
    }

    /// Advance every lock by one frame.
    pub fn evaluate(
        &mut self,
        dt: f32,
        targets: &[TargetSample],
        aim: Option<Vec3>,
        camera: &dyn CameraProjection,
        params: &LockParams,
        events: &mut Vec<CombatEvent>,
    ) {
        self.is_locking = false;
        self.locking_progress01 = 0.0;
        if dt <= 0.0 {
            return;
        }

        let acquire = params.acquire_secs;
        let mut stacks_used = self.total_stacks();
        let mut dropped: Vec<HurtboxId> = Vec::new();
        let mut best_progress = 0.0f32;

        for target in targets.iter().filter(|t| t.damageable) {
            let on_screen = camera.is_on_screen(target.center);
            let hovered = on_screen
                && aim.is_some_and(|aim| {
                    horizontal_distance(aim, target.center)
                        <= target.radius + params.reticle_radius_padding
                });

            if !self.states.contains_key(&target.id) {
                if !hovered {
                    continue;
                }
                self.states.insert(target.id, TargetLockState::default());
            }
            let Some(state) = self.states.get_mut(&target.id) else {
                continue;
            };
            sample_velocity(state, target.center, dt);

            if !state.locked {
                if hovered {
                    state.decay_delay_secs = params.progress_decay_delay_secs;
                    state.lock_secs = (state.lock_secs + dt).min(acquire);
                    if state.lock_secs + LOCK_EPSILON >= acquire {
                        if stacks_used >= params.max_lock_stacks_total {
                            // Budget is full; the finished acquisition has nowhere to go.
                            dropped.push(target.id);
                            continue;
                        }
                        state.locked = true;
                        state.lock_stacks = 1;
                        state.lock_secs = 0.0;
                        state.off_screen_secs = 0.0;
                        stacks_used += 1;
                        events.push(CombatEvent::TargetLocked {
                            hurtbox_id: target.id,
                        });
                        log::debug!("locked {}", target.id);
                    }
                } else if !decay_progress(state, dt, params) {
                    dropped.push(target.id);
                    continue;
                }
            } else {
                if on_screen {
                    state.off_screen_secs = 0.0;
                } else {
                    state.off_screen_secs += dt;
                    if state.off_screen_secs >= LOCK_OFFSCREEN_GRACE_SECS {
                        stacks_used = stacks_used.saturating_sub(state.lock_stacks);
                        dropped.push(target.id);
                        events.push(CombatEvent::LockLost {
                            hurtbox_id: target.id,
                        });
                        log::debug!("lost {} off screen", target.id);
                        continue;
                    }
                }

                let others = stacks_used.saturating_sub(state.lock_stacks);
                let allowed = params
                    .max_locks_per_target
                    .min(params.max_lock_stacks_total.saturating_sub(others));
                if allowed == 0 {
                    stacks_used = others;
                    dropped.push(target.id);
                    events.push(CombatEvent::LockLost {
                        hurtbox_id: target.id,
                    });
                    continue;
                }
                if state.lock_stacks > allowed {
                    stacks_used -= state.lock_stacks - allowed;
                    state.lock_stacks = allowed;
                }

                if hovered && state.lock_stacks < allowed {
                    state.decay_delay_secs = params.progress_decay_delay_secs;
                    state.lock_secs = (state.lock_secs + dt).min(acquire);
                    if state.lock_secs + LOCK_EPSILON >= acquire {
                        state.lock_stacks += 1;
                        state.lock_secs = 0.0;
                        stacks_used += 1;
                    }
                } else if state.lock_stacks >= allowed {
                    state.lock_secs = 0.0;
                } else if !hovered {
                    decay_progress(state, dt, params);
                }
            }

            if acquire > 0.0 && state.lock_secs > 0.0 {
                best_progress = best_progress.max(state.lock_secs / acquire);
            }
        }

        for id in dropped {
            self.states.remove(&id);
        }

        self.is_locking = best_progress > 0.0;
        self.locking_progress01 = best_progress.clamp(0.0, 1.0);
    }

    /// Stage the current locks as the volley pool.
    pub fn stage_volley(&mut self) {
        let locks: Vec<(HurtboxId, u32)> = self
            .locked_targets()
            .map(|(id, state)| (id, state.lock_stacks))
            .collect();
        self.volley.stage(locks);
    }

    /// Assign a volley target to a missile launched from `from`.
    pub fn take_volley_target(
        &mut self,
        from: Vec3,
        use_stacks: bool,
        targets: &[TargetSample],
    ) -> Option<HurtboxId> {
        self.volley.take(from, use_stacks, targets)
    }

    /// Nearest still-valid volley target, for missiles whose target died.
    pub fn nearest_volley_target(&self, from: Vec3, targets: &[TargetSample]) -> Option<HurtboxId> {
        self.volley.nearest(from, targets)
    }

    pub fn clear_volley(&mut self) {
        self.volley.clear();
    }

    /// Lock markers for the HUD, in id order.
    pub fn indicators(&self, acquire_secs: f32) -> Vec<LockIndicatorView> {
        self.states
            .iter()
            .map(|(id, state)| LockIndicatorView {
                hurtbox_id: *id,
                world_center: state.lock_world_center,
                locked: state.locked,
                lock_stacks: state.lock_stacks,
                progress01: if acquire_secs > 0.0 {
                    (state.lock_secs / acquire_secs).clamp(0.0, 1.0)
                } else {
                    0.0
                },
            })
            .collect()
    }
}

/// Fold the frame's center delta into the smoothed velocity estimate.
fn sample_velocity(state: &mut TargetLockState, center: Vec3, dt: f32) {
    if state.has_velocity_sample {
        let raw = (center - state.lock_world_center) / dt;
        state.lock_velocity = state.lock_velocity.lerp(raw, LOCK_VELOCITY_SMOOTHING);
    } else {
        state.has_velocity_sample = true;
        state.lock_velocity = Vec3::ZERO;
    }
    state.lock_world_center = center;
}

/// Hold, then bleed off, progress toward the next stack.
///
/// Returns false once there is no progress left.
fn decay_progress(state: &mut TargetLockState, dt: f32, params: &LockParams) -> bool {
    if state.lock_secs <= 0.0 {
        state.lock_secs = 0.0;
        return false;
    }
    if state.decay_delay_secs > 0.0 {
        state.decay_delay_secs = (state.decay_delay_secs - dt).max(0.0);
        return true;
    }
    if params.progress_decay_secs <= 0.0 {
        state.lock_secs = 0.0;
        return false;
    }
    let rate = params.acquire_secs / params.progress_decay_secs;
    state.lock_secs = (state.lock_secs - rate * dt).max(0.0);
    state.lock_secs > 0.0
}
