//! Missile bay controller.
//!
//! `MissileBayController` owns the launchers, the lock registry and every
//! missile in flight. Each frame it ticks reloads and cooldowns, updates
//! locks against the world's hurtboxes, drains queued volleys, flies the
//! missiles and detonates them into the world.

pub mod launcher;
pub mod lock;
pub mod missile;
pub mod template;
pub mod volley;

use glam::Vec3;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::catalog::MissileBayComponentDefinition;
use skirmish_core::constants::*;
use skirmish_core::enums::{DetonationCause, Faction, FlightMode, MissileModel};
use skirmish_core::events::{CombatEvent, DamagePacket, HitEvent};
use skirmish_core::ids::{HurtboxId, IdAllocator};
use skirmish_core::state::{ExplosionFlashView, LockIndicatorView, MissileBayStatus};
use skirmish_core::types::ShipPose;

use crate::camera::CameraProjection;
use crate::collision::{self, TargetSample};
use crate::guidance;

pub use launcher::{LauncherConfig, LauncherGroup};
pub use lock::{LockParams, LockRegistry, TargetLockState};
pub use missile::{ActiveMissile, Flight, SplinePath, Warhead};
pub use template::{MissileTemplate, TemplateSlots};

/// Per-frame inputs from the ship and camera.
pub struct FrameContext<'a> {
    pub ship: ShipPose,
    /// Ship facing; missiles leave the cells along it.
    pub ship_forward: Vec3,
    pub camera: &'a dyn CameraProjection,
    /// Reticle point on the ground plane, if any.
    pub aim_target: Option<Vec3>,
}

impl<'a> FrameContext<'a> {
    pub fn new(ship: ShipPose, camera: &'a dyn CameraProjection) -> Self {
        Self {
            ship,
            ship_forward: ship.forward(),
            camera,
            aim_target: None,
        }
    }

    pub fn with_aim(mut self, aim_target: Option<Vec3>) -> Self {
        self.aim_target = aim_target;
        self
    }
}

/// Fading explosion flash.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ExplosionFlash {
    position: Vec3,
    radius: f32,
    remaining_secs: f32,
}

/// The ship's missile bay.
pub struct MissileBayController {
    launchers: Vec<LauncherGroup>,
    lock_params: LockParams,
    registry: LockRegistry,
    missiles: Vec<ActiveMissile>,
    flashes: Vec<ExplosionFlash>,
    templates: TemplateSlots,
    ids: IdAllocator,
    rng: ChaCha8Rng,
    events: Vec<CombatEvent>,
    last_hits: Vec<HitEvent>,

    enabled: bool,
    disposed: bool,
    queued_shots: u32,
    trigger_interval_secs: f32,
    burst_interval_secs: f32,
    trigger_cooldown_secs: f32,
    burst_cooldown_secs: f32,
    fired_flash_secs: f32,
}

impl MissileBayController {
    /// Create a bay with the given launchers. `seed` drives spline jitter and aim scatter.
    pub fn new(launchers: Vec<LauncherConfig>, seed: u64) -> Self {
        let mut controller = Self {
            launchers: Vec::new(),
            lock_params: LockParams::default(),
            registry: LockRegistry::new(),
            missiles: Vec::new(),
            flashes: Vec::new(),
            templates: TemplateSlots::default(),
            ids: IdAllocator::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
            last_hits: Vec::new(),
            enabled: true,
            disposed: false,
            queued_shots: 0,
            trigger_interval_secs: 0.0,
            burst_interval_secs: 0.0,
            trigger_cooldown_secs: 0.0,
            burst_cooldown_secs: 0.0,
            fired_flash_secs: 0.0,
        };
        controller.set_missile_bays(launchers);
        controller
    }

    /// Replace every launcher. Locks, queued shots and cooldowns reset;
    /// missiles already in flight keep flying.
    pub fn set_missile_bays(&mut self, launchers: Vec<LauncherConfig>) {
        self.launchers = launchers.into_iter().map(LauncherGroup::new).collect();
        self.lock_params = LockParams::from_payloads(self.launchers.iter().map(|l| l.payload()));
        self.trigger_interval_secs = self
            .launchers
            .iter()
            .map(|l| l.payload().trigger_interval_secs)
            .fold(f32::INFINITY, f32::min);
        self.burst_interval_secs = self
            .launchers
            .iter()
            .map(|l| l.payload().burst_interval_secs)
            .fold(f32::INFINITY, f32::min);
        if self.launchers.is_empty() {
            self.trigger_interval_secs = 0.0;
            self.burst_interval_secs = 0.0;
        }
        self.registry.clear();
        self.queued_shots = 0;
        self.trigger_cooldown_secs = 0.0;
        self.burst_cooldown_secs = 0.0;
        log::info!(
            "missile bay configured: {} launchers, {} cells, lock budget {}",
            self.launchers.len(),
            self.capacity(),
            self.lock_params.max_lock_stacks_total
        );
    }

    /// Enable or disable the bay. Disabling clears locks, the volley and queued shots.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.registry.clear();
            self.queued_shots = 0;
            self.trigger_cooldown_secs = 0.0;
            self.burst_cooldown_secs = 0.0;
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Provide (or clear) the render template for a missile model.
    pub fn set_model_template(&mut self, model: MissileModel, template: Option<MissileTemplate>) {
        self.templates.set(model, template);
    }

    /// Request one volley. Returns false when the trigger is refused.
    ///
    /// Refused while disabled, while the trigger cooldown runs, when no
    /// launcher has a round, or when the queue already holds as many shots
    /// as the fullest launcher could fire.
    pub fn queue_shot(&mut self) -> bool {
        if !self.enabled || self.disposed || self.trigger_cooldown_secs > 0.0 {
            return false;
        }
        let max_rounds = self
            .launchers
            .iter()
            .map(LauncherGroup::rounds_remaining)
            .max()
            .unwrap_or(0);
        if max_rounds == 0 || self.queued_shots >= max_rounds {
            return false;
        }
        self.queued_shots += 1;
        self.trigger_cooldown_secs = self.trigger_interval_secs;
        true
    }

    /// Advance the bay by one frame.
    pub fn update(&mut self, dt: f32, frame: &FrameContext<'_>, world: &mut World) {
        if dt <= 0.0 || self.disposed {
            return;
        }

        self.tick_visuals(dt);
        self.tick_reloads(dt);

        let targets = collision::sample_targets(world);
        self.registry.prune(&targets, &mut self.events);
        if self.enabled {
            self.registry.evaluate(
                dt,
                &targets,
                frame.aim_target,
                frame.camera,
                &self.lock_params,
                &mut self.events,
            );
        }

        self.trigger_cooldown_secs = (self.trigger_cooldown_secs - dt).max(0.0);
        self.burst_cooldown_secs = (self.burst_cooldown_secs - dt).max(0.0);
        self.drain_queued_shots(frame, &targets);

        self.advance_missiles(dt, &targets, world);

        if self.missiles.is_empty() && self.queued_shots == 0 {
            self.registry.clear_volley();
        }
    }

    fn tick_visuals(&mut self, dt: f32) {
        self.fired_flash_secs = (self.fired_flash_secs - dt).max(0.0);
        for flash in &mut self.flashes {
            flash.remaining_secs -= dt;
        }
        self.flashes.retain(|flash| flash.remaining_secs > 0.0);
    }

    fn tick_reloads(&mut self, dt: f32) {
        for (index, launcher) in self.launchers.iter_mut().enumerate() {
            if launcher.tick_reload(dt) {
                self.events
                    .push(CombatEvent::ReloadComplete { launcher: index });
            }
        }
    }

    fn drain_queued_shots(&mut self, frame: &FrameContext<'_>, targets: &[TargetSample]) {
        while self.queued_shots > 0 && self.burst_cooldown_secs <= 0.0 {
            if !self.launchers.iter().any(|l| l.rounds_remaining() > 0) {
                self.queued_shots = 0;
                break;
            }
            self.fire_volley(frame, targets);
            self.queued_shots -= 1;
            self.burst_cooldown_secs = self.burst_interval_secs;
        }
    }

    /// Fire one round from every loaded launcher.
    fn fire_volley(&mut self, frame: &FrameContext<'_>, targets: &[TargetSample]) {
        if self.registry.volley().is_empty() {
            self.registry.stage_volley();
        }

        let mut missiles = 0u32;
        let mut launchers_fired = 0u32;
        for index in 0..self.launchers.len() {
            let Some(cell) = self.launchers[index].take_round() else {
                continue;
            };
            launchers_fired += 1;
            let origin = frame.ship.transform_point(cell);
            let payload = self.launchers[index].payload().clone();
            for _ in 0..payload.missiles_per_shot {
                if self.missiles.len() >= MAX_ACTIVE_MISSILES {
                    log::warn!("active missile cap reached, dropping launch");
                    break;
                }
                let missile = self.spawn_missile(index, origin, &payload, frame, targets);
                self.missiles.push(missile);
                missiles += 1;
            }
        }

        if launchers_fired > 0 {
            self.fired_flash_secs = FIRED_FLASH_SECS;
            self.events.push(CombatEvent::MissileLaunched {
                missiles,
                launchers: launchers_fired,
            });
        }
    }

    fn spawn_missile(
        &mut self,
        launcher: usize,
        origin: Vec3,
        payload: &MissileBayComponentDefinition,
        frame: &FrameContext<'_>,
        targets: &[TargetSample],
    ) -> ActiveMissile {
        let target_id = self
            .registry
            .take_volley_target(origin, payload.use_lock_stacks, targets);
        let mut forward =
            Vec3::new(frame.ship_forward.x, 0.0, frame.ship_forward.z).normalize_or_zero();
        if forward == Vec3::ZERO {
            forward = frame.ship.forward();
        }

        let (flight, velocity, heading, life) = match payload.flight_mode {
            FlightMode::Homing => (
                Flight::Homing {
                    delay_remaining: MISSILE_HOMING_DELAY_SECS,
                },
                forward * payload.speed,
                forward,
                payload.lifetime_secs,
            ),
            FlightMode::Spline => {
                let destination =
                    self.spline_destination(origin, forward, payload, target_id, frame, targets);
                let curve = guidance::build_spline_path(
                    origin,
                    forward,
                    destination,
                    payload.spline_wildness,
                    &mut self.rng,
                );
                let length = curve.approx_length(SPLINE_LENGTH_SAMPLES);
                let duration = guidance::spline_duration(length, payload.speed);
                let mut heading = curve.tangent(0.0).normalize_or_zero();
                if heading == Vec3::ZERO {
                    heading = forward;
                }
                (
                    Flight::Spline(SplinePath {
                        curve,
                        duration,
                        elapsed: 0.0,
                    }),
                    heading * payload.speed,
                    heading,
                    payload
                        .lifetime_secs
                        .max(duration + SPLINE_LIFETIME_MARGIN_SECS),
                )
            }
        };

        ActiveMissile {
            id: self.ids.next_missile(),
            launcher,
            flight,
            position: origin,
            velocity,
            heading,
            life_remaining: life,
            target: target_id,
            warhead: Warhead::from_payload(payload),
            template: self.templates.resolve(payload.model),
        }
    }

    /// Where a spline missile should end up.
    ///
    /// Locked targets are led by their smoothed velocity. Without a lock the
    /// reticle point (scattered) is used when it sits inside the forward
    /// cone; otherwise the missile flies a fixed distance straight ahead.
    fn spline_destination(
        &mut self,
        origin: Vec3,
        forward: Vec3,
        payload: &MissileBayComponentDefinition,
        target_id: Option<HurtboxId>,
        frame: &FrameContext<'_>,
        targets: &[TargetSample],
    ) -> Vec3 {
        let locked = target_id.and_then(|id| targets.iter().find(|t| t.id == id));
        if let Some(target) = locked {
            let velocity = self
                .registry
                .state(target.id)
                .map_or(Vec3::ZERO, |s| s.lock_velocity);
            let (point, _lead) = guidance::predict_target_position(
                origin,
                target.center,
                velocity,
                payload.speed,
                payload.predictive_lead_factor,
            );
            return point;
        }

        if let Some(aim) = frame.aim_target {
            let cone = AIM_FALLBACK_CONE_RADIANS;
            if guidance::aim_within_cone(frame.ship.position, forward, aim, cone) {
                return guidance::scatter_on_disc(aim, payload.aim_scatter_radius, &mut self.rng);
            }
        }
        origin + forward * STRAIGHT_AHEAD_FALLBACK_DISTANCE
    }

    fn advance_missiles(&mut self, dt: f32, targets: &[TargetSample], world: &mut World) {
        let registry = &self.registry;
        for missile in &mut self.missiles {
            missile.advance(dt, targets, registry);
        }

        // Fuses see targets destroyed by earlier blasts in the same frame.
        let mut live = targets.to_vec();
        self.last_hits.clear();
        let mut flying = Vec::with_capacity(self.missiles.len());
        for missile in std::mem::take(&mut self.missiles) {
            let Some(cause) = missile.detonation_cause(&live) else {
                flying.push(missile);
                continue;
            };
            let hits = self.detonate(&missile, cause, world);
            for hit in hits.iter().filter(|h| h.health.destroyed) {
                if let Some(sample) = live.iter_mut().find(|t| t.id == hit.hurtbox_id) {
                    sample.damageable = false;
                }
            }
            self.last_hits.extend(hits);
        }
        self.missiles = flying;
    }

    /// Apply the missile's blast to the world. Runs once per missile.
    fn detonate(
        &mut self,
        missile: &ActiveMissile,
        cause: DetonationCause,
        world: &mut World,
    ) -> Vec<HitEvent> {
        let packet = DamagePacket::new(missile.warhead.damage, missile.warhead.damage_type.clone())
            .with_source(missile.id.0, Some(Faction::Player));
        let hits = collision::apply_blast(
            world,
            missile.position,
            missile.warhead.explosion_radius,
            &packet,
        );
        log::debug!(
            "{} detonated ({cause:?}) at {:?}, {} hits",
            missile.id,
            missile.position,
            hits.len()
        );

        self.flashes.push(ExplosionFlash {
            position: missile.position,
            radius: missile.warhead.explosion_radius,
            remaining_secs: EXPLOSION_FLASH_SECS,
        });
        self.events.push(CombatEvent::Detonation {
            missile_id: missile.id,
            position: missile.position,
            cause,
            hits: hits.len() as u32,
        });
        hits
    }

    /// Release everything the bay owns. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.enabled = false;
        self.missiles.clear();
        self.flashes.clear();
        self.templates.clear();
        self.registry.clear();
        self.events.clear();
        self.last_hits.clear();
        self.queued_shots = 0;
        log::info!("missile bay disposed");
    }

    fn capacity(&self) -> u32 {
        self.launchers.iter().map(LauncherGroup::capacity).sum()
    }

    pub fn status(&self) -> MissileBayStatus {
        MissileBayStatus {
            enabled: self.enabled,
            capacity: self.capacity(),
            loaded: self.launchers.iter().map(LauncherGroup::rounds_remaining).sum(),
            launcher_loaded: self.launchers.iter().map(LauncherGroup::rounds_remaining).collect(),
            launcher_capacity: self.launchers.iter().map(LauncherGroup::capacity).collect(),
            launcher_reloading: self.launchers.iter().map(LauncherGroup::is_reloading).collect(),
            reload_progress01: self
                .launchers
                .iter()
                .filter(|l| l.is_reloading())
                .map(LauncherGroup::reload_progress01)
                .fold(0.0, f32::max),
            fired_flash_secs: self.fired_flash_secs,
            locked_target_count: self.registry.locked_count(),
            lock_stacks_total: self.registry.total_stacks(),
            is_locking: self.registry.is_locking(),
            locking_progress01: self.registry.locking_progress01(),
            queued_shots: self.queued_shots,
            active_missiles: self.missiles.len() as u32,
        }
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hits dealt by detonations during the last update.
    pub fn last_hits(&self) -> &[HitEvent] {
        &self.last_hits
    }

    pub fn lock_indicators(&self) -> Vec<LockIndicatorView> {
        self.registry.indicators(self.lock_params.acquire_secs)
    }

    pub fn explosion_flashes(&self) -> Vec<ExplosionFlashView> {
        self.flashes
            .iter()
            .map(|flash| ExplosionFlashView {
                position: flash.position,
                radius: flash.radius,
                intensity01: (flash.remaining_secs / EXPLOSION_FLASH_SECS).clamp(0.0, 1.0),
            })
            .collect()
    }

    pub fn missiles(&self) -> &[ActiveMissile] {
        &self.missiles
    }

    #[cfg(test)]
    pub(crate) fn missiles_mut(&mut self) -> &mut [ActiveMissile] {
        &mut self.missiles
    }

    pub fn lock_state(&self, id: HurtboxId) -> Option<&TargetLockState> {
        self.registry.state(id)
    }

    pub fn lock_params(&self) -> &LockParams {
        &self.lock_params
    }

    pub fn launchers(&self) -> &[LauncherGroup] {
        &self.launchers
    }
}
