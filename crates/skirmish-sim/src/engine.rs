//! Arena engine: a headless harness around the missile bay.
//!
//! `ArenaEngine` owns the hecs world of targets, the missile bay and the
//! ship pose. It processes queued player commands, runs the systems in a
//! fixed order and produces `ArenaSnapshot`s. Same seed and same inputs
//! give the same snapshots.

use std::collections::VecDeque;

use glam::Vec3;
use hecs::World;

use skirmish_core::catalog::{
    MissileBayComponentDefinition, WeaponComponentCatalog, MISSILE_RACK_ID,
};
use skirmish_core::commands::PlayerCommand;
use skirmish_core::constants::DT;
use skirmish_core::events::CombatEvent;
use skirmish_core::ids::{HurtboxId, IdAllocator};
use skirmish_core::state::ArenaSnapshot;
use skirmish_core::types::{ShipPose, SimTime};

use crate::camera::PerspectiveCamera;
use crate::missile_bay::{FrameContext, MissileBayController};
use crate::systems;
use crate::world_setup::{self, TargetSpawn};

/// Configuration for a new arena.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// RNG seed for the bay. Same seed = same simulation.
    pub seed: u64,
    /// Catalog id of the payload loaded at start.
    pub payload_id: String,
    pub launcher_count: usize,
    pub cells_per_launcher: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            payload_id: MISSILE_RACK_ID.to_string(),
            launcher_count: 2,
            cells_per_launcher: 4,
        }
    }
}

/// The arena. Owns the ECS world and the missile bay.
pub struct ArenaEngine {
    world: World,
    time: SimTime,
    ids: IdAllocator,
    catalog: WeaponComponentCatalog,
    layout: Vec<Vec<Vec3>>,
    bay: MissileBayController,
    ship: ShipPose,
    aim_target: Option<Vec3>,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<CombatEvent>,
}

impl ArenaEngine {
    /// Create an arena using the builtin catalog.
    pub fn new(config: ArenaConfig) -> Self {
        Self::with_catalog(config, WeaponComponentCatalog::builtin())
    }

    /// Create an arena drawing payloads from `catalog`.
    pub fn with_catalog(config: ArenaConfig, catalog: WeaponComponentCatalog) -> Self {
        let layout =
            world_setup::launcher_layout(config.launcher_count, config.cells_per_launcher);
        let payload = resolve_payload(&catalog, &config.payload_id);
        let bay = MissileBayController::new(
            world_setup::build_launchers(&layout, &payload),
            config.seed,
        );
        Self {
            world: World::new(),
            time: SimTime::default(),
            ids: IdAllocator::new(),
            catalog,
            layout,
            bay,
            ship: ShipPose::default(),
            aim_target: None,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Place a target in the arena.
    pub fn spawn_target(&mut self, spawn: TargetSpawn) -> HurtboxId {
        world_setup::spawn_target(&mut self.world, &mut self.ids, spawn).1
    }

    /// Advance one fixed frame.
    pub fn tick(&mut self) -> ArenaSnapshot {
        self.step(DT)
    }

    /// Advance by `dt` seconds and return the resulting snapshot.
    pub fn step(&mut self, dt: f32) -> ArenaSnapshot {
        self.process_commands();
        if dt > 0.0 {
            self.run_systems(dt);
            self.time.advance(dt);
        }
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.bay, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn bay(&self) -> &MissileBayController {
        &self.bay
    }

    pub fn bay_mut(&mut self) -> &mut MissileBayController {
        &mut self.bay
    }

    pub fn ship(&self) -> ShipPose {
        self.ship
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::FireSecondary => {
                self.bay.queue_shot();
            }
            PlayerCommand::SetAimTarget { target } => {
                self.aim_target = target;
            }
            PlayerCommand::SetShipPose { pose } => {
                self.ship = pose;
            }
            PlayerCommand::SetEnabled { enabled } => {
                self.bay.set_enabled(enabled);
            }
            PlayerCommand::SelectPayload { payload_id } => match self.catalog.get(&payload_id) {
                Some(payload) => {
                    let launchers = world_setup::build_launchers(&self.layout, payload);
                    self.bay.set_missile_bays(launchers);
                }
                None => log::warn!("unknown payload '{payload_id}', keeping current loadout"),
            },
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f32) {
        // 1. Target movement
        systems::movement::run(&mut self.world, dt);
        // 2. Health regen
        systems::regen::run(&mut self.world, dt);
        // 3. Missile bay: locks, volleys, flight, detonation
        let camera = PerspectiveCamera::chase(&self.ship);
        let frame = FrameContext::new(self.ship, &camera).with_aim(self.aim_target);
        self.bay.update(dt, &frame, &mut self.world);
        self.events.extend(self.bay.drain_events());
        // 4. Cleanup (destroyed targets)
        systems::cleanup::run(
            &mut self.world,
            dt,
            &mut self.events,
            &mut self.despawn_buffer,
        );
    }
}

/// Look up a payload, falling back to the stock rack.
fn resolve_payload(catalog: &WeaponComponentCatalog, id: &str) -> MissileBayComponentDefinition {
    match catalog.get(id) {
        Some(payload) => payload.clone(),
        None => {
            log::warn!("unknown payload '{id}', loading the stock missile rack");
            MissileBayComponentDefinition::default()
        }
    }
}
