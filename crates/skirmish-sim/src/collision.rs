//! Hitbox/hurtbox resolution and blast damage against the world.
//!
//! Hurtboxes live on entities carrying `(Hurtbox, HealthComponent, Position)`.
//! Hitboxes are owned by whatever projectile carries them and are resolved
//! against the world on demand.

use glam::Vec3;
use hecs::World;

use skirmish_core::components::{Hitbox, Hurtbox};
use skirmish_core::enums::Faction;
use skirmish_core::events::{DamageBreakdown, DamagePacket, HitEvent};
use skirmish_core::ids::HurtboxId;
use skirmish_core::types::Position;
use skirmish_health::HealthComponent;

/// Per-frame view of one hurtbox, used by locking and missile fusing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSample {
    pub id: HurtboxId,
    pub center: Vec3,
    pub radius: f32,
    pub damageable: bool,
}

/// Inclusive sphere overlap test.
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// World-space center of a hurtbox.
pub fn hurtbox_center(hurtbox: &Hurtbox, position: &Position) -> Vec3 {
    position.0 + hurtbox.offset
}

pub fn is_damageable(hurtbox: &Hurtbox, health: &HealthComponent) -> bool {
    hurtbox.enabled && !health.is_destroyed()
}

/// Damage only crosses faction lines. An unset faction on either side allows the hit.
pub fn factions_may_interact(source: Option<Faction>, target: Option<Faction>) -> bool {
    match (source, target) {
        (Some(source), Some(target)) => source != target,
        _ => true,
    }
}

/// True while the hitbox still has hits left to give.
pub fn hitbox_is_live(hitbox: &Hitbox) -> bool {
    hitbox.enabled && hitbox.damage > 0.0 && hitbox.hit_count < hitbox.max_hits
}

/// Apply a packet to one hurtbox's health. Disables the hurtbox when it dies.
pub fn receive_damage(
    hurtbox: &mut Hurtbox,
    health: &mut HealthComponent,
    packet: &DamagePacket,
) -> DamageBreakdown {
    if !is_damageable(hurtbox, health) {
        return DamageBreakdown::none(packet.damage_type.clone(), health.is_destroyed());
    }
    let breakdown = health.apply_damage(packet.amount, &packet.damage_type);
    if breakdown.destroyed {
        hurtbox.enabled = false;
        log::debug!("{} destroyed", hurtbox.id);
    }
    breakdown
}

/// Record a hit on `hurtbox_id` and retire the hitbox once it runs out of hits.
pub fn register_hit(hitbox: &mut Hitbox, hurtbox_id: HurtboxId) {
    hitbox.hit_ids.insert(hurtbox_id);
    hitbox.hit_count += 1;
    if hitbox.hit_count >= hitbox.max_hits {
        hitbox.enabled = false;
    }
}

/// Resolve `hitbox`, positioned at `origin`, against every hurtbox in the world.
///
/// The first damageable, hostile, not-yet-hit hurtbox that overlaps (in
/// world query order) takes the hit. Returns `None` when nothing qualified.
pub fn resolve_hitbox_against_hurtboxes(
    hitbox: &mut Hitbox,
    origin: Vec3,
    world: &mut World,
) -> Option<HitEvent> {
    if !hitbox_is_live(hitbox) {
        return None;
    }
    let center = origin + hitbox.offset;

    for (_entity, (hurtbox, health, position)) in
        world.query_mut::<(&mut Hurtbox, &mut HealthComponent, &Position)>()
    {
        if !is_damageable(hurtbox, health)
            || !factions_may_interact(hitbox.source_faction, hurtbox.faction)
            || hitbox.hit_ids.contains(&hurtbox.id)
        {
            continue;
        }
        if !spheres_overlap(
            center,
            hitbox.radius,
            hurtbox_center(hurtbox, position),
            hurtbox.radius,
        ) {
            continue;
        }

        let packet = DamagePacket {
            amount: hitbox.damage,
            damage_type: hitbox.damage_type.clone(),
            source_id: hitbox.source_id,
            source_faction: hitbox.source_faction,
        };
        let breakdown = receive_damage(hurtbox, health, &packet);
        register_hit(hitbox, hurtbox.id);
        return Some(HitEvent {
            hitbox_id: Some(hitbox.id),
            hurtbox_id: hurtbox.id,
            breakdown,
            health: health.snapshot(),
        });
    }
    None
}

/// Deal `packet` in full to every damageable hurtbox overlapping the blast sphere.
///
/// No falloff and no faction filtering; each hurtbox is hit at most once.
pub fn apply_blast(
    world: &mut World,
    center: Vec3,
    radius: f32,
    packet: &DamagePacket,
) -> Vec<HitEvent> {
    let mut hits = Vec::new();
    if packet.amount <= 0.0 {
        return hits;
    }
    for (_entity, (hurtbox, health, position)) in
        world.query_mut::<(&mut Hurtbox, &mut HealthComponent, &Position)>()
    {
        if !is_damageable(hurtbox, health) {
            continue;
        }
        let hurtbox_at = hurtbox_center(hurtbox, position);
        if !spheres_overlap(center, radius.max(0.0), hurtbox_at, hurtbox.radius) {
            continue;
        }
        let breakdown = receive_damage(hurtbox, health, packet);
        hits.push(HitEvent {
            hitbox_id: None,
            hurtbox_id: hurtbox.id,
            breakdown,
            health: health.snapshot(),
        });
    }
    hits
}

/// Sample every hurtbox for this frame, in world query order.
pub fn sample_targets(world: &World) -> Vec<TargetSample> {
    world
        .query::<(&Hurtbox, &HealthComponent, &Position)>()
        .iter()
        .map(|(_entity, (hurtbox, health, position))| TargetSample {
            id: hurtbox.id,
            center: hurtbox_center(hurtbox, position),
            radius: hurtbox.radius,
            damageable: is_damageable(hurtbox, health),
        })
        .collect()
}
