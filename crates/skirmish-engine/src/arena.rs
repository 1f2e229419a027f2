//! Reference arena: a small headless world the engine can play in.
//!
//! Owns a hecs ECS world of `Unit` components and implements the read
//! side of the collaborator contracts on top of it. Commands coming back
//! from the engine are applied with `apply_commands`, then `step` moves
//! everything forward one tick with a deliberately simple combat model.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use skirmish_core::commands::{CommandTarget, UnitCommand};
use skirmish_core::enums::{Ability, Alliance, UnitKind};
use skirmish_core::types::{Point2, PointExt, SimTime, UnitTag};
use skirmish_core::unit::Unit;
use skirmish_tactics::profiles::get_profile;

use crate::collaborators::{
    BuildOrderStatus, GameView, QueryFilter, ResourceCluster, SpatialQuery,
};

/// Vision radius of every own unit.
pub const SIGHT_RANGE: f32 = 11.0;
/// Seconds between two shots of any weapon.
pub const WEAPON_PERIOD: f32 = 1.0;
/// Health fraction regained per second while burrowed.
pub const BURROW_REGEN_PER_SEC: f32 = 0.05;
/// Distance at which a move order counts as done.
const MOVE_DONE_DISTANCE: f32 = 0.1;

/// Standing order of an arena unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub ability: Ability,
    pub target: CommandTarget,
}

/// Seconds until the weapon can fire again.
#[derive(Debug, Clone, Copy, Default)]
struct Cooldown(f32);

/// Static map layout.
#[derive(Debug, Clone)]
pub struct ArenaMap {
    pub own_start: Point2,
    pub own_natural: Point2,
    pub enemy_start: Point2,
    pub expansions: Vec<Point2>,
    pub clusters: Vec<ResourceCluster>,
    pub supply_cap: f32,
}

/// Scripted opening.
#[derive(Debug, Clone, Copy, Default)]
pub struct Opening {
    pub complete_at_secs: f64,
    pub override_active: bool,
}

/// What happened to one unit during `step`.
enum Action {
    MoveTo(Point2),
    Fire(UnitTag),
    Done,
}

pub struct Arena {
    world: World,
    time: SimTime,
    map: ArenaMap,
    opening: Opening,
    entities: BTreeMap<UnitTag, Entity>,
    next_tag: u64,
    despawn_buffer: Vec<Entity>,
}

impl Arena {
    pub fn new(map: ArenaMap, opening: Opening) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            map,
            opening,
            entities: BTreeMap::new(),
            next_tag: 1,
            despawn_buffer: Vec::new(),
        }
    }

    pub fn map(&self) -> &ArenaMap {
        &self.map
    }

    /// Spawn a fresh unit with stats from its profile.
    pub fn spawn(&mut self, kind: UnitKind, alliance: Alliance, position: Point2) -> UnitTag {
        let tag = UnitTag(self.next_tag);
        self.next_tag += 1;

        let profile = get_profile(kind);
        let mut unit = Unit::new(tag, kind, alliance, position).with_radius(profile.radius);
        if profile.max_shield > 0.0 {
            unit.shield = 1.0;
        }
        if profile.can_burrow {
            unit.abilities.insert(Ability::BurrowDown);
        }

        let entity = self.world.spawn((unit, Cooldown::default()));
        self.entities.insert(tag, entity);
        tag
    }

    /// Mutate a unit in place; returns false if it no longer exists.
    pub fn update_unit(&mut self, tag: UnitTag, f: impl FnOnce(&mut Unit)) -> bool {
        let Some(&entity) = self.entities.get(&tag) else {
            return false;
        };
        match self.world.get::<&mut Unit>(entity) {
            Ok(mut unit) => {
                f(&mut unit);
                true
            }
            Err(_) => false,
        }
    }

    pub fn unit(&self, tag: UnitTag) -> Option<Unit> {
        let entity = *self.entities.get(&tag)?;
        self.world.get::<&Unit>(entity).ok().map(|u| (*u).clone())
    }

    pub fn order_of(&self, tag: UnitTag) -> Option<Order> {
        let entity = *self.entities.get(&tag)?;
        self.world.get::<&Order>(entity).ok().map(|o| *o)
    }

    /// Give a unit a standing order directly (scripted enemies).
    pub fn set_order(&mut self, tag: UnitTag, order: Order) {
        if let Some(&entity) = self.entities.get(&tag) {
            let _ = self.world.insert_one(entity, order);
        }
    }

    /// Apply engine commands. Burrow toggles take effect immediately.
    pub fn apply_commands(&mut self, commands: &[UnitCommand]) {
        for command in commands {
            for tag in &command.units {
                let Some(&entity) = self.entities.get(tag) else {
                    continue;
                };
                match command.ability {
                    Ability::BurrowDown | Ability::BurrowUp => {
                        let down = command.ability == Ability::BurrowDown;
                        if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                            unit.burrowed = down;
                            unit.abilities.remove(command.ability);
                            unit.abilities.insert(if down {
                                Ability::BurrowUp
                            } else {
                                Ability::BurrowDown
                            });
                        }
                        let _ = self.world.remove_one::<Order>(entity);
                    }
                    Ability::Attack | Ability::Move => {
                        let _ = self.world.insert_one(
                            entity,
                            Order {
                                ability: command.ability,
                                target: command.target,
                            },
                        );
                    }
                }
            }
        }
    }

    /// Advance one tick. Returns the tags of units that died.
    pub fn step(&mut self) -> Vec<UnitTag> {
        let dt = self.time.dt() as f32;
        let snapshot: BTreeMap<UnitTag, Unit> = self
            .world
            .query::<&Unit>()
            .iter()
            .map(|(_, u)| (u.tag, u.clone()))
            .collect();

        // Decide
        let mut actions: Vec<(Entity, Action)> = Vec::new();
        for (&tag, unit) in &snapshot {
            let Some(&entity) = self.entities.get(&tag) else {
                continue;
            };
            let order = self.world.get::<&Order>(entity).ok().map(|o| *o);
            if let Some(action) = decide_action(unit, order, &snapshot) {
                actions.push((entity, action));
            }
        }

        // Resolve
        let mut damage: BTreeMap<UnitTag, f32> = BTreeMap::new();
        for (entity, action) in actions {
            match action {
                Action::MoveTo(point) => {
                    if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                        let step = (get_profile(unit.kind).speed * dt)
                            .min(unit.position.distance(point));
                        unit.position = unit.position.towards(point, step);
                    }
                }
                Action::Fire(target) => {
                    let dps = self
                        .world
                        .get::<&Unit>(entity)
                        .map(|u| get_profile(u.kind).dps)
                        .unwrap_or(0.0);
                    *damage.entry(target).or_default() += dps * WEAPON_PERIOD;
                    if let Ok(mut cooldown) = self.world.get::<&mut Cooldown>(entity) {
                        cooldown.0 = WEAPON_PERIOD;
                    }
                }
                Action::Done => {
                    let _ = self.world.remove_one::<Order>(entity);
                }
            }
        }

        for (target, amount) in damage {
            if let Some(&entity) = self.entities.get(&target) {
                if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                    apply_damage(&mut unit, amount);
                }
            }
        }

        for (_entity, (unit, cooldown)) in self.world.query_mut::<(&mut Unit, &mut Cooldown)>() {
            cooldown.0 = (cooldown.0 - dt).max(0.0);
            unit.weapon_ready = cooldown.0 <= 0.0;
            if unit.burrowed {
                unit.health = (unit.health + BURROW_REGEN_PER_SEC * dt).min(1.0);
            }
        }

        let dead = self.cleanup();
        self.time.advance();
        dead
    }

    /// Despawn units with no health left.
    fn cleanup(&mut self) -> Vec<UnitTag> {
        self.despawn_buffer.clear();
        let mut dead = Vec::new();
        for (entity, unit) in self.world.query_mut::<&Unit>() {
            if unit.health <= 0.0 {
                self.despawn_buffer.push(entity);
                dead.push(unit.tag);
            }
        }
        for entity in self.despawn_buffer.drain(..) {
            let _ = self.world.despawn(entity);
        }
        for tag in &dead {
            self.entities.remove(tag);
        }
        dead
    }

    fn own_units(&self) -> Vec<Unit> {
        self.world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| !u.is_enemy())
            .map(|(_, u)| u.clone())
            .collect()
    }
}

/// Whether `unit` can currently fire its weapon at all.
fn can_fire(unit: &Unit) -> bool {
    let profile = get_profile(unit.kind);
    // Mines only fire while burrowed; everything else only while not.
    profile.has_weapon() && unit.burrowed == profile.is_mine
}

fn in_range(unit: &Unit, target: &Unit) -> bool {
    unit.distance_to(target) <= get_profile(unit.kind).range + unit.radius + target.radius
}

fn nearest_hostile<'a>(
    unit: &Unit,
    snapshot: &'a BTreeMap<UnitTag, Unit>,
    radius: f32,
) -> Option<&'a Unit> {
    snapshot
        .values()
        .filter(|o| o.alliance != unit.alliance && !get_profile(o.kind).ignorable)
        .filter(|o| unit.distance_to(o) <= radius)
        .min_by(|a, b| {
            unit.distance_to(a)
                .total_cmp(&unit.distance_to(b))
                .then_with(|| a.tag.cmp(&b.tag))
        })
}

fn decide_action(
    unit: &Unit,
    order: Option<Order>,
    snapshot: &BTreeMap<UnitTag, Unit>,
) -> Option<Action> {
    let armed = can_fire(unit);
    let movable = !unit.burrowed && get_profile(unit.kind).speed > 0.0;

    match order {
        Some(Order {
            ability: Ability::Move,
            target,
        }) if movable => {
            let point = target.as_point()?;
            if unit.position.is_near(point, MOVE_DONE_DISTANCE) {
                Some(Action::Done)
            } else {
                Some(Action::MoveTo(point))
            }
        }
        Some(Order {
            ability: Ability::Attack,
            target: CommandTarget::Unit { tag },
        }) => {
            let Some(target) = snapshot.get(&tag) else {
                return Some(Action::Done);
            };
            if armed && in_range(unit, target) {
                unit.weapon_ready.then_some(Action::Fire(tag))
            } else if movable {
                Some(Action::MoveTo(target.position))
            } else {
                None
            }
        }
        Some(Order {
            ability: Ability::Attack,
            target,
        }) => {
            // Attack-move: engage whatever comes into sight on the way.
            if armed {
                if let Some(enemy) = nearest_hostile(unit, snapshot, SIGHT_RANGE) {
                    if in_range(unit, enemy) {
                        return unit.weapon_ready.then_some(Action::Fire(enemy.tag));
                    }
                    if movable {
                        return Some(Action::MoveTo(enemy.position));
                    }
                }
            }
            let point = target.as_point()?;
            if !movable {
                None
            } else if unit.position.is_near(point, MOVE_DONE_DISTANCE) {
                Some(Action::Done)
            } else {
                Some(Action::MoveTo(point))
            }
        }
        _ => {
            // Idle units hold position and shoot back.
            if !(armed && unit.weapon_ready) {
                return None;
            }
            let enemy = nearest_hostile(unit, snapshot, SIGHT_RANGE)?;
            in_range(unit, enemy).then_some(Action::Fire(enemy.tag))
        }
    }
}

/// Shields soak damage first, then health.
fn apply_damage(unit: &mut Unit, amount: f32) {
    let profile = get_profile(unit.kind);
    let mut remaining = amount;
    if profile.max_shield > 0.0 {
        let shield_hp = unit.shield * profile.max_shield;
        let absorbed = shield_hp.min(remaining);
        unit.shield = (shield_hp - absorbed) / profile.max_shield;
        remaining -= absorbed;
    }
    if remaining > 0.0 && profile.max_health > 0.0 {
        unit.health = (unit.health - remaining / profile.max_health).max(0.0);
    }
}

impl GameView for Arena {
    fn time(&self) -> SimTime {
        self.time
    }

    fn units(&self) -> Vec<Unit> {
        let own = self.own_units();
        let mut units: Vec<Unit> = self
            .world
            .query::<&Unit>()
            .iter()
            .map(|(_, u)| {
                let mut u = u.clone();
                if u.is_enemy() {
                    u.is_memory = !own.iter().any(|o| o.position.is_near(u.position, SIGHT_RANGE));
                }
                u
            })
            .collect();
        units.sort_by_key(|u| u.tag);
        units
    }

    fn is_visible(&self, position: Point2) -> bool {
        self.own_units()
            .iter()
            .any(|o| o.position.is_near(position, SIGHT_RANGE))
    }

    fn enemy_start_location(&self) -> Point2 {
        self.map.enemy_start
    }

    fn own_natural(&self) -> Point2 {
        self.map.own_natural
    }

    fn expansion_locations(&self) -> Vec<Point2> {
        self.map.expansions.clone()
    }

    fn resource_clusters(&self) -> Vec<ResourceCluster> {
        self.map.clusters.clone()
    }

    fn supply_army(&self) -> f32 {
        self.own_units()
            .iter()
            .map(|u| get_profile(u.kind))
            .filter(|p| !p.is_worker && !p.is_structure)
            .map(|p| p.supply)
            .sum()
    }

    fn supply_left(&self) -> f32 {
        let used: f32 = self.own_units().iter().map(|u| get_profile(u.kind).supply).sum();
        self.map.supply_cap - used
    }
}

impl SpatialQuery for Arena {
    fn query(&self, points: &[Point2], radius: f32, filter: QueryFilter) -> Vec<Vec<UnitTag>> {
        let mut enemies: Vec<(UnitTag, Point2)> = self
            .world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| u.is_enemy())
            .filter(|(_, u)| match filter {
                QueryFilter::AllEnemy => true,
                QueryFilter::EnemyGround => !get_profile(u.kind).is_flying,
            })
            .map(|(_, u)| (u.tag, u.position))
            .collect();
        enemies.sort_by_key(|(tag, _)| *tag);

        points
            .iter()
            .map(|p| {
                enemies
                    .iter()
                    .filter(|(_, pos)| pos.is_near(*p, radius))
                    .map(|(tag, _)| *tag)
                    .collect()
            })
            .collect()
    }
}

impl BuildOrderStatus for Arena {
    fn build_order_complete(&self) -> bool {
        self.time.elapsed_secs >= self.opening.complete_at_secs
    }

    fn opening_override_active(&self) -> bool {
        self.opening.override_active
    }
}
