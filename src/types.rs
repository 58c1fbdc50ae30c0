// Core simulation data model: the unit arena, control groups and the
// command marker. These are plain structs registered as Bevy resources so the
// whole simulation context is owned explicitly and can be driven headlessly
// from tests.
use bevy::prelude::*;

use crate::constants::*;

/// Stable generational handle into the unit pool. Slots are tombstoned on
/// deactivation and may be reused by a later spawn; the generation bump makes
/// stale handles held by control groups resolve to `None` instead of silently
/// pointing at a reincarnated unit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UnitId {
    pub index: u32,
    pub generation: u32,
}

/// One simulated agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit {
    pub position: Vec3,
    /// Present for parity with the render side; movement is kinematic and
    /// never integrates this.
    pub velocity: Vec3,
    /// Current wander goal (autonomous behavior).
    pub wander_target: Vec3,
    /// Player-issued goal, valid while `has_command` is set.
    pub command_target: Vec3,
    pub has_command: bool,
    /// Heading in radians, atan2(z, x) convention.
    pub rotation: f32,
    /// Countdown to the next wander decision, clamped to >= 0.
    pub move_timer: f32,
    /// Collision radius proxy.
    pub size: f32,
    pub active: bool,
    pub selected: bool,
    /// 0 = no group, 1-9 = control groups.
    pub group_id: u8,
}

impl Unit {
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            wander_target: position,
            command_target: position,
            has_command: false,
            rotation,
            move_timer: 0.0,
            size: UNIT_SIZE,
            active: true,
            selected: false,
            group_id: 0,
        }
    }
}

#[derive(Clone, Copy)]
struct Slot {
    unit: Unit,
    generation: u32,
}

/// Fixed-capacity arena of unit slots. Iteration order is slot order, which
/// doubles as the deterministic update and formation-assignment order.
#[derive(Resource, Default)]
pub struct UnitPool {
    slots: Vec<Slot>,
}

impl UnitPool {
    /// Spawn a new unit, reusing the first tombstoned slot if one exists.
    /// Returns `None` when all `MAX_UNITS` slots hold live units (silent drop).
    pub fn spawn(&mut self, position: Vec3, rotation: f32) -> Option<UnitId> {
        if let Some(index) = self.slots.iter().position(|slot| !slot.unit.active) {
            let slot = &mut self.slots[index];
            slot.generation += 1;
            slot.unit = Unit::new(position, rotation);
            return Some(UnitId {
                index: index as u32,
                generation: slot.generation,
            });
        }

        if self.slots.len() >= MAX_UNITS {
            return None;
        }

        self.slots.push(Slot {
            unit: Unit::new(position, rotation),
            generation: 0,
        });
        Some(UnitId {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        })
    }

    /// Tombstone a unit. An inactive unit is never selected, never commanded
    /// and never grouped, so the flags are cleared here rather than trusting
    /// every reader to check.
    pub fn deactivate(&mut self, id: UnitId) {
        if let Some(unit) = self.get_mut(id) {
            unit.active = false;
            unit.selected = false;
            unit.has_command = false;
            unit.group_id = 0;
        }
    }

    /// Deactivate every live unit. Slots and generations are retained so any
    /// outstanding handle simply stops resolving.
    pub fn clear(&mut self) {
        let ids: Vec<UnitId> = self.iter_active().map(|(id, _)| id).collect();
        for id in ids {
            self.deactivate(id);
        }
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.unit.active)
            .map(|slot| &slot.unit)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.unit.active)
            .map(|slot| &mut slot.unit)
    }

    /// Number of slots ever allocated (including tombstones).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Direct slot access for the in-order movement update. Returns inactive
    /// units too; callers check `active`.
    pub fn unit_at(&self, index: usize) -> Option<&Unit> {
        self.slots.get(index).map(|slot| &slot.unit)
    }

    pub fn unit_at_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.slots.get_mut(index).map(|slot| &mut slot.unit)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.unit.active)
            .map(|(index, slot)| {
                (
                    UnitId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &slot.unit,
                )
            })
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.unit.active).count()
    }

    pub fn selected_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.unit.active && slot.unit.selected)
            .count()
    }

    pub fn deselect_all(&mut self) {
        for slot in &mut self.slots {
            slot.unit.selected = false;
        }
    }
}

#[derive(Default, Clone)]
pub struct ControlGroup {
    /// Unit handles in assignment order. Stale handles are filtered when the
    /// group is queried, never eagerly purged.
    pub members: Vec<UnitId>,
    pub active: bool,
}

/// The nine control group slots (1-9). Slot 0 is unused.
#[derive(Resource, Default)]
pub struct ControlGroups {
    groups: [ControlGroup; 10],
}

impl ControlGroups {
    /// Assign the current selection to group `number`, replacing that group's
    /// membership. Selected units leave their previous group, preserving the
    /// relative order of the units that stay behind. Out-of-range numbers are
    /// a silent no-op.
    pub fn assign(&mut self, number: u8, pool: &mut UnitPool) {
        if !(1..=9).contains(&number) {
            return;
        }

        let selected: Vec<(UnitId, u8)> = pool
            .iter_active()
            .filter(|(_, unit)| unit.selected)
            .map(|(id, unit)| (id, unit.group_id))
            .collect();

        for &(id, old_group) in &selected {
            if old_group != 0 && old_group != number {
                self.groups[old_group as usize].members.retain(|&m| m != id);
            }
            if let Some(unit) = pool.get_mut(id) {
                unit.group_id = number;
            }
        }

        let group = &mut self.groups[number as usize];
        group.members = selected.iter().map(|&(id, _)| id).collect();
        group.active = true;
    }

    /// Reselect group `number`: deselects everything, selects every member
    /// handle that still resolves to a live unit and returns their centroid.
    /// `None` when the number is out of range, the group is inactive or empty,
    /// or no member resolves.
    pub fn select(&self, number: u8, pool: &mut UnitPool) -> Option<Vec3> {
        if !(1..=9).contains(&number) {
            return None;
        }
        let group = &self.groups[number as usize];
        if !group.active || group.members.is_empty() {
            return None;
        }

        pool.deselect_all();

        let mut sum = Vec3::ZERO;
        let mut valid = 0usize;
        for &id in &group.members {
            if let Some(unit) = pool.get_mut(id) {
                unit.selected = true;
                sum += unit.position;
                valid += 1;
            }
        }

        (valid > 0).then(|| sum / valid as f32)
    }

    pub fn group(&self, number: u8) -> Option<&ControlGroup> {
        (1..=9).contains(&number).then(|| &self.groups[number as usize])
    }

    /// Group numbers that currently hold at least one live unit, for the info
    /// overlay.
    pub fn occupied_numbers(&self, pool: &UnitPool) -> Vec<u8> {
        (1..=9u8)
            .filter(|&n| {
                let group = &self.groups[n as usize];
                group.active && group.members.iter().any(|&id| pool.get(id).is_some())
            })
            .collect()
    }
}

/// Single process-wide feedback token for the last issued move command.
#[derive(Resource, Default, Clone, Copy)]
pub struct CommandMarker {
    pub position: Vec3,
    pub timer: f32,
    pub active: bool,
}

impl CommandMarker {
    /// (Re)arm the marker at the raw command target.
    pub fn arm(&mut self, position: Vec3) {
        self.position = position;
        self.timer = COMMAND_MARKER_LIFETIME;
        self.active = true;
    }

    pub fn tick(&mut self, delta: f32) {
        if !self.active {
            return;
        }
        self.timer -= delta;
        if self.timer <= 0.0 {
            self.active = false;
        }
    }
}

/// World-space bounds of the loaded scene, aggregated over every mesh.
/// Centers the cameras and sizes the unit spawn radius.
#[derive(Resource)]
pub struct SceneBounds {
    pub center: Vec3,
    pub max_dimension: f32,
    pub ready: bool,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            max_dimension: 10.0,
            ready: false,
        }
    }
}

impl SceneBounds {
    pub fn spawn_radius(&self) -> f32 {
        self.max_dimension * 2.0
    }
}

/// Display toggles for the overlay and debug drawings. `units` also pauses
/// the simulation update, matching the viewer's U key.
#[derive(Resource)]
pub struct DisplayToggles {
    pub info: bool,
    pub grid: bool,
    pub axes: bool,
    pub units: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            info: true,
            grid: true,
            axes: true,
            units: true,
        }
    }
}
