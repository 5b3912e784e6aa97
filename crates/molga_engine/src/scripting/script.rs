//! Script specialization of [`Component`]
//!
//! Scripts add start-once, fixed-step, late-update and collision hooks on
//! top of the component lifecycle. The runtime marks a script as started
//! right after `start` returns, so implementations never manage that flag.

use crate::ecs::{Component, ComponentContext, EntityId};

/// Overlap transition delivered to scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEvent {
    /// Two solid colliders started overlapping
    CollisionEnter,
    /// Two solid colliders are still overlapping
    CollisionStay,
    /// Two solid colliders stopped overlapping
    CollisionExit,
    /// A trigger started overlapping another collider
    TriggerEnter,
    /// A trigger is still overlapping another collider
    TriggerStay,
    /// A trigger stopped overlapping another collider
    TriggerExit,
}

impl CollisionEvent {
    /// Enter event for a pair, trigger variant if either side is a trigger
    pub fn enter(trigger: bool) -> Self {
        if trigger { Self::TriggerEnter } else { Self::CollisionEnter }
    }

    /// Stay event for a pair
    pub fn stay(trigger: bool) -> Self {
        if trigger { Self::TriggerStay } else { Self::CollisionStay }
    }

    /// Exit event for a pair
    pub fn exit(trigger: bool) -> Self {
        if trigger { Self::TriggerExit } else { Self::CollisionExit }
    }
}

/// Component with extended lifecycle hooks
///
/// Implementors must also return `Some(self)` from
/// [`Component::as_script`] and [`Component::as_script_mut`].
///
/// `fixed_update` and `late_update` are driven by the game loop at its
/// discretion. Collision hooks come from whichever collision system the host
/// runs; scripts must not assume a fixed order relative to `update`.
pub trait Script: Component {
    /// Runs once, on the first update that reaches this script
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Fixed-step update
    fn fixed_update(&mut self, _ctx: &mut ComponentContext<'_>, _fixed_delta: f32) {}

    /// Runs after every entity has been updated
    fn late_update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {}

    /// The script was enabled
    fn on_enable(&mut self) {}

    /// The script was disabled
    fn on_disable(&mut self) {}

    /// A solid overlap with `other` began
    fn on_collision_enter(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}

    /// A solid overlap with `other` continues
    fn on_collision_stay(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}

    /// A solid overlap with `other` ended
    fn on_collision_exit(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}

    /// A trigger overlap with `other` began
    fn on_trigger_enter(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}

    /// A trigger overlap with `other` continues
    fn on_trigger_stay(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}

    /// A trigger overlap with `other` ended
    fn on_trigger_exit(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityId) {}
}
