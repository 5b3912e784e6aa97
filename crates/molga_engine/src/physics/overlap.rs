//! Collider overlap tracking
//!
//! Detects overlapping [`BoxCollider2D`]s once per engine tick, after late
//! update, and turns the difference between this tick's pairs and the
//! previous tick's pairs into enter/stay/exit callbacks on both entities'
//! scripts.

use std::collections::HashSet;

use crate::ecs::{BoxCollider2D, EntityId};
use crate::foundation::math::Aabb;
use crate::scene::Scene;
use crate::scripting::CollisionEvent;

/// Two overlapping entities, smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlapPair {
    /// Entity with the smaller id
    pub entity_a: EntityId,
    /// Entity with the larger id
    pub entity_b: EntityId,
    /// Either collider is a trigger
    pub trigger: bool,
}

impl OverlapPair {
    /// Create a pair, ordering the ids
    pub fn new(entity_a: EntityId, entity_b: EntityId, trigger: bool) -> Self {
        if entity_a < entity_b {
            Self { entity_a, entity_b, trigger }
        } else {
            Self { entity_a: entity_b, entity_b: entity_a, trigger }
        }
    }

    fn same_entities(&self, other: &Self) -> bool {
        self.entity_a == other.entity_a && self.entity_b == other.entity_b
    }
}

#[derive(Debug, Clone, Copy)]
struct ColliderBox {
    entity: EntityId,
    aabb: Aabb,
    trigger: bool,
}

/// Tracks collider overlaps from one tick to the next
#[derive(Debug, Default)]
pub struct OverlapTracker {
    current_pairs: HashSet<OverlapPair>,
    previous_pairs: HashSet<OverlapPair>,
}

impl OverlapTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs overlapping after the last [`step`](Self::step)
    pub fn current_pairs(&self) -> impl Iterator<Item = &OverlapPair> {
        self.current_pairs.iter()
    }

    /// Whether two entities overlapped at the last step
    pub fn is_overlapping(&self, a: EntityId, b: EntityId) -> bool {
        let probe = OverlapPair::new(a, b, false);
        self.current_pairs.iter().any(|pair| pair.same_entities(&probe))
    }

    /// Forget all pairs without dispatching exits
    pub fn clear(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }

    /// Detect overlaps in `scene` and dispatch the resulting events
    ///
    /// Returns the number of events dispatched, counting each side.
    pub fn step(&mut self, scene: &mut Scene) -> usize {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let boxes = collect_boxes(scene);
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                if a.aabb.intersects(&b.aabb) {
                    self.current_pairs
                        .insert(OverlapPair::new(a.entity, b.entity, a.trigger || b.trigger));
                }
            }
        }

        let mut events: Vec<(OverlapPair, CollisionEvent)> = Vec::new();
        for pair in &self.current_pairs {
            let event = if self.previous_pairs.iter().any(|prev| prev.same_entities(pair)) {
                CollisionEvent::stay(pair.trigger)
            } else {
                CollisionEvent::enter(pair.trigger)
            };
            events.push((*pair, event));
        }
        for pair in &self.previous_pairs {
            if !self.current_pairs.iter().any(|cur| cur.same_entities(pair)) {
                events.push((*pair, CollisionEvent::exit(pair.trigger)));
            }
        }
        // Deterministic dispatch order regardless of hashing.
        events.sort_by_key(|(pair, _)| (pair.entity_a, pair.entity_b));

        for (pair, event) in &events {
            scene.dispatch_collision(pair.entity_a, *event, pair.entity_b);
            scene.dispatch_collision(pair.entity_b, *event, pair.entity_a);
        }

        if !events.is_empty() {
            log::trace!("Dispatched {} overlap events", events.len() * 2);
        }
        events.len() * 2
    }
}

fn collect_boxes(scene: &Scene) -> Vec<ColliderBox> {
    scene
        .iter()
        .filter(|entity| entity.is_active())
        .filter_map(|entity| {
            let collider = entity
                .components()
                .iter()
                .filter(|instance| instance.is_enabled())
                .find_map(|instance| instance.downcast_ref::<BoxCollider2D>())?;
            let world = scene.world_transform(entity.id())?;
            Some(ColliderBox {
                entity: entity.id(),
                aabb: collider.world_aabb(&world),
                trigger: collider.is_trigger,
            })
        })
        .collect()
}
