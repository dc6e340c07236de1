//! Detection Zones
//!
//! Track which bodies occupy a trigger volume and report when the first
//! one enters and the last one leaves. Occupants that disappear without an
//! exit notification (destroyed, deactivated) are pruned every fixed step.

use crate::physics::BodyId;

/// Occupancy transition of a detection zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneEvent {
    FirstEnter,
    LastExit,
}

#[derive(Debug, Clone)]
pub struct DetectionZone<T = BodyId> {
    occupants: Vec<T>,
}

impl<T> Default for DetectionZone<T> {
    fn default() -> Self {
        Self {
            occupants: Vec::new(),
        }
    }
}

impl<T: Copy + PartialEq + std::fmt::Debug> DetectionZone<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zone only needs per-step pruning while occupied.
    pub fn is_active(&self) -> bool {
        !self.occupants.is_empty()
    }

    pub fn occupants(&self) -> &[T] {
        &self.occupants
    }

    pub fn contains(&self, occupant: T) -> bool {
        self.occupants.contains(&occupant)
    }

    /// Record an occupant entering. Repeated enters are ignored.
    pub fn enter(&mut self, occupant: T) -> Option<ZoneEvent> {
        if self.contains(occupant) {
            return None;
        }
        let first = self.occupants.is_empty();
        self.occupants.push(occupant);
        if first {
            tracing::debug!(?occupant, "detection zone first enter");
            Some(ZoneEvent::FirstEnter)
        } else {
            None
        }
    }

    /// Record an occupant leaving. Unknown occupants are ignored.
    pub fn exit(&mut self, occupant: T) -> Option<ZoneEvent> {
        let index = self.occupants.iter().position(|o| *o == occupant)?;
        self.occupants.remove(index);
        self.last_exit_if_empty()
    }

    /// Drop occupants for which `alive` returns false.
    pub fn prune(&mut self, mut alive: impl FnMut(T) -> bool) -> Option<ZoneEvent> {
        if self.occupants.is_empty() {
            return None;
        }
        self.occupants.retain(|occupant| alive(*occupant));
        self.last_exit_if_empty()
    }

    /// Tear the zone down, reporting a last exit if anything was inside.
    pub fn disable(&mut self) -> Option<ZoneEvent> {
        if self.occupants.is_empty() {
            return None;
        }
        self.occupants.clear();
        tracing::debug!("detection zone disabled while occupied");
        Some(ZoneEvent::LastExit)
    }

    fn last_exit_if_empty(&self) -> Option<ZoneEvent> {
        if self.occupants.is_empty() {
            tracing::debug!("detection zone last exit");
            Some(ZoneEvent::LastExit)
        } else {
            None
        }
    }
}
