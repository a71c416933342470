//! Attack handles: the scheduling unit pairing one weapon with its
//! idle/running state.
//!
//! Pool membership is derived from the state tag. The waiting pool is the
//! set of `Idle` handles and the active pool the set of `Running` handles,
//! so a handle can never be in both or neither.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use volley_core::enums::{FinishReason, HandleState};

use volley_core::types::Pose;

use crate::weapons::{up_along, CompletionToken, StrikeStep, Weapon};

/// Stable attacker id, equal to its arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("attack handle {0:?} is already running")]
    AlreadyRunning(HandleId),
}

/// Emitted exactly once when a running attack ends on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub handle: HandleId,
    pub token: CompletionToken,
    pub reason: FinishReason,
}

#[derive(Debug)]
pub struct AttackHandle {
    id: HandleId,
    weapon: Box<dyn Weapon>,
    state: HandleState,
    token: Option<CompletionToken>,
}

impl AttackHandle {
    pub fn new(id: HandleId, weapon: Box<dyn Weapon>) -> Self {
        Self {
            id,
            weapon,
            state: HandleState::Idle,
            token: None,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == HandleState::Running
    }

    /// Token of the attack in flight, `None` while idle.
    pub fn token(&self) -> Option<CompletionToken> {
        self.token
    }

    pub fn weapon(&self) -> &dyn Weapon {
        self.weapon.as_ref()
    }

    pub fn weapon_mut(&mut self) -> &mut dyn Weapon {
        self.weapon.as_mut()
    }

    /// Launch an attack. Only valid from `Idle`.
    pub fn start(&mut self, duration: f32, target: Vec3) -> Result<CompletionToken, HandleError> {
        if self.is_running() {
            return Err(HandleError::AlreadyRunning(self.id));
        }
        let token = self.weapon.attack(duration, target);
        self.token = Some(token);
        self.state = HandleState::Running;
        Ok(token)
    }

    /// Advance the running attack by one tick. Returns the completion when
    /// the weapon reports it finished.
    pub fn advance(&mut self, dt: f32) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }
        match self.weapon.advance(dt) {
            StrikeStep::Finished(reason) => {
                let token = self.complete()?;
                Some(Completion {
                    handle: self.id,
                    token,
                    reason,
                })
            }
            StrikeStep::Moving => None,
            StrikeStep::Idle => {
                // Weapon dropped its attack without reporting a finish.
                tracing::warn!(target: "volley::handle", handle = self.id.0, "handle.weapon_idle");
                self.complete();
                None
            }
        }
    }

    /// Step an idle weapon toward `target` until it is within reach, moving at
    /// most `max_step`. Returns whether the weapon moved.
    pub fn approach(&mut self, target: Vec3, max_step: f32) -> bool {
        if self.is_running() || max_step.is_nan() || max_step <= 0.0 {
            return false;
        }
        let position = self.weapon.position();
        let offset = target - position;
        let distance = offset.length();
        let gap = distance - self.weapon.reach();
        if gap.is_nan() || gap <= 0.0 {
            return false;
        }
        let direction = offset / distance;
        let next = position + direction * gap.min(max_step);
        self.weapon.reposition(Pose::new(next, up_along(direction)));
        true
    }

    /// Stop the attack in flight and return to `Idle` without a completion.
    /// Returns whether an attack was cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.weapon.cancel();
        self.token = None;
        self.state = HandleState::Idle;
        true
    }

    /// Return to `Idle`, yielding the finished token. No-op when idle.
    pub fn complete(&mut self) -> Option<CompletionToken> {
        if !self.is_running() {
            return None;
        }
        self.state = HandleState::Idle;
        self.token.take()
    }
}

/// Fixed set of attack handles keyed by `HandleId`.
#[derive(Debug, Default)]
pub struct HandleArena {
    slots: Vec<AttackHandle>,
}

impl HandleArena {
    /// Take ownership of `handles`, renumbering them by slot.
    pub fn new(handles: Vec<AttackHandle>) -> Self {
        let slots = handles
            .into_iter()
            .enumerate()
            .map(|(slot, mut handle)| {
                handle.id = HandleId(slot as u32);
                handle
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: HandleId) -> Option<&AttackHandle> {
        self.slots.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut AttackHandle> {
        self.slots.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackHandle> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AttackHandle> {
        self.slots.iter_mut()
    }

    /// Ids of idle handles, in slot order.
    pub fn waiting_ids(&self) -> Vec<HandleId> {
        self.ids_in(HandleState::Idle)
    }

    /// Ids of running handles, in slot order.
    pub fn active_ids(&self) -> Vec<HandleId> {
        self.ids_in(HandleState::Running)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|h| h.is_running()).count()
    }

    pub fn waiting_count(&self) -> usize {
        self.slots.len() - self.active_count()
    }

    fn ids_in(&self, state: HandleState) -> Vec<HandleId> {
        self.slots
            .iter()
            .filter(|h| h.state == state)
            .map(|h| h.id)
            .collect()
    }
}
