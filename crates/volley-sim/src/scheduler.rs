//! Attack scheduler: decides when attackers strike and how many strike at once.
//!
//! Each tick advances in-flight attacks first, then makes scheduling
//! decisions:
//! 1. Advance running handles; completions return them to waiting.
//! 2. Waiting attackers out of reach step toward the target.
//! 3. On the launch interval, start one waiting attacker if below the ceiling.
//! 4. On the concurrency check, roll for another attacker to join the volley.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use volley_core::config::SchedulerConfig;
use volley_core::events::StrikeEvent;
use volley_core::state::{PoolView, TargetView};
use volley_core::types::SwarmFrame;

use crate::handle::{AttackHandle, HandleArena, HandleId};
use crate::prediction;

pub struct AttackScheduler {
    config: SchedulerConfig,
    frame: SwarmFrame,
    arena: HandleArena,
    rng: ChaCha8Rng,
    interval_timer: f32,
    next_interval: f32,
    /// Scheduler clock (seconds since the last timer reset).
    elapsed: f32,
    next_concurrency_check_time: f32,
    launched_total: u32,
    warned_no_velocity: bool,
}

impl AttackScheduler {
    pub fn new(
        config: SchedulerConfig,
        frame: SwarmFrame,
        handles: Vec<AttackHandle>,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut scheduler = Self {
            config,
            frame,
            arena: HandleArena::new(handles),
            rng,
            interval_timer: 0.0,
            next_interval: 0.0,
            elapsed: 0.0,
            next_concurrency_check_time: 0.0,
            launched_total: 0,
            warned_no_velocity: false,
        };
        scheduler.reset_timers();
        scheduler.warn_if_inert();
        scheduler
    }

    pub fn arena(&self) -> &HandleArena {
        &self.arena
    }

    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent_swings
    }

    pub fn next_interval(&self) -> f32 {
        self.next_interval
    }

    pub fn pool_view(&self) -> PoolView {
        PoolView {
            waiting: self.arena.waiting_count(),
            active: self.arena.active_count(),
            max_concurrent: self.config.max_concurrent_swings,
            launched_total: self.launched_total,
        }
    }

    /// Run one scheduling step of `dt` seconds against `target`.
    pub fn tick(&mut self, dt: f32, target: &TargetView) -> Vec<StrikeEvent> {
        let mut events = Vec::new();

        // 1. In-flight attacks
        for handle in self.arena.iter_mut() {
            if let Some(done) = handle.advance(dt) {
                tracing::debug!(
                    target: "volley::scheduler",
                    handle = done.handle.0,
                    token = done.token.0,
                    reason = ?done.reason,
                    "strike.completed"
                );
                events.push(StrikeEvent::Completed {
                    handle: done.handle.0,
                    token: done.token.0,
                    reason: done.reason,
                });
            }
        }

        // 2. Idle approach
        let step = self.config.approach_speed * dt;
        if step > 0.0 {
            let moved = self
                .arena
                .iter_mut()
                .map(|handle| handle.approach(target.position, step))
                .filter(|moved| *moved)
                .count();
            if moved > 0 {
                tracing::trace!(target: "volley::scheduler", moved, "pool.approach");
            }
        }

        // 3. Clocks
        self.interval_timer += dt;
        self.elapsed += dt;

        // 4. Launch interval
        if self.interval_timer >= self.next_interval {
            self.interval_timer = 0.0;
            self.next_interval = self.draw_interval();
            if self.has_capacity() {
                self.launch_random(target, &mut events);
            }
        }

        // 5. Concurrency check
        if self.elapsed >= self.next_concurrency_check_time
            && self.arena.active_count() >= 1
            && self.has_capacity()
        {
            self.next_concurrency_check_time = self.elapsed + self.config.concurrency_check_interval;
            if self.rng.gen_bool(probability(self.config.chance_for_concurrency)) {
                self.launch_random(target, &mut events);
            }
        }

        events
    }

    /// Cancel every running attack.
    pub fn stop_all(&mut self) -> Vec<StrikeEvent> {
        let events: Vec<StrikeEvent> = self
            .arena
            .iter_mut()
            .filter_map(|handle| cancel_handle(handle))
            .collect();
        if !events.is_empty() {
            tracing::info!(target: "volley::scheduler", cancelled = events.len(), "strike.stop_all");
        }
        events
    }

    /// Cancel the attack of a single attacker, if it is running.
    pub fn stop_all_from(&mut self, id: HandleId) -> Option<StrikeEvent> {
        match self.arena.get_mut(id) {
            Some(handle) => cancel_handle(handle),
            None => {
                tracing::warn!(target: "volley::scheduler", handle = id.0, "strike.unknown_handle");
                None
            }
        }
    }

    /// Zero the launch timer, redraw the next interval and restart the
    /// concurrency clock.
    pub fn reset_timers(&mut self) {
        self.interval_timer = 0.0;
        self.next_interval = self.draw_interval();
        self.elapsed = 0.0;
        self.next_concurrency_check_time = self.config.concurrency_check_interval;
    }

    /// Cancel all attacks, swap in a new pool and reset timers.
    pub fn replace_pool(&mut self, handles: Vec<AttackHandle>) -> Vec<StrikeEvent> {
        let mut events = self.stop_all();
        self.arena = HandleArena::new(handles);
        self.reset_timers();
        self.warn_if_inert();
        events.push(StrikeEvent::PoolRebuilt {
            attacker_count: self.arena.len(),
        });
        events
    }

    fn has_capacity(&self) -> bool {
        self.arena.waiting_count() > 0
            && self.arena.active_count() < self.config.max_concurrent_swings
    }

    fn draw_interval(&mut self) -> f32 {
        uniform(&mut self.rng, self.config.interval_min, self.config.interval_max)
    }

    fn warn_if_inert(&self) {
        if self.arena.is_empty() {
            tracing::warn!(target: "volley::scheduler", "scheduler.empty_pool");
        }
    }

    /// Pick a waiting attacker uniformly and start its attack.
    fn launch_random(&mut self, target: &TargetView, events: &mut Vec<StrikeEvent>) {
        let waiting = self.arena.waiting_ids();
        if waiting.is_empty() {
            return;
        }
        let id = waiting[self.rng.gen_range(0..waiting.len())];
        let duration = uniform(&mut self.rng, self.config.duration_min, self.config.duration_max);
        let wants_prediction = self.rng.gen_bool(probability(self.config.chance_for_prediction));

        let velocity = match target.velocity {
            Some(velocity) => Some(velocity),
            None => {
                if !self.warned_no_velocity {
                    tracing::warn!(target: "volley::scheduler", "scheduler.no_target_velocity");
                    self.warned_no_velocity = true;
                }
                None
            }
        };
        let frame = self.frame;

        let Some(handle) = self.arena.get_mut(id) else {
            return;
        };

        let lead = match velocity {
            Some(world_velocity) if wants_prediction => {
                let impact_time = handle.weapon_mut().impact_time(duration, target.position);
                let velocity_local = prediction::local_velocity(&frame, world_velocity);
                Some(prediction::lead_point(target.position, velocity_local, impact_time))
            }
            _ => None,
        };

        let weapon = handle.weapon();
        let decision =
            prediction::resolve_aim(weapon.position(), weapon.reach(), target.position, lead);
        let kind = weapon.kind();

        if let Some(predicted) = decision.rejected {
            tracing::debug!(
                target: "volley::scheduler",
                handle = id.0,
                reach = weapon.reach(),
                "strike.prediction_rejected"
            );
            events.push(StrikeEvent::PredictionRejected {
                handle: id.0,
                predicted,
                reach: weapon.reach(),
            });
        }

        match handle.start(duration, decision.aim) {
            Ok(token) => {
                self.launched_total += 1;
                tracing::debug!(
                    target: "volley::scheduler",
                    handle = id.0,
                    token = token.0,
                    duration,
                    predicted = decision.predicted,
                    "strike.launched"
                );
                events.push(StrikeEvent::Launched {
                    handle: id.0,
                    kind,
                    token: token.0,
                    duration,
                    aim: decision.aim,
                    predicted: decision.predicted,
                });
            }
            Err(err) => {
                tracing::error!(target: "volley::scheduler", error = %err, "strike.launch_failed");
            }
        }
    }
}

fn cancel_handle(handle: &mut AttackHandle) -> Option<StrikeEvent> {
    let token = handle.token()?;
    handle.cancel().then(|| StrikeEvent::Cancelled {
        handle: handle.id().0,
        token: token.0,
    })
}

/// Clamp a configured chance for `gen_bool`. NaN never fires.
fn probability(chance: f32) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        f64::from(chance.clamp(0.0, 1.0))
    }
}

/// Uniform draw from `[min, max]`, collapsing to `min` for an empty or
/// unbounded range.
fn uniform(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if max > min && (max - min).is_finite() {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
