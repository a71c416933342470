//! Swarm engine: the headless driver for one attacker swarm.
//!
//! `SwarmEngine` owns the hecs world, the attack scheduler and the seeded
//! RNG. It processes swarm commands at tick boundaries, runs the systems in
//! a fixed order and produces `SwarmSnapshot`s. Same seed and same commands
//! give identical snapshots.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec3;
use hecs::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use volley_core::commands::SwarmCommand;
use volley_core::components::Target;
use volley_core::config::{ConfigError, SwarmConfig};
use volley_core::enums::EpisodePhase;
use volley_core::events::StrikeEvent;
use volley_core::state::SwarmSnapshot;
use volley_core::types::{Position, SimTime, SwarmFrame, Velocity};
use volley_curves::{CurveLibrary, SwingKeyframeSet};

use crate::handle::HandleId;
use crate::pool;
use crate::scheduler::AttackScheduler;
use crate::systems;

/// The swarm engine. Owns the ECS world and all swarm state.
pub struct SwarmEngine {
    world: World,
    config: SwarmConfig,
    frame: SwarmFrame,
    library: Arc<CurveLibrary>,
    keyframes: Arc<SwingKeyframeSet>,
    time: SimTime,
    phase: EpisodePhase,
    rng: ChaCha8Rng,
    scheduler: AttackScheduler,
    command_queue: VecDeque<SwarmCommand>,
    events: Vec<StrikeEvent>,
    warned_no_target: bool,
}

impl SwarmEngine {
    /// Create an engine from a validated config. The pool is built when the
    /// episode starts.
    pub fn new(
        config: SwarmConfig,
        library: Arc<CurveLibrary>,
        keyframes: Arc<SwingKeyframeSet>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let frame = SwarmFrame::new(config.frame_rotation);
        let scheduler = AttackScheduler::new(
            config.scheduler.clone(),
            frame,
            Vec::new(),
            ChaCha8Rng::seed_from_u64(rng.gen()),
        );

        Ok(Self {
            world: World::new(),
            config,
            frame,
            library,
            keyframes,
            time: SimTime::default(),
            phase: EpisodePhase::default(),
            rng,
            scheduler,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            warned_no_target: false,
        })
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SwarmCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SwarmCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the swarm by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SwarmSnapshot {
        self.process_commands();

        if self.phase == EpisodePhase::Active {
            self.run_systems();
            self.time.advance(self.config.dt());
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.scheduler,
            events,
        )
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &AttackScheduler {
        &self.scheduler
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single swarm command.
    fn handle_command(&mut self, command: SwarmCommand) {
        match command {
            SwarmCommand::StartEpisode => {
                self.world.clear();
                self.spawn_target();
                self.rebuild_pool();
                self.time = SimTime::default();
                self.phase = EpisodePhase::Active;
                tracing::info!(target: "volley::engine", seed = self.config.seed, "episode.started");
            }
            SwarmCommand::Pause => {
                if self.phase == EpisodePhase::Active {
                    self.phase = EpisodePhase::Paused;
                }
            }
            SwarmCommand::Resume => {
                if self.phase == EpisodePhase::Paused {
                    self.phase = EpisodePhase::Active;
                }
            }
            SwarmCommand::StopAll => {
                let events = self.scheduler.stop_all();
                self.events.extend(events);
            }
            SwarmCommand::StopAttacker { handle } => {
                if let Some(event) = self.scheduler.stop_all_from(HandleId(handle)) {
                    self.events.push(event);
                }
            }
            SwarmCommand::RebuildPool => {
                self.rebuild_pool();
            }
            SwarmCommand::SetTargetVelocity { velocity } => {
                self.set_target_velocity(velocity);
            }
            SwarmCommand::TeleportTarget { position } => {
                systems::target_motion::teleport(&mut self.world, position);
            }
        }
    }

    fn spawn_target(&mut self) {
        let target = &self.config.target;
        let position = Position(target.start_position);
        match target.velocity {
            Some(velocity) => {
                self.world.spawn((Target, position, Velocity(velocity)));
            }
            None => {
                tracing::warn!(target: "volley::engine", "target.no_velocity_source");
                self.world.spawn((Target, position));
            }
        }
    }

    fn set_target_velocity(&mut self, velocity: Option<Vec3>) {
        let targets: Vec<hecs::Entity> = self
            .world
            .query::<&Target>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in targets {
            match velocity {
                Some(v) => {
                    if let Err(err) = self.world.insert_one(entity, Velocity(v)) {
                        tracing::warn!(target: "volley::engine", error = %err, "target.velocity_update_failed");
                    }
                }
                None => {
                    // Removing an absent velocity is fine.
                    let _ = self.world.remove_one::<Velocity>(entity);
                }
            }
        }
    }

    /// Build a fresh pool around the target, hand it to the scheduler and
    /// respawn attacker bodies.
    fn rebuild_pool(&mut self) {
        let center = systems::target_motion::target_view(&self.world)
            .map_or(self.config.target.start_position, |target| target.position);
        let handles = pool::build_pool(
            &self.config.pool,
            center,
            &self.library,
            &self.keyframes,
            &mut self.rng,
        );
        let events = self.scheduler.replace_pool(handles);
        self.events.extend(events);
        systems::attacker_sync::respawn_bodies(&mut self.world, self.scheduler.arena());
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.config.dt() as f32;

        // 1. Target motion
        systems::target_motion::run(
            &mut self.world,
            dt,
            self.config.target.arena_radius,
            &self.frame,
        );
        // 2-3. Attack advancement and idle approach, then scheduling decisions
        match systems::target_motion::target_view(&self.world) {
            Some(target) => {
                let events = self.scheduler.tick(dt, &target);
                self.events.extend(events);
            }
            None => {
                if !self.warned_no_target {
                    tracing::warn!(target: "volley::engine", "scheduler.no_target");
                    self.warned_no_target = true;
                }
            }
        }
        // 4. Pose sync
        systems::attacker_sync::run(&mut self.world, self.scheduler.arena());
    }
}
