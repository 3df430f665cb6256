//! World state for one loaded level
//!
//! Everything a tick reads or writes lives here: the level-wide physics
//! context, the body roster in fixed order, and the race progress.

use std::time::Duration;

use glam::{DVec2, IVec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind, CheckpointState, FinishState, PlayerState, TesterState};
use super::race::{RacePhase, RaceState};
use super::rect::Rect;
use super::spawn::scatter_squares;
use crate::level::{BodySpec, LevelConfig, LevelError, SpecKind};
use crate::tuning::{Footprint, Tuning};

/// Level-wide physics parameters, fixed for the lifetime of a loaded level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationContext {
    pub gravity: f64,
    /// Per-tick velocity multiplier in free flight (< 1)
    pub friction: f64,
    pub width: i32,
    pub height: i32,
    pub player_spawn: (i32, i32),
    pub tuning: Tuning,
}

impl SimulationContext {
    pub fn from_level(level: &LevelConfig) -> Result<Self, LevelError> {
        let player_spawn = level.spawn_point().ok_or(LevelError::MissingPlayer)?;
        Ok(Self {
            gravity: level.gravity,
            friction: level.friction,
            width: level.width,
            height: level.height,
            player_spawn,
            tuning: level.tuning.clone(),
        })
    }
}

/// Per-body data handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub id: u32,
    pub kind: &'static str,
    pub pos: DVec2,
    pub rotation: f64,
    pub size: IVec2,
    pub hit_rect: Rect,
    pub hit: bool,
    pub color: [u8; 4],
}

/// Race and physics figures for the HUD
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub phase: RacePhase,
    pub current_lap: u32,
    pub max_laps: u32,
    pub lap_times: Vec<Duration>,
    pub current_lap_time: Duration,
    pub best_lap: Option<Duration>,
    pub gravity: f64,
    pub friction: f64,
    pub grounded: bool,
}

/// A loaded level: context, body roster and race progress
#[derive(Debug, Clone)]
pub struct World {
    pub name: String,
    pub ctx: SimulationContext,
    /// Active bodies in roster order (integration and collision order)
    pub bodies: Vec<Body>,
    pub race: RaceState,
    /// Simulation tick counter
    pub time_ticks: u64,
    player: usize,
    finish: Option<usize>,
    level: LevelConfig,
    next_id: u32,
}

impl World {
    /// Build the roster for a validated level
    pub fn from_level(level: &LevelConfig) -> Result<Self, LevelError> {
        level.validate()?;
        let ctx = SimulationContext::from_level(level)?;

        let mut world = Self {
            name: level.name.clone(),
            ctx,
            bodies: Vec::with_capacity(level.bodies.len()),
            race: RaceState::new(level.max_laps),
            time_ticks: 0,
            player: 0,
            finish: None,
            level: level.clone(),
            next_id: 1,
        };

        for spec in &level.bodies {
            let id = world.next_entity_id();
            let body = build_body(id, spec, &world.ctx.tuning);
            world.bodies.push(body);
        }

        if let Some(swarm) = level.random_squares {
            let mut rng = Pcg32::seed_from_u64(level.seed);
            let squares = scatter_squares(
                &world.bodies,
                swarm,
                world.ctx.width,
                world.ctx.height,
                &mut rng,
            );
            for mut square in squares {
                square.id = world.next_entity_id();
                world.bodies.push(square);
            }
        }

        world.player = world
            .bodies
            .iter()
            .position(|b| b.kind.is_player())
            .ok_or(LevelError::MissingPlayer)?;
        world.finish = world
            .bodies
            .iter()
            .position(|b| matches!(b.kind, BodyKind::Finish(_)));

        let checkpoints: Vec<usize> = world
            .bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b.kind, BodyKind::Checkpoint(_)))
            .map(|(i, _)| i)
            .collect();
        if let Some(finish) = world.finish {
            if let BodyKind::Finish(state) = &mut world.bodies[finish].kind {
                state.checkpoints = checkpoints;
            }
        }

        log::info!(
            "Loaded level '{}': {}x{}, gravity {}, friction {}, {} laps, {} bodies",
            world.name,
            world.ctx.width,
            world.ctx.height,
            world.ctx.gravity,
            world.ctx.friction,
            world.race.max_laps,
            world.bodies.len()
        );

        Ok(world)
    }

    /// Discard the roster and race progress and rebuild from the level
    pub fn reload(&mut self) -> Result<(), LevelError> {
        let level = self.level.clone();
        *self = World::from_level(&level)?;
        Ok(())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player_index(&self) -> usize {
        self.player
    }

    pub fn player(&self) -> &Body {
        &self.bodies[self.player]
    }

    pub fn player_mut(&mut self) -> &mut Body {
        &mut self.bodies[self.player]
    }

    pub fn finish_index(&self) -> Option<usize> {
        self.finish
    }

    /// Roster indices of the checkpoints gating a lap
    pub fn checkpoint_indices(&self) -> &[usize] {
        match self.finish.map(|i| &self.bodies[i].kind) {
            Some(BodyKind::Finish(state)) => &state.checkpoints,
            _ => &[],
        }
    }

    pub fn checkpoint_done(&self, index: usize) -> bool {
        matches!(self.bodies[index].kind, BodyKind::Checkpoint(CheckpointState { done: true }))
    }

    pub fn all_checkpoints_done(&self) -> bool {
        self.checkpoint_indices()
            .iter()
            .all(|&i| self.checkpoint_done(i))
    }

    /// Open every checkpoint again for the next lap
    pub fn rearm_checkpoints(&mut self) {
        let indices = self.checkpoint_indices().to_vec();
        for i in indices {
            let body = &mut self.bodies[i];
            if let BodyKind::Checkpoint(cp) = &mut body.kind {
                cp.done = false;
            }
            body.hit = false;
        }
    }

    pub fn render_views(&self) -> impl Iterator<Item = RenderView> + '_ {
        self.bodies.iter().map(|b| RenderView {
            id: b.id,
            kind: b.kind.name(),
            pos: b.pos,
            rotation: b.rotation,
            size: b.size,
            hit_rect: b.shape.rect,
            hit: b.hit,
            color: b.color,
        })
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.race.phase(),
            current_lap: self.race.current_lap.min(self.race.max_laps),
            max_laps: self.race.max_laps,
            lap_times: self.race.lap_times(),
            current_lap_time: self.race.current_lap_time(self.time_ticks),
            best_lap: self.race.best_lap(),
            gravity: self.ctx.gravity,
            friction: self.ctx.friction,
            grounded: self.player().grounded(),
        }
    }
}

fn default_color(kind: SpecKind) -> [u8; 4] {
    match kind {
        SpecKind::Player => [255, 0, 0, 128],
        SpecKind::Wall => [0, 0, 255, 128],
        SpecKind::Square => [255, 0, 255, 128],
        SpecKind::Checkpoint => [0, 255, 255, 64],
        SpecKind::Finish => [255, 255, 255, 64],
        SpecKind::Tester => [0, 255, 0, 128],
        SpecKind::Background => [255, 255, 255, 255],
    }
}

/// Footprint from the level when it gives one, else the tuning default
fn footprint_for(spec: &BodySpec, fallback: Footprint) -> Footprint {
    if spec.width > 0 && spec.height > 0 {
        Footprint::new(spec.hit_offset_x, spec.hit_offset_y, spec.width, spec.height)
    } else {
        fallback
    }
}

fn build_body(id: u32, spec: &BodySpec, tuning: &Tuning) -> Body {
    let (kind, footprint) = match spec.kind {
        SpecKind::Player => {
            let footprint = footprint_for(spec, tuning.player.footprint);
            (
                BodyKind::Player(PlayerState {
                    grounded: false,
                    footprint,
                }),
                footprint,
            )
        }
        SpecKind::Tester => {
            let footprint = footprint_for(spec, tuning.tester.footprint);
            (BodyKind::Tester(TesterState { footprint }), footprint)
        }
        other => {
            let kind = match other {
                SpecKind::Wall => BodyKind::Wall,
                SpecKind::Square => BodyKind::Square,
                // Checkpoints start done so the first finish pass starts the race
                SpecKind::Checkpoint => BodyKind::Checkpoint(CheckpointState { done: true }),
                SpecKind::Finish => BodyKind::Finish(FinishState::default()),
                _ => BodyKind::Background,
            };
            (
                kind,
                Footprint::new(spec.hit_offset_x, spec.hit_offset_y, spec.width, spec.height),
            )
        }
    };

    let body = Body::new(
        id,
        kind,
        spec.x,
        spec.y,
        footprint.offset_x,
        footprint.offset_y,
        footprint.width,
        footprint.height,
        spec.solid(),
    )
    .with_color(spec.color.unwrap_or_else(|| default_color(spec.kind)));

    match spec.velocity {
        Some((vx, vy)) if spec.kind == SpecKind::Square => body.with_velocity(DVec2::new(vx, vy)),
        _ => body,
    }
}
