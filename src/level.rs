//! Level description
//!
//! A level arrives as JSON from whatever tooling exported it. Nothing here
//! touches the filesystem; callers hand over the text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_LEVEL_HEIGHT, DEFAULT_LEVEL_WIDTH};
use crate::tuning::Tuning;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level size must be positive, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("gravity must be finite, got {0}")]
    InvalidGravity(f64),

    #[error("friction must be in (0, 1), got {0}")]
    InvalidFriction(f64),

    #[error("level needs at least one lap")]
    NoLaps,

    #[error("level has no player")]
    MissingPlayer,

    #[error("level has more than one player (body {0})")]
    DuplicatePlayer(usize),

    #[error("level has more than one finish line (body {0})")]
    DuplicateFinish(usize),

    #[error("level has checkpoints but no finish line")]
    CheckpointsWithoutFinish,

    #[error("finish line needs at least one checkpoint")]
    FinishWithoutCheckpoints,

    #[error("body {index} has a negative size {width}x{height}")]
    NegativeBodySize { index: usize, width: i32, height: i32 },

    #[error("random squares need a positive size, got {0}")]
    InvalidSquareSize(i32),

    #[error("too many random squares: {count}, at most {max} fit")]
    TooManySquares { count: u32, max: u32 },
}

/// Upper bound on random squares regardless of level area
pub const MAX_RANDOM_SQUARES: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Player,
    Wall,
    Square,
    Checkpoint,
    Finish,
    Tester,
    Background,
}

impl SpecKind {
    /// Whether the kind blocks motion unless the level says otherwise
    pub fn default_solid(&self) -> bool {
        matches!(
            self,
            SpecKind::Player | SpecKind::Wall | SpecKind::Square | SpecKind::Tester
        )
    }
}

/// One body to place in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySpec {
    pub kind: SpecKind,
    pub x: i32,
    pub y: i32,
    /// Hit rect size; zero for player/tester means "use the tuning footprint"
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub hit_offset_x: i32,
    #[serde(default)]
    pub hit_offset_y: i32,
    #[serde(default)]
    pub solid: Option<bool>,
    /// Initial velocity, squares only
    #[serde(default)]
    pub velocity: Option<(f64, f64)>,
    #[serde(default)]
    pub color: Option<[u8; 4]>,
}

impl BodySpec {
    pub fn new(kind: SpecKind, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
            hit_offset_x: 0,
            hit_offset_y: 0,
            solid: None,
            velocity: None,
            color: None,
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.velocity = Some((vx, vy));
        self
    }

    pub fn solid(&self) -> bool {
        self.solid.unwrap_or_else(|| self.kind.default_solid())
    }
}

/// Drifting squares scattered over free space at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareSwarm {
    pub count: u32,
    pub size: i32,
}

impl SquareSwarm {
    /// Most squares of this size the level area could hold, capped at
    /// `MAX_RANDOM_SQUARES`
    pub fn max_count(&self, width: i32, height: i32) -> u32 {
        if self.size <= 0 || width <= 0 || height <= 0 {
            return 0;
        }
        let area = i64::from(width) * i64::from(height);
        let cell = i64::from(self.size) * i64::from(self.size);
        u32::try_from(area / cell)
            .unwrap_or(u32::MAX)
            .min(MAX_RANDOM_SQUARES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    pub gravity: f64,
    /// Per-tick velocity multiplier in free flight
    pub friction: f64,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    pub max_laps: u32,
    /// Falls back to the player's placement when absent
    #[serde(default)]
    pub player_spawn: Option<(i32, i32)>,
    /// Seed for random square placement
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub random_squares: Option<SquareSwarm>,
    #[serde(default)]
    pub tuning: Tuning,
    pub bodies: Vec<BodySpec>,
}

fn default_width() -> i32 {
    DEFAULT_LEVEL_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_LEVEL_HEIGHT
}

impl LevelConfig {
    /// Parse and validate a level
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelConfig = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(LevelError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !self.gravity.is_finite() {
            return Err(LevelError::InvalidGravity(self.gravity));
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(LevelError::InvalidFriction(self.friction));
        }
        if self.max_laps == 0 {
            return Err(LevelError::NoLaps);
        }
        if let Some(swarm) = self.random_squares {
            if swarm.size <= 0 {
                return Err(LevelError::InvalidSquareSize(swarm.size));
            }
            let max = swarm.max_count(self.width, self.height);
            if swarm.count > max {
                return Err(LevelError::TooManySquares {
                    count: swarm.count,
                    max,
                });
            }
        }

        let mut player = None;
        let mut finish = None;
        let mut checkpoints = 0;
        for (index, body) in self.bodies.iter().enumerate() {
            if body.width < 0 || body.height < 0 {
                return Err(LevelError::NegativeBodySize {
                    index,
                    width: body.width,
                    height: body.height,
                });
            }
            match body.kind {
                SpecKind::Player if player.is_some() => {
                    return Err(LevelError::DuplicatePlayer(index));
                }
                SpecKind::Player => player = Some(index),
                SpecKind::Finish if finish.is_some() => {
                    return Err(LevelError::DuplicateFinish(index));
                }
                SpecKind::Finish => finish = Some(index),
                SpecKind::Checkpoint => checkpoints += 1,
                _ => {}
            }
        }

        if player.is_none() {
            return Err(LevelError::MissingPlayer);
        }
        if checkpoints > 0 && finish.is_none() {
            return Err(LevelError::CheckpointsWithoutFinish);
        }
        // Without a gate every tick spent on the line would count as a lap
        if checkpoints == 0 && finish.is_some() {
            return Err(LevelError::FinishWithoutCheckpoints);
        }
        Ok(())
    }

    /// Where the player (re)spawns
    pub fn spawn_point(&self) -> Option<(i32, i32)> {
        self.player_spawn.or_else(|| {
            self.bodies
                .iter()
                .find(|b| b.kind == SpecKind::Player)
                .map(|b| (b.x, b.y))
        })
    }
}
