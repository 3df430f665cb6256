//! Per-tick motion integration
//!
//! Runs once per tick for every integrating body, before collision
//! coordination. Every kind ends the same way: `pos += vel`, then the hit rect
//! snaps to `floor(pos) + offset`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind};
use super::state::SimulationContext;
use crate::normalize_angle;

/// Player controls sampled for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerIntent {
    /// Main engine
    pub thrust: bool,
    /// Retro engine
    pub retro: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// Teleport back to the level's spawn point
    pub reset: bool,
}

impl PlayerIntent {
    /// Controls honored while standing on a wall: main engine and reset only
    pub fn masked(self, grounded: bool) -> Self {
        if !grounded {
            return self;
        }
        Self {
            thrust: self.thrust,
            reset: self.reset,
            ..Self::default()
        }
    }
}

/// Direct controls for the scripted test body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

/// Advance a body by one tick according to its kind
pub fn integrate(
    body: &mut Body,
    player: &PlayerIntent,
    tester: &TesterIntent,
    ctx: &SimulationContext,
) {
    match body.kind {
        BodyKind::Player(_) => integrate_player(body, player, ctx),
        BodyKind::Tester(_) => integrate_tester(body, tester, ctx),
        BodyKind::Square => integrate_drift(body),
        BodyKind::Wall | BodyKind::Checkpoint(_) | BodyKind::Finish(_) | BodyKind::Background => {}
    }
}

/// Constant-velocity drift; only collisions change the velocity
pub fn integrate_drift(body: &mut Body) {
    body.pos += body.vel;
    body.sync_rect();
}

/// Thrust, rotation, gravity and friction for the lander
pub fn integrate_player(body: &mut Body, intent: &PlayerIntent, ctx: &SimulationContext) {
    let (grounded, footprint) = match &body.kind {
        BodyKind::Player(p) => (p.grounded, p.footprint),
        _ => return,
    };
    let tuning = &ctx.tuning.player;

    if intent.reset {
        let (x, y) = ctx.player_spawn;
        body.reset_to(x, y);
    }

    let turn = tuning.rotation_speed();
    if intent.rotate_left {
        body.rotate(-turn);
    }
    if intent.rotate_right {
        body.rotate(turn);
    }

    let zx = body.rotation.sin();
    let zy = body.rotation.cos();

    body.morph_shape(&footprint);

    // Nose direction is (sin r, -cos r) in screen space
    if intent.thrust {
        body.vel.x += tuning.thrust * zx;
        body.vel.y -= tuning.thrust * zy;
    }
    if intent.retro {
        body.vel.x -= tuning.retro * zx;
        body.vel.y += tuning.retro * zy;
    }
    if intent.strafe_right {
        body.vel.x += tuning.retro * zy;
        body.vel.y += tuning.retro * zx;
    }
    if intent.strafe_left {
        body.vel.x -= tuning.retro * zy;
        body.vel.y -= tuning.retro * zx;
    }

    if grounded {
        settle_upright(body, ctx);
    } else {
        apply_pitch_torque(body, ctx);
        body.vel *= ctx.friction * tuning.weight;
        body.vel.y += ctx.gravity * tuning.weight;
    }

    body.rotation = normalize_angle(body.rotation);
    body.pos += body.vel;
    body.sync_rect();
}

/// Bleed off horizontal speed and ease the nose back to upright
fn settle_upright(body: &mut Body, ctx: &SimulationContext) {
    let tuning = &ctx.tuning.player;
    body.vel.x *= tuning.grounded_damping;

    let r = body.rotation;
    body.rotation = if r < PI {
        r - tuning.upright_ease * (r / PI)
    } else {
        r + tuning.upright_ease * (TAU - r) / PI
    };

    let eps = tuning.upright_epsilon;
    if body.rotation < eps || body.rotation > TAU - eps {
        body.rotation = 0.0;
        body.vel.x = 0.0;
    }
}

/// Gravity torque in free flight.
///
/// Level flight (nose at π/2 or 3π/2) is the balance point. Off balance, the
/// nose is pushed back toward level, harder when nose-high than nose-low.
fn apply_pitch_torque(body: &mut Body, ctx: &SimulationContext) {
    let tuning = &ctx.tuning.player;
    let eps = tuning.upright_epsilon;
    let nose_up = ctx.gravity / tuning.nose_up_divisor;
    let nose_down = ctx.gravity / tuning.nose_down_divisor;
    let r = body.rotation;

    // Facing right: nose-high below π/2
    if r > eps && r < PI {
        let lean = (FRAC_PI_2 - r) / FRAC_PI_2;
        let k = if r < FRAC_PI_2 { nose_up } else { nose_down };
        body.rotation = r + k * lean;
    }

    // Facing left: nose-high above 3π/2
    if r > PI && r < TAU - eps {
        let lean = (3.0 * FRAC_PI_2 - r) / FRAC_PI_2;
        let k = if r > 3.0 * FRAC_PI_2 { nose_up } else { nose_down };
        body.rotation = r + k * lean;
    }
}

/// Always-damped body driven by direct velocity assignment
pub fn integrate_tester(body: &mut Body, intent: &TesterIntent, ctx: &SimulationContext) {
    let footprint = match &body.kind {
        BodyKind::Tester(t) => t.footprint,
        _ => return,
    };
    let tuning = &ctx.tuning.tester;

    body.vel *= tuning.damping;

    if intent.up {
        body.vel.y = -tuning.speed;
    }
    if intent.down {
        body.vel.y = tuning.speed;
    }
    if intent.left {
        body.vel.x = -tuning.speed;
    }
    if intent.right {
        body.vel.x = tuning.speed;
    }
    if intent.rotate_left {
        body.rotate(-tuning.rotation_speed());
    }
    if intent.rotate_right {
        body.rotate(tuning.rotation_speed());
    }

    body.morph_shape(&footprint);

    body.pos += body.vel;
    body.sync_rect();
}
