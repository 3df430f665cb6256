//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster order)
//! - No rendering, input or filesystem dependencies

pub mod body;
pub mod collision;
pub mod coordinator;
pub mod motion;
pub mod race;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use body::{Body, BodyKind, CheckpointState, FinishState, HitShape, PlayerState, TesterState};
pub use collision::{Sides, check_hit, resolve_hv, resolve_sides};
pub use coordinator::{collide, collide_all};
pub use motion::{PlayerIntent, TesterIntent, integrate};
pub use race::{LapEvent, RacePhase, RaceState};
pub use rect::Rect;
pub use spawn::scatter_squares;
pub use state::{Hud, RenderView, SimulationContext, World};
pub use tick::{TickInput, tick};
