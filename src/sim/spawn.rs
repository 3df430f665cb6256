//! Seeded placement of drifting squares

use glam::DVec2;
use rand::Rng;

use super::body::{Body, BodyKind};
use super::rect::Rect;
use crate::level::SquareSwarm;

/// Placement attempts per square before giving up on it
const MAX_PLACEMENT_ATTEMPTS: u32 = 200;

/// Speed of a freshly spawned square along each axis
const SQUARE_SPEED: f64 = 2.0;

/// Scatter `swarm.count` squares over the level, keeping a `size` margin from
/// the level edges and never overlapping a solid body (including squares
/// placed earlier). Each square drifts diagonally at a random heading.
///
/// Returned squares carry id 0; the caller assigns ids.
pub fn scatter_squares<R: Rng>(
    existing: &[Body],
    swarm: SquareSwarm,
    width: i32,
    height: i32,
    rng: &mut R,
) -> Vec<Body> {
    let size = swarm.size;
    let mut placed: Vec<Body> = Vec::new();

    if width <= size * 3 || height <= size * 3 {
        log::warn!("Level {width}x{height} too small for squares of size {size}");
        return placed;
    }

    for n in 0..swarm.count {
        let spot = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
            let x = rng.random_range(size..width - size * 2);
            let y = rng.random_range(size..height - size * 2);
            let candidate = Rect::new(x, y, size, size);
            let blocked = existing
                .iter()
                .chain(placed.iter())
                .any(|b| b.solid && b.rect().overlaps(&candidate));
            (!blocked).then_some((x, y))
        });

        let Some((x, y)) = spot else {
            log::warn!("No free spot for square {n} after {MAX_PLACEMENT_ATTEMPTS} attempts");
            continue;
        };

        let vx = if rng.random_bool(0.5) { SQUARE_SPEED } else { -SQUARE_SPEED };
        let vy = if rng.random_bool(0.5) { SQUARE_SPEED } else { -SQUARE_SPEED };
        let square = Body::new(0, BodyKind::Square, x, y, 0, 0, size, size, true)
            .with_velocity(DVec2::new(vx, vy))
            .with_color([255, 0, 255, 128]);
        placed.push(square);
    }

    log::debug!("Spawned {} of {} squares", placed.len(), swarm.count);
    placed
}
