//! Collision coordination
//!
//! After integration, every colliding body sweeps the hittable roster in
//! order. Solid contacts push the collider just outside the target; trigger
//! contacts (checkpoints, finish line) run the target's lap logic.

use super::body::{Body, BodyKind};
use super::collision::{Sides, check_hit};
use super::race::{LapEvent, ticks_to_duration};
use super::rect::Rect;
use super::state::World;

/// Gap left between a pushed-out collider and the target
const SEPARATION: i32 = 1;

/// How a collider reacts to a solid contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    /// Stop on the struck axis
    Stop,
    /// Reverse on the struck axis
    Bounce,
}

/// Run the collision pass for every colliding body in roster order
pub fn collide_all(world: &mut World) {
    for i in 0..world.bodies.len() {
        if world.bodies[i].kind.collides() {
            collide(world, i);
        }
    }
}

/// Resolve the contacts of the body at roster index `i`
pub fn collide(world: &mut World, i: usize) {
    match world.bodies[i].kind {
        BodyKind::Player(_) => collide_player(world, i),
        BodyKind::Tester(_) => collide_tester(world, i),
        BodyKind::Square => collide_square(world, i),
        _ => {}
    }
}

/// Snapshot of the target needed to respond to a contact
#[derive(Debug, Clone, Copy)]
struct Contact {
    index: usize,
    rect: Rect,
    solid: bool,
    wall: bool,
    sides: Sides,
}

/// Check the collider against roster entry `j`
fn contact(bodies: &[Body], i: usize, j: usize) -> Option<Contact> {
    if i == j || !bodies[j].kind.hittable() {
        return None;
    }
    let target = &bodies[j];
    let (hit, sides) = check_hit(bodies[i].rect(), target.rect(), true, true);
    if !hit {
        return None;
    }
    log::trace!(
        "{} #{} hits {} #{} on {:?}",
        bodies[i].kind.name(),
        bodies[i].id,
        target.kind.name(),
        target.id,
        sides
    );
    Some(Contact {
        index: j,
        rect: target.shape.rect,
        solid: target.solid,
        wall: target.kind.is_wall(),
        sides,
    })
}

/// Drop the highlight on `target` unless another collider still tracks it
fn unflag(bodies: &mut [Body], target: usize) {
    if !bodies.iter().any(|b| b.last_hit == Some(target)) {
        bodies[target].hit = false;
    }
}

/// Clear the highlight the collider set on its previous contact
fn release_hit(bodies: &mut [Body], i: usize) {
    if let Some(prev) = bodies[i].last_hit.take() {
        unflag(bodies, prev);
    }
}

/// Highlight `target` as the collider's single tracked contact
fn track_hit(bodies: &mut [Body], i: usize, target: usize) {
    if let Some(prev) = bodies[i].last_hit.replace(target) {
        if prev != target {
            unflag(bodies, prev);
        }
    }
    bodies[target].hit = true;
}

fn left_of(collider: &Body, target: &Rect) -> f64 {
    (target.x - collider.rect().w - collider.shape.offset.x - SEPARATION) as f64
}

fn right_of(collider: &Body, target: &Rect) -> f64 {
    (target.right() - collider.shape.offset.x + SEPARATION) as f64
}

fn above(collider: &Body, target: &Rect, gap: i32) -> f64 {
    (target.y - collider.rect().h - collider.shape.offset.y - gap) as f64
}

fn below(collider: &Body, target: &Rect) -> f64 {
    (target.bottom() - collider.shape.offset.y + SEPARATION) as f64
}

/// Push the collider out of `target` on every struck side
fn separate(collider: &mut Body, target: &Rect, sides: Sides, response: Response) {
    let react = |v: &mut f64| match response {
        Response::Stop => *v = 0.0,
        Response::Bounce => *v = -*v,
    };

    if sides.left {
        collider.pos.x = left_of(collider, target);
        react(&mut collider.vel.x);
    }
    if sides.right {
        collider.pos.x = right_of(collider, target);
        react(&mut collider.vel.x);
    }
    if sides.top {
        collider.pos.y = above(collider, target, SEPARATION);
        react(&mut collider.vel.y);
    }
    if sides.bottom {
        collider.pos.y = below(collider, target);
        react(&mut collider.vel.y);
    }
    collider.sync_rect();
}

fn set_grounded(collider: &mut Body, grounded: bool) {
    if let BodyKind::Player(p) = &mut collider.kind {
        p.grounded = grounded;
    }
}

fn collide_player(world: &mut World, i: usize) {
    let was_grounded = world.bodies[i].grounded();
    set_grounded(&mut world.bodies[i], false);
    release_hit(&mut world.bodies, i);

    for j in 0..world.bodies.len() {
        let Some(c) = contact(&world.bodies, i, j) else {
            continue;
        };
        track_hit(&mut world.bodies, i, c.index);

        if !c.solid {
            dispatch_trigger(world, c.index);
            continue;
        }

        let player = &mut world.bodies[i];
        let mut sides = c.sides;
        if sides.top && c.wall {
            sides.top = false;
            // Only the first wall landing this tick snaps onto the surface
            if !player.grounded() {
                player.pos.y = above(player, &c.rect, 0);
                set_grounded(player, true);
            } else {
                player.pos.y = above(player, &c.rect, SEPARATION);
                player.vel.y = 0.0;
            }
        }
        separate(player, &c.rect, sides, Response::Stop);
    }

    let grounded = world.bodies[i].grounded();
    if grounded != was_grounded {
        log::debug!("Player {}", if grounded { "landed" } else { "lifted off" });
    }
}

fn collide_tester(world: &mut World, i: usize) {
    release_hit(&mut world.bodies, i);
    for j in 0..world.bodies.len() {
        let Some(c) = contact(&world.bodies, i, j) else {
            continue;
        };
        if !c.solid {
            continue;
        }
        track_hit(&mut world.bodies, i, c.index);
        separate(&mut world.bodies[i], &c.rect, c.sides, Response::Stop);
    }
}

fn collide_square(world: &mut World, i: usize) {
    for j in 0..world.bodies.len() {
        let Some(c) = contact(&world.bodies, i, j) else {
            continue;
        };
        if c.solid {
            separate(&mut world.bodies[i], &c.rect, c.sides, Response::Bounce);
        }
    }
}

/// Run the trigger logic of a non-solid target
fn dispatch_trigger(world: &mut World, target: usize) {
    if matches!(world.bodies[target].kind, BodyKind::Finish(_)) {
        cross_finish(world, target);
        return;
    }
    let body = &mut world.bodies[target];
    if let BodyKind::Checkpoint(cp) = &mut body.kind {
        if !cp.done {
            log::debug!("Checkpoint #{} passed", body.id);
        }
        cp.done = true;
        body.hit = true;
    }
}

fn cross_finish(world: &mut World, finish: usize) {
    let all_done = world.all_checkpoints_done();
    let event = world.race.cross_finish(all_done, world.time_ticks);

    match event {
        LapEvent::Ignored => return,
        LapEvent::Started => log::info!("Race started"),
        LapEvent::Completed { lap, ticks } => log::info!(
            "Lap {lap} completed in {:.2}s",
            ticks_to_duration(ticks).as_secs_f64()
        ),
        LapEvent::Finished { lap, ticks } => log::info!(
            "Final lap {lap} completed in {:.2}s, race finished",
            ticks_to_duration(ticks).as_secs_f64()
        ),
    }

    let finished = world.race.finished;
    if let BodyKind::Finish(state) = &mut world.bodies[finish].kind {
        state.finished = finished;
    }
    world.rearm_checkpoints();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{BodySpec, LevelConfig, SpecKind};
    use crate::sim::race::RacePhase;
    use crate::tuning::Tuning;
    use glam::DVec2;

    fn world(bodies: Vec<BodySpec>) -> World {
        let level = LevelConfig {
            name: "coordinator".into(),
            gravity: 0.02,
            friction: 0.99,
            width: 1000,
            height: 1000,
            max_laps: 2,
            player_spawn: None,
            seed: 0,
            random_squares: None,
            tuning: Tuning::default(),
            bodies,
        };
        World::from_level(&level).unwrap()
    }

    fn player_at(x: i32, y: i32) -> BodySpec {
        BodySpec::new(SpecKind::Player, x, y, 0, 0)
    }

    #[test]
    fn test_player_stops_against_wall_on_the_right() {
        // Player hit rect 30x48 at offset (8, 8)
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Wall, 138, 0, 50, 400),
        ]);
        w.player_mut().vel = DVec2::new(2.0, 0.0);
        w.player_mut().pos.x = 102.0;
        w.player_mut().sync_rect();

        collide_all(&mut w);

        let p = w.player();
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.pos.x, (138 - 30 - 8 - 1) as f64);
        assert!(w.bodies[1].hit);
        assert_eq!(p.last_hit, Some(1));
    }

    #[test]
    fn test_player_lands_on_wall_without_gap() {
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Wall, 0, 156, 500, 50),
        ]);
        // Hit rect bottom is 100 + 8 + 48 = 156, touching the wall top
        w.player_mut().vel = DVec2::new(0.0, 1.5);

        collide_all(&mut w);

        let p = w.player();
        assert!(p.grounded());
        assert_eq!(p.pos.y, (156 - 48 - 8) as f64);
    }

    #[test]
    fn test_non_wall_solid_top_keeps_gap() {
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Square, 90, 150, 60, 60),
        ]);
        w.player_mut().vel = DVec2::new(0.0, 1.0);

        collide_all(&mut w);

        let p = w.player();
        assert!(!p.grounded());
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.pos.y, (150 - 48 - 8 - 1) as f64);
    }

    #[test]
    fn test_player_hits_ceiling() {
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Wall, 0, 60, 500, 50),
        ]);
        // Wall bottom 110 reaches into the hit rect top at 108
        w.player_mut().vel = DVec2::new(0.0, -3.0);

        collide_all(&mut w);

        let p = w.player();
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.pos.y, (110 - 8 + 1) as f64);
        assert!(!p.grounded());
    }

    #[test]
    fn test_square_bounces_on_struck_axis_only() {
        let mut w = world(vec![
            player_at(900, 900),
            BodySpec::new(SpecKind::Square, 100, 100, 20, 20).with_velocity(2.0, 2.0),
            BodySpec::new(SpecKind::Wall, 120, 0, 20, 400),
        ]);

        collide_all(&mut w);

        let square = &w.bodies[1];
        assert_eq!(square.vel, DVec2::new(-2.0, 2.0));
        assert_eq!(square.pos.x, (120 - 20 - 1) as f64);
        // Squares do not highlight what they hit
        assert!(!w.bodies[2].hit);
    }

    #[test]
    fn test_square_ignores_triggers() {
        let mut w = world(vec![
            player_at(900, 900),
            BodySpec::new(SpecKind::Square, 100, 100, 20, 20).with_velocity(2.0, 2.0),
            BodySpec::new(SpecKind::Checkpoint, 110, 0, 10, 400),
            BodySpec::new(SpecKind::Finish, 500, 0, 10, 400),
        ]);
        w.rearm_checkpoints();

        collide_all(&mut w);

        assert_eq!(w.bodies[1].vel, DVec2::new(2.0, 2.0));
        assert!(!w.checkpoint_done(2));
    }

    #[test]
    fn test_trigger_does_not_block() {
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Checkpoint, 120, 0, 10, 400),
            BodySpec::new(SpecKind::Finish, 500, 0, 10, 400),
        ]);
        w.rearm_checkpoints();
        w.player_mut().vel = DVec2::new(2.0, 0.0);

        collide_all(&mut w);

        assert_eq!(w.player().vel, DVec2::new(2.0, 0.0));
        assert!(w.checkpoint_done(1));
        assert!(w.bodies[1].hit);
    }

    #[test]
    fn test_single_tracked_hit() {
        // Player stands on one wall and touches another; only the last
        // contact stays highlighted
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Wall, 0, 156, 130, 50),
            BodySpec::new(SpecKind::Wall, 137, 0, 50, 150),
        ]);

        collide_all(&mut w);

        assert!(w.player().grounded());
        assert_eq!(w.player().pos.x, (137 - 30 - 8 - 1) as f64);
        assert!(!w.bodies[1].hit);
        assert!(w.bodies[2].hit);
        assert_eq!(w.player().last_hit, Some(2));
    }

    #[test]
    fn test_hit_cleared_when_contact_ends() {
        let mut w = world(vec![
            player_at(100, 100),
            BodySpec::new(SpecKind::Wall, 138, 0, 50, 400),
        ]);
        collide_all(&mut w);
        assert!(w.bodies[1].hit);

        w.player_mut().pos.x = 0.0;
        w.player_mut().sync_rect();
        collide_all(&mut w);
        assert!(!w.bodies[1].hit);
        assert_eq!(w.player().last_hit, None);
    }

    #[test]
    fn test_shared_highlight_survives_other_collider_leaving() {
        let mut w = world(vec![
            BodySpec::new(SpecKind::Tester, 500, 100, 0, 0),
            player_at(100, 250),
            BodySpec::new(SpecKind::Wall, 0, 300, 1000, 50),
        ]);
        collide_all(&mut w);
        assert_eq!(w.player().last_hit, Some(2));
        assert!(w.bodies[2].hit);

        // Tester reaches the wall in the same pass the player leaves it
        w.player_mut().pos.y = 100.0;
        w.player_mut().sync_rect();
        w.bodies[0].pos.y = 250.0;
        w.bodies[0].sync_rect();
        collide_all(&mut w);

        assert_eq!(w.bodies[0].last_hit, Some(2));
        assert_eq!(w.player().last_hit, None);
        assert!(w.bodies[2].hit);

        // Once nobody tracks it the highlight goes away
        w.bodies[0].pos.y = 100.0;
        w.bodies[0].sync_rect();
        collide_all(&mut w);
        assert!(!w.bodies[2].hit);
    }

    #[test]
    fn test_full_lap_sequence() {
        let mut w = world(vec![
            player_at(0, 0),
            BodySpec::new(SpecKind::Finish, 200, 0, 10, 100),
            BodySpec::new(SpecKind::Checkpoint, 400, 0, 10, 100),
            BodySpec::new(SpecKind::Checkpoint, 600, 0, 10, 100),
            BodySpec::new(SpecKind::Checkpoint, 800, 0, 10, 100),
        ]);
        let fly_to = |w: &mut World, x: f64| {
            w.player_mut().pos = DVec2::new(x, 0.0);
            w.player_mut().sync_rect();
            w.time_ticks += 100;
            collide_all(w);
        };

        // Starting pass
        fly_to(&mut w, 190.0);
        assert_eq!(w.race.phase(), RacePhase::InProgress { lap: 1 });
        assert!(!w.all_checkpoints_done());

        for lap in 1..=2 {
            // Finish before all checkpoints is a no-op
            fly_to(&mut w, 390.0);
            fly_to(&mut w, 190.0);
            assert_eq!(w.race.current_lap, lap);
            assert!(w.checkpoint_done(2));
            assert_eq!(w.race.lap_ticks.len(), lap as usize - 1);

            fly_to(&mut w, 590.0);
            fly_to(&mut w, 790.0);
            assert!(w.all_checkpoints_done());
            fly_to(&mut w, 190.0);
            assert_eq!(w.race.current_lap, lap + 1);
            assert_eq!(w.race.lap_ticks.len(), lap as usize);
            assert!(w.checkpoint_indices().iter().all(|&c| !w.checkpoint_done(c)));
        }

        assert_eq!(w.race.phase(), RacePhase::Finished);
        assert!(matches!(&w.bodies[1].kind, BodyKind::Finish(f) if f.finished));

        // Terminal: further passes change nothing
        for x in [390.0, 590.0, 790.0, 190.0] {
            fly_to(&mut w, x);
        }
        assert_eq!(w.race.current_lap, 3);
        assert_eq!(w.race.lap_ticks.len(), 2);
    }

    #[test]
    fn test_tester_stops_and_ignores_triggers() {
        let mut w = world(vec![
            player_at(900, 900),
            BodySpec::new(SpecKind::Tester, 100, 100, 0, 0),
            BodySpec::new(SpecKind::Wall, 0, 164, 500, 50),
            BodySpec::new(SpecKind::Checkpoint, 110, 0, 10, 150),
            BodySpec::new(SpecKind::Finish, 500, 0, 10, 150),
        ]);
        w.rearm_checkpoints();
        w.bodies[1].vel = DVec2::new(0.0, 0.8);

        collide_all(&mut w);

        let t = &w.bodies[1];
        // Tester footprint 24x56 at offset (4, 4): bottom 160 < wall top 164, no contact yet
        assert_eq!(t.vel.y, 0.8);

        w.bodies[1].pos.y = 105.0;
        w.bodies[1].sync_rect();
        collide_all(&mut w);
        let t = &w.bodies[1];
        assert_eq!(t.vel.y, 0.0);
        assert_eq!(t.pos.y, (164 - 56 - 4 - 1) as f64);
        assert!(w.bodies[2].hit);
        assert!(!w.checkpoint_done(3));
    }
}
