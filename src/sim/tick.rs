//! Fixed timestep simulation tick
//!
//! One tick integrates every moving body in roster order, then runs one
//! collision pass per colliding body in roster order. Input is sampled once
//! before the tick and never changes during it.

use serde::{Deserialize, Serialize};

use super::coordinator::collide_all;
use super::motion::{PlayerIntent, TesterIntent, integrate};
use super::state::World;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    pub player: PlayerIntent,
    pub tester: TesterIntent,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    world.time_ticks += 1;

    // Grounded state comes from the previous tick's collision pass
    let player = input.player.masked(world.player().grounded());

    let ctx = &world.ctx;
    for body in world.bodies.iter_mut().filter(|b| b.kind.integrates()) {
        integrate(body, &player, &input.tester, ctx);
    }

    collide_all(world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{BodySpec, LevelConfig, SpecKind};
    use crate::sim::race::RacePhase;
    use crate::tuning::Tuning;
    use glam::DVec2;

    fn level() -> LevelConfig {
        LevelConfig {
            name: "tick".into(),
            gravity: 0.05,
            friction: 0.99,
            width: 1200,
            height: 800,
            max_laps: 1,
            player_spawn: None,
            seed: 11,
            random_squares: None,
            tuning: Tuning::default(),
            bodies: vec![
                BodySpec::new(SpecKind::Player, 100, 600, 0, 0),
                BodySpec::new(SpecKind::Wall, 0, 700, 1200, 100),
                BodySpec::new(SpecKind::Checkpoint, 600, 0, 10, 700),
                BodySpec::new(SpecKind::Finish, 300, 0, 10, 700),
            ],
        }
    }

    #[test]
    fn test_player_falls_and_lands() {
        let mut world = World::from_level(&level()).unwrap();
        let idle = TickInput::default();

        for _ in 0..200 {
            tick(&mut world, &idle);
        }

        let p = world.player();
        assert!(p.grounded());
        // Resting on the wall: hit rect bottom on the wall top
        assert_eq!(p.rect().bottom(), 700);
        assert!(world.hud().grounded);
    }

    #[test]
    fn test_grounded_masks_rotation() {
        let mut world = World::from_level(&level()).unwrap();
        let idle = TickInput::default();
        while !world.player().grounded() {
            tick(&mut world, &idle);
        }

        let rotate = TickInput {
            player: PlayerIntent {
                rotate_right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut world, &rotate);
        assert_eq!(world.player().rotation, 0.0);
    }

    #[test]
    fn test_thrust_lifts_off() {
        let mut world = World::from_level(&level()).unwrap();
        let idle = TickInput::default();
        while !world.player().grounded() {
            tick(&mut world, &idle);
        }
        let resting_y = world.player().pos.y;

        let thrust = TickInput {
            player: PlayerIntent {
                thrust: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut world, &thrust);
        }
        assert!(world.player().pos.y < resting_y - 50.0);
        assert!(!world.player().grounded());
    }

    #[test]
    fn test_rotation_wraps_through_zero() {
        let mut world = World::from_level(&level()).unwrap();
        world.ctx.gravity = 0.0;
        let spin = TickInput {
            player: PlayerIntent {
                rotate_right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut wrapped = false;
        let mut last = world.player().rotation;
        for _ in 0..1000 {
            tick(&mut world, &spin);
            let r = world.player().rotation;
            assert!((0.0..std::f64::consts::TAU).contains(&r));
            if r < last {
                wrapped = true;
            }
            last = r;
        }
        assert!(wrapped);
    }

    #[test]
    fn test_reset_returns_player_to_spawn() {
        let mut world = World::from_level(&level()).unwrap();
        world.player_mut().pos = DVec2::new(900.0, 100.0);
        world.player_mut().vel = DVec2::new(4.0, 4.0);
        let reset = TickInput {
            player: PlayerIntent {
                reset: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut world, &reset);
        let p = world.player();
        assert!((p.pos.x - 100.0).abs() < 1e-9);
        assert!((p.pos.y - 600.0).abs() < 0.1);
    }

    #[test]
    fn test_squares_bounce_inside_a_box() {
        let mut lvl = level();
        lvl.bodies = vec![
            BodySpec::new(SpecKind::Player, 1000, 100, 0, 0),
            BodySpec::new(SpecKind::Wall, 0, 0, 400, 20),
            BodySpec::new(SpecKind::Wall, 0, 380, 400, 20),
            BodySpec::new(SpecKind::Wall, 0, 0, 20, 400),
            BodySpec::new(SpecKind::Wall, 380, 0, 20, 400),
            BodySpec::new(SpecKind::Square, 100, 150, 40, 40).with_velocity(2.0, 2.0),
        ];
        let mut world = World::from_level(&lvl).unwrap();
        let idle = TickInput::default();
        let bounds = crate::sim::Rect::new(20, 20, 360, 360);

        for _ in 0..2000 {
            tick(&mut world, &idle);
            let sq = &world.bodies[5];
            assert!(sq.rect().overlaps(&bounds));
            assert_eq!(sq.vel.x.abs(), 2.0);
            assert_eq!(sq.vel.y.abs(), 2.0);
        }
    }

    #[test]
    fn test_lap_by_flying_the_course() {
        let mut world = World::from_level(&level()).unwrap();
        world.ctx.gravity = 0.0;
        let idle = TickInput::default();

        // Cross the finish to start, then the checkpoint, then the finish again
        for x in [290.0, 590.0, 290.0] {
            world.player_mut().pos = DVec2::new(x, 300.0);
            world.player_mut().vel = DVec2::ZERO;
            for _ in 0..30 {
                tick(&mut world, &idle);
            }
        }

        assert_eq!(world.race.phase(), RacePhase::Finished);
        assert_eq!(world.race.lap_ticks, vec![60]);
        let hud = world.hud();
        assert_eq!(hud.lap_times.len(), 1);
        assert_eq!(hud.current_lap, 1);
    }

    #[test]
    fn test_partial_input_json() {
        let input: TickInput = serde_json::from_str(r#"{"player": {"thrust": true}}"#).unwrap();
        assert!(input.player.thrust);
        assert!(!input.player.retro);
        assert_eq!(input.tester, TesterIntent::default());
    }

    #[test]
    fn test_determinism() {
        let mut lvl = level();
        lvl.random_squares = Some(crate::level::SquareSwarm { count: 6, size: 30 });
        let mut a = World::from_level(&lvl).unwrap();
        let mut b = World::from_level(&lvl).unwrap();

        let inputs = [
            TickInput::default(),
            TickInput {
                player: PlayerIntent {
                    thrust: true,
                    rotate_left: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            TickInput {
                player: PlayerIntent {
                    strafe_right: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];

        for n in 0..600 {
            let input = &inputs[n % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }

        for (x, y) in a.bodies.iter().zip(&b.bodies) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
            assert_eq!(x.rotation, y.rotation);
        }
    }
}
