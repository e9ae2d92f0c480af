use proptest::prelude::*;

use squad_core::tactics::TARGET_INSET;
use squad_core::{target, Point, Role, FIELD};

#[test]
fn forward_pushes_toward_the_ball() {
    let t = target(Role::Forward, Point::new(-10.0, 0.0), Point::new(5.0, 10.0));
    assert!((t.x - 2.0).abs() < 1e-9);
    assert!((t.y - 9.0).abs() < 1e-9);
}

#[test]
fn defender_stays_behind_the_ball() {
    let home = Point::new(-38.0, 7.0);
    let t = target(Role::Defender, home, Point::new(20.0, 0.0));
    assert!((t.x - -8.1).abs() < 1e-9);
    assert!((t.y - 8.5).abs() < 1e-9);
}

#[test]
fn goalkeeper_never_leaves_home() {
    let home = Point::new(-50.0, 0.0);
    for ball in [Point::new(0.0, 0.0), Point::new(-52.0, 33.0), Point::new(45.0, -30.0)] {
        assert_eq!(target(Role::Goalkeeper, home, ball), home);
    }
}

#[test]
fn extreme_ball_is_clamped_inside_the_field() {
    let t = target(Role::Forward, Point::new(-8.0, 20.0), Point::new(80.0, 50.0));
    assert_eq!(t, Point::new(51.5, 33.0));
}

fn outfield_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Defender),
        Just(Role::Midfielder),
        Just(Role::Forward),
    ]
}

proptest! {
    /// Property: outfield targets always land inside the inset field
    #[test]
    fn prop_target_within_inset_field(
        role in outfield_role(),
        hx in -52.5f64..52.5, hy in -34.0f64..34.0,
        bx in -80.0f64..80.0, by in -60.0f64..60.0,
    ) {
        let t = target(role, Point::new(hx, hy), Point::new(bx, by));
        prop_assert!(FIELD.contains_inset(t, TARGET_INSET));
    }

    /// Property: targeting is a pure function
    #[test]
    fn prop_target_deterministic(
        role in outfield_role(),
        bx in -52.5f64..52.5, by in -34.0f64..34.0,
    ) {
        let home = Point::new(-22.0, 12.0);
        let ball = Point::new(bx, by);
        prop_assert_eq!(target(role, home, ball), target(role, home, ball));
    }
}

#[test]
fn ball_on_home_stays_in_field_for_every_role() {
    let home = Point::new(-50.0, 33.5);
    for role in [Role::Goalkeeper, Role::Defender, Role::Midfielder, Role::Forward] {
        let t = target(role, home, home);
        if role == Role::Goalkeeper {
            assert_eq!(t, home);
        } else {
            assert!(FIELD.contains_inset(t, TARGET_INSET));
        }
    }
}
