mod common;

use std::time::{Duration, Instant};

use proptest::prelude::*;
use tokio_test::block_on;

use common::FixedProvider;
use squad_core::{
    ActionCode, AgentIdentity, Branch, DecisionArbiter, DecisionProvider, Edge, NoProvider,
    Override, Point, Side, Strategy, TickOutcome,
};

fn arbiter(
    uniform: u8,
    home: Point,
    strategy: Strategy,
    provider: Box<dyn DecisionProvider>,
) -> DecisionArbiter {
    let identity = AgentIdentity::new(uniform, Side::Left, home);
    DecisionArbiter::new(identity, strategy, provider, Instant::now())
}

fn wire(outcome: &TickOutcome) -> Vec<String> {
    outcome.plan.commands().map(|c| c.to_string()).collect()
}

fn tick(arbiter: &mut DecisionArbiter, message: &str) -> TickOutcome {
    block_on(arbiter.tick(message, Instant::now()))
}

#[test]
fn forward_presses_a_nearby_ball() {
    let mut a = arbiter(10, Point::new(-10.0, 0.0), Strategy::Hybrid, Box::new(NoProvider));
    let out = tick(&mut a, "(mypos 2 9) (ball 5 10)");
    assert_eq!(out.branch, Branch::Press);
    assert_eq!(wire(&out), ["(move 5.00 10.00)", "(dash 60.0)"]);
    assert_eq!(out.plan.duration(), Duration::from_millis(120));
}

#[test]
fn far_from_target_moves_with_scaled_power() {
    let mut a = arbiter(10, Point::new(-10.0, 0.0), Strategy::Hybrid, Box::new(NoProvider));
    let out = tick(&mut a, "(mypos -10 0) (ball 5 10)");
    assert_eq!(out.branch, Branch::MoveToTarget);
    assert_eq!(wire(&out), ["(move 2.00 9.00)", "(dash 55.0)"]);
}

#[test]
fn near_target_fine_adjusts_toward_it() {
    let mut a = arbiter(4, Point::new(-38.0, 7.0), Strategy::Hybrid, Box::new(NoProvider));
    let out = tick(&mut a, "(mypos -8.1 7.5) (ball 20 0)");
    assert_eq!(out.branch, Branch::FineAdjust);
    assert_eq!(wire(&out), ["(turn 90.0)", "(dash 20.0)"]);

    let out = tick(&mut a, "(mypos -8.1 8.5) (ball 20 0)");
    assert_eq!(out.branch, Branch::FineAdjust);
    assert_eq!(wire(&out), ["(turn 0.0)", "(dash 20.0)"]);
}

#[test]
fn hybrid_consults_provider_inside_the_gate() {
    let (provider, calls) = FixedProvider::answering(ActionCode::Sprint);
    let mut a = arbiter(7, Point::new(-24.0, 0.0), Strategy::Hybrid, Box::new(provider));

    let out = tick(&mut a, "(mypos -20 0) (ball -5 0)");
    assert_eq!(out.branch, Branch::Provider(ActionCode::Sprint));
    assert_eq!(wire(&out), ["(dash 75.0)"]);
    assert_eq!(out.plan.duration(), Duration::from_millis(90));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn hybrid_skips_provider_outside_the_gate() {
    let (provider, calls) = FixedProvider::answering(ActionCode::Sprint);
    let mut a = arbiter(3, Point::new(-38.0, -7.0), Strategy::Hybrid, Box::new(provider));

    let out = tick(&mut a, "(mypos -38 -7) (ball 0 0)");
    assert!(!a.gate_applies());
    assert_eq!(out.branch, Branch::MoveToTarget);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn invalid_action_falls_back_to_heuristic() {
    let (provider, calls) = FixedProvider::invalid(9);
    let mut a = arbiter(7, Point::new(-24.0, 0.0), Strategy::Hybrid, Box::new(provider));

    let out = tick(&mut a, "(mypos -20 0) (ball -15 0)");
    assert_eq!(out.branch, Branch::ProviderFallback);
    assert_eq!(wire(&out), ["(move -15.00 0.00)", "(dash 60.0)"]);

    let out = tick(&mut a, "(mypos -20 0) (ball -5 0)");
    assert_eq!(out.branch, Branch::ProviderFallback);
    assert_eq!(wire(&out), ["(move -24.00 0.00)"]);
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[test]
fn policy_strategy_without_provider_uses_fallback() {
    let mut a = arbiter(9, Point::new(-8.0, -20.0), Strategy::Policy, Box::new(NoProvider));
    let out = tick(&mut a, "(mypos -8 -20) (ball 30 10)");
    assert_eq!(out.branch, Branch::ProviderFallback);
    assert_eq!(wire(&out), ["(move -8.00 -20.00)"]);
}

#[test]
fn policy_strategy_asks_every_tick() {
    let (provider, calls) = FixedProvider::answering(ActionCode::ReturnHome);
    let mut a = arbiter(9, Point::new(-8.0, -20.0), Strategy::Policy, Box::new(provider));

    for _ in 0..3 {
        let out = tick(&mut a, "(mypos -8 -20) (ball 30 10)");
        assert_eq!(out.branch, Branch::Provider(ActionCode::ReturnHome));
        assert_eq!(wire(&out), ["(move -8.00 -20.00)", "(dash 55.0)"]);
    }
    assert_eq!(*calls.lock().unwrap(), 3);
}

#[test]
fn safety_preempts_every_strategy() {
    for strategy in [Strategy::Wander, Strategy::Hybrid, Strategy::Policy] {
        let (provider, calls) = FixedProvider::answering(ActionCode::Sprint);
        let mut a = arbiter(3, Point::new(-10.0, 0.0), strategy, Box::new(provider));

        let out = tick(&mut a, "(mypos -51 0) (ball -50 0)");
        assert_eq!(out.branch, Branch::Safety(Override::Boundary(Edge::XMin)));
        assert_eq!(out.plan.duration(), strategy.boundary_pause());
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}

#[test]
fn return_home_preempts_provider_and_resets_estimate() {
    for strategy in [Strategy::Wander, Strategy::Hybrid, Strategy::Policy] {
        let home = Point::new(-40.0, 0.0);
        let (provider, calls) = FixedProvider::answering(ActionCode::ChaseBall);
        let mut a = arbiter(1, home, strategy, Box::new(provider));

        // Keeper 20 from home with the ball at its feet: the gate would open.
        let out = tick(&mut a, "(mypos -40 20) (ball -40 20)");
        assert_eq!(out.branch, Branch::Safety(Override::ReturnHome));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(a.estimate().own, home);
        assert_eq!(
            wire(&out),
            ["(move -40.00 0.00)", "(dash 40.0)"].repeat(3)
        );
    }
}

#[test]
fn wander_is_reproducible_with_a_seed() {
    let make = || {
        arbiter(6, Point::new(-22.0, -12.0), Strategy::Wander, Box::new(NoProvider)).with_seed(42)
    };
    let (mut a, mut b) = (make(), make());
    for _ in 0..5 {
        let x = tick(&mut a, "(mypos -20 -10)");
        let y = tick(&mut b, "(mypos -20 -10)");
        assert_eq!(x.branch, Branch::Wander);
        assert_eq!(x, y);
    }
}

#[test]
fn wander_never_consults_the_provider() {
    let (provider, calls) = FixedProvider::answering(ActionCode::ChaseBall);
    let mut a = arbiter(10, Point::new(-6.0, 0.0), Strategy::Wander, Box::new(provider));

    // Ball right at the agent: would open the gate under hybrid.
    let out = tick(&mut a, "(mypos -6 0) (ball -5 0)");
    assert_eq!(out.branch, Branch::Wander);
    assert_eq!(*calls.lock().unwrap(), 0);
}

proptest! {
    /// Property: with safety quiet, a hybrid tick lands on exactly one
    /// non-empty branch, and the provider is asked only when the gate is open
    #[test]
    fn prop_hybrid_branches_are_exclusive(
        uniform in 1u8..=11,
        ox in -10.0f64..10.0, oy in -10.0f64..10.0,
        bx in -45.0f64..45.0, by in -28.0f64..28.0,
    ) {
        let home = Point::new(-20.0, 0.0);
        let (provider, calls) = FixedProvider::answering(ActionCode::TurnLeft);
        let mut a = arbiter(uniform, home, Strategy::Hybrid, Box::new(provider));

        let message = format!("(mypos {} {}) (ball {bx} {by})", home.x + ox, home.y + oy);
        let gate = {
            a.estimate_mut().update(&message, Instant::now());
            a.gate_applies()
        };
        let out = tick(&mut a, &message);

        prop_assert!(!out.plan.is_empty());
        match out.branch {
            Branch::Provider(_) => prop_assert!(gate),
            Branch::Press | Branch::MoveToTarget | Branch::FineAdjust => prop_assert!(!gate),
            other => prop_assert!(false, "unexpected branch {:?}", other),
        }
        prop_assert_eq!(*calls.lock().unwrap(), usize::from(gate));
    }
}
