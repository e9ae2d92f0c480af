mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Inbound, ScriptedTransport};
use squad_core::{
    AgentError, AgentLoop, AgentSettings, AgentState, Branch, NoProvider, Point, Roster, Side,
    TransportError,
};

fn settings() -> AgentSettings {
    AgentSettings {
        recv_timeout: Duration::from_millis(20),
        handshake_timeout: Duration::from_millis(150),
        positioning_pause: Duration::from_millis(1),
        ..AgentSettings::default()
    }
}

fn agent(slot: u8, transport: ScriptedTransport) -> AgentLoop<ScriptedTransport> {
    AgentLoop::new(
        slot,
        settings(),
        Arc::new(Roster::default_formation()),
        transport,
        Box::new(NoProvider),
    )
}

#[tokio::test]
async fn handshake_times_out_without_reply() {
    let (transport, sent) = ScriptedTransport::new(&[]);
    let mut agent = agent(3, transport);

    let err = agent.handshake().await.unwrap_err();
    assert!(matches!(err, AgentError::HandshakeTimeout { slot: 3, .. }));
    assert_eq!(agent.state(), AgentState::Terminated);
    assert_eq!(sent.lock().unwrap().as_slice(), ["(init MY_TEAM)"]);
}

#[tokio::test]
async fn handshake_reply_may_span_datagrams() {
    let (transport, _sent) = ScriptedTransport::new(&["(see 0) (in", "it r 7 before_kick_off)"]);
    let mut agent = agent(7, transport);

    let identity = agent.handshake().await.unwrap();
    assert_eq!(identity.side, Side::Right);
    assert_eq!(identity.uniform, 7);
    // Roster homes are left-side; the right side mirrors x.
    assert_eq!(identity.home, Point::new(24.0, 0.0));
    assert_eq!(agent.state(), AgentState::Positioning);
}

#[tokio::test]
async fn bad_uniform_does_not_block_a_later_reply() {
    let (transport, _sent) =
        ScriptedTransport::new(&["(init l 300 before_kick_off)", "(init l 6 before_kick_off)"]);
    let mut agent = agent(6, transport);

    let identity = agent.handshake().await.unwrap();
    assert_eq!(identity.uniform, 6);
    assert_eq!(agent.state(), AgentState::Positioning);
}

#[tokio::test]
async fn uniform_picks_home_over_slot() {
    let (transport, _sent) = ScriptedTransport::new(&["(init l 2 before_kick_off)"]);
    let mut agent = agent(9, transport);

    let identity = agent.handshake().await.unwrap();
    assert_eq!(identity.home, Point::new(-35.0, -20.0));
}

#[tokio::test]
async fn positioning_repeats_move_home() {
    let (transport, sent) = ScriptedTransport::new(&["(init l 7 before_kick_off)"]);
    let mut agent = agent(7, transport);

    agent.handshake().await.unwrap();
    agent.position().await.unwrap();
    assert_eq!(agent.state(), AgentState::Active);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 7);
    assert!(sent[1..].iter().all(|c| c == "(move -24.00 0.00)"));
}

#[tokio::test]
async fn active_tick_runs_decision_and_sends_plan() {
    let (mut transport, sent) = ScriptedTransport::new(&["(init l 7 before_kick_off)"]);
    transport.push(Inbound::Message("(mypos -24 0) (ball -22 0)".into()));
    let mut agent = agent(7, transport);

    agent.handshake().await.unwrap();
    agent.position().await.unwrap();
    let outcome = agent.step().await.unwrap();

    assert_eq!(outcome.branch, Branch::Press);
    assert_eq!(agent.ticks(), 1);
    let sent = sent.lock().unwrap();
    assert_eq!(&sent[sent.len() - 2..], ["(move -22.00 0.00)", "(dash 60.0)"]);
}

#[tokio::test]
async fn quiet_tick_still_decides() {
    let (transport, sent) = ScriptedTransport::new(&["(init l 10 before_kick_off)"]);
    let mut agent = agent(10, transport);

    agent.handshake().await.unwrap();
    agent.position().await.unwrap();
    let before = sent.lock().unwrap().len();

    // No telemetry: estimate stays at home, ball at the centre spot.
    let outcome = agent.step().await.unwrap();
    assert_eq!(outcome.branch, Branch::Press);
    assert!(sent.lock().unwrap().len() > before);
}

#[tokio::test]
async fn failed_sends_do_not_stop_the_agent() {
    let (transport, _sent) = ScriptedTransport::new(&["(init l 4 before_kick_off)"]);
    let mut agent = agent(4, transport.failing_sends());

    agent.handshake().await.unwrap();
    agent.position().await.unwrap();
    agent.step().await.unwrap();
    assert_eq!(agent.state(), AgentState::Active);
    assert_eq!(agent.channel().sent(), 0);
    assert!(agent.channel().failed_sends() >= 7);
}

#[tokio::test]
async fn closed_channel_terminates_only_this_agent() {
    let (mut transport, _sent) = ScriptedTransport::new(&["(init l 5 before_kick_off)"]);
    transport.push(Inbound::Closed);
    let mut agent = agent(5, transport);

    agent.handshake().await.unwrap();
    agent.position().await.unwrap();
    let err = agent.step().await.unwrap_err();
    assert!(matches!(err, AgentError::Transport(TransportError::Closed)));
    assert_eq!(agent.state(), AgentState::Terminated);

    assert!(matches!(
        agent.step().await,
        Err(AgentError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn tick_before_handshake_is_rejected() {
    let (transport, sent) = ScriptedTransport::new(&[]);
    let mut agent = agent(1, transport);

    assert!(matches!(
        agent.step().await,
        Err(AgentError::InvalidState { action: "tick", .. })
    ));
    assert!(sent.lock().unwrap().is_empty());
}
