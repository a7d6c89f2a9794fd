//! Turn loop tests using scripted participants.

mod common;

use common::{Event, ScriptedParticipant};
use std::time::Duration;
use strictly_lobby::{
    Outcome, ParticipantHandle, Player, Session, SessionErrorKind, SessionPhase, Symbol,
    host_session,
};

fn handle(participant: &std::sync::Arc<ScriptedParticipant>) -> ParticipantHandle {
    participant.clone()
}

async fn run_with_timeout(
    session: &mut Session,
) -> Result<Outcome, strictly_lobby::SessionError> {
    tokio::time::timeout(Duration::from_secs(5), session.run())
        .await
        .expect("session did not finish")
}

#[tokio::test]
async fn test_column_win_is_announced_to_both() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "0 1", "0 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    let outcome = run_with_timeout(&mut session).await.unwrap();

    assert_eq!(outcome, Outcome::Winner(Symbol::Cross));
    assert_eq!(
        session.phase(),
        SessionPhase::Finished(Outcome::Winner(Symbol::Cross))
    );
    assert_eq!(session.winner().map(Player::symbol), Some(Symbol::Cross));
    for y in 0..3 {
        assert_eq!(session.board().symbol_at(0, y), Symbol::Cross);
    }
    assert_eq!(session.board().symbol_at(1, 0), Symbol::Circle);
    assert_eq!(session.board().symbol_at(1, 2), Symbol::Empty);

    for participant in [&cross, &circle] {
        let notes = participant.notifications();
        assert_eq!(
            notes.last().map(String::as_str),
            Some("Player X won. Thanks for the game!")
        );
    }
    assert_eq!(cross.notifications()[0], "You play for X");
    assert_eq!(circle.notifications()[0], "You play for O");
}

#[tokio::test]
async fn test_cross_moves_first_and_turns_alternate() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "0 1", "0 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    run_with_timeout(&mut session).await.unwrap();

    assert_eq!(cross.move_requests(), 3);
    assert_eq!(circle.move_requests(), 2);

    let thinking = circle
        .notifications()
        .iter()
        .filter(|n| *n == "Player X is thinking")
        .count();
    assert_eq!(thinking, 3);
    let thinking = cross
        .notifications()
        .iter()
        .filter(|n| *n == "Player O is thinking")
        .count();
    assert_eq!(thinking, 2);

    // First thing Circle hears after setup is that Cross is thinking.
    let first_turn = circle
        .events()
        .into_iter()
        .find(|e| matches!(e, Event::Notified(n) if n.ends_with("is thinking")));
    assert_eq!(
        first_turn,
        Some(Event::Notified("Player X is thinking".to_string()))
    );
}

#[tokio::test]
async fn test_cross_moves_first_regardless_of_session_order() {
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1"]);
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "0 1", "0 2"]);
    let mut session = Session::new(vec![
        Player::new(handle(&circle), Symbol::Circle),
        Player::new(handle(&cross), Symbol::Cross),
    ]);

    let outcome = run_with_timeout(&mut session).await.unwrap();
    assert_eq!(outcome, Outcome::Winner(Symbol::Cross));
    assert_eq!(session.board().symbol_at(0, 0), Symbol::Cross);
}

#[tokio::test]
async fn test_draw_when_board_fills() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "2 0", "0 1", "1 2", "2 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1", "2 1", "0 2"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    let outcome = run_with_timeout(&mut session).await.unwrap();

    assert_eq!(outcome, Outcome::Draw);
    assert_eq!(session.phase(), SessionPhase::Finished(Outcome::Draw));
    assert!(session.winner().is_none());
    assert!(session.board().is_full());
    for participant in [&cross, &circle] {
        assert_eq!(
            participant.notifications().last().map(String::as_str),
            Some("Draw!")
        );
    }
}

#[tokio::test]
async fn test_every_move_pushes_board_to_both_before_announcement() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "0 1", "0 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    run_with_timeout(&mut session).await.unwrap();

    for participant in [&cross, &circle] {
        let events = participant.events();
        let updates: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::BoardUpdate(_)))
            .collect();
        assert_eq!(updates.len(), 5);
        assert_eq!(*updates[4], Event::BoardUpdate(session.board().clone()));

        let last_update = events
            .iter()
            .rposition(|e| matches!(e, Event::BoardUpdate(_)))
            .unwrap();
        let announcement = events
            .iter()
            .position(|e| matches!(e, Event::Notified(n) if n.contains("won")))
            .unwrap();
        assert!(last_update < announcement);

        assert!(matches!(events[1], Event::Snapshot(ref b) if *b == strictly_lobby::Board::new()));
    }
}

#[tokio::test]
async fn test_malformed_input_is_corrected_until_valid() {
    let cross = ScriptedParticipant::with_moves("cross", &["abc", "5 5", "0 0"]);
    // Circle's script is empty, so the session aborts on its turn.
    let circle = ScriptedParticipant::with_moves("circle", &[]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    let err = run_with_timeout(&mut session).await.unwrap_err();
    assert!(matches!(err.kind, SessionErrorKind::Transport(_)));

    assert_eq!(cross.move_requests(), 3);
    let notes = cross.notifications();
    let after_greeting: Vec<&str> = notes.iter().skip(1).map(String::as_str).collect();
    assert_eq!(
        after_greeting[..3],
        [
            "Enter your move as two numbers: <x> <y>",
            "Out of bounds",
            "Your move has been accepted",
        ]
    );
    assert_eq!(session.board().symbol_at(0, 0), Symbol::Cross);
}

#[tokio::test]
async fn test_turn_starts_once_despite_reprompts() {
    let cross = ScriptedParticipant::with_moves("cross", &["abc", "9 9", "0 0", "0 1", "0 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "1 1"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    run_with_timeout(&mut session).await.unwrap();

    let turns = |p: &ScriptedParticipant| {
        p.events()
            .iter()
            .filter(|e| **e == Event::TurnStarted)
            .count()
    };
    assert_eq!(turns(&cross), 3);
    assert_eq!(turns(&circle), 2);
    assert_eq!(cross.move_requests(), 5);

    // Every move request of a turn comes after that turn started.
    let events = cross.events();
    let first_turn = events.iter().position(|e| *e == Event::TurnStarted).unwrap();
    let first_request = events.iter().position(|e| *e == Event::MoveRequested).unwrap();
    assert!(first_turn < first_request);
}

#[tokio::test]
async fn test_non_numeric_and_empty_input_are_corrected() {
    let cross = ScriptedParticipant::with_moves("cross", &["abc 1", "", "-1 0", "2 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &[]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    run_with_timeout(&mut session).await.unwrap_err();

    let notes = cross.notifications();
    let after_greeting: Vec<&str> = notes.iter().skip(1).map(String::as_str).collect();
    assert_eq!(
        after_greeting[..4],
        [
            "Not a valid coordinate: abc",
            "Enter your move as two numbers: <x> <y>",
            "Not a valid coordinate: -1",
            "Your move has been accepted",
        ]
    );
    assert_eq!(session.board().symbol_at(2, 2), Symbol::Cross);
}

#[tokio::test]
async fn test_occupied_cell_is_rejected() {
    let cross = ScriptedParticipant::with_moves("cross", &["1 1"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 1", "2 2"]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    // Cross runs out of moves on its second turn.
    run_with_timeout(&mut session).await.unwrap_err();

    assert!(
        circle
            .notifications()
            .contains(&"Cell 1 1 is already taken".to_string())
    );
    assert_eq!(session.board().symbol_at(1, 1), Symbol::Cross);
    assert_eq!(session.board().symbol_at(2, 2), Symbol::Circle);
}

#[tokio::test]
async fn test_waiting_player_disconnect_aborts_turn() {
    let (cross, _script) = ScriptedParticipant::new("cross");
    let circle = ScriptedParticipant::with_moves("circle", &[]);
    let mut session = Session::pair(handle(&cross), handle(&circle));

    let (result, ()) = tokio::join!(run_with_timeout(&mut session), async {
        cross.wait_for_move_request().await;
        circle.disconnect();
    });

    let err = result.unwrap_err();
    assert!(matches!(
        err.kind,
        SessionErrorKind::OpponentDisconnected(Symbol::Circle)
    ));
    assert_eq!(session.phase(), SessionPhase::Finished(Outcome::Aborted));
    assert!(session.winner().is_none());
    assert!(!cross.notifications().iter().any(|n| n.contains("won")));
}

#[tokio::test]
async fn test_failed_snapshot_aborts_session() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 1"]);
    circle.fail_deliveries();
    let mut session = Session::pair(handle(&cross), handle(&circle));

    let err = run_with_timeout(&mut session).await.unwrap_err();

    assert!(matches!(err.kind, SessionErrorKind::Transport(_)));
    assert_eq!(session.phase(), SessionPhase::Finished(Outcome::Aborted));
    assert_eq!(cross.move_requests(), 0);
}

#[tokio::test]
async fn test_wrong_player_count_does_not_start() {
    let lonely = ScriptedParticipant::with_moves("lonely", &["0 0"]);
    let mut session = Session::new(vec![Player::new(handle(&lonely), Symbol::Cross)]);

    let err = session.run().await.unwrap_err();

    assert!(matches!(err.kind, SessionErrorKind::WrongPlayerCount(1)));
    assert_eq!(session.phase(), SessionPhase::AwaitingStart);
    assert!(lonely.events().is_empty());
}

#[tokio::test]
async fn test_host_session_releases_players_after_win() {
    let cross = ScriptedParticipant::with_moves("cross", &["0 0", "1 1", "2 2"]);
    let circle = ScriptedParticipant::with_moves("circle", &["1 0", "2 0"]);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        host_session(handle(&cross), handle(&circle)),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome, Outcome::Winner(Symbol::Cross));
    for participant in [&cross, &circle] {
        let events = participant.events();
        assert_eq!(events.last(), Some(&Event::SessionEnded));
        assert_eq!(
            events[events.len() - 2],
            Event::Notified("Player X won. Thanks for the game!".to_string())
        );
    }
}

#[tokio::test]
async fn test_host_session_releases_players_after_abort() {
    let cross = ScriptedParticipant::with_moves("cross", &[]);
    let circle = ScriptedParticipant::with_moves("circle", &[]);

    let result = host_session(handle(&cross), handle(&circle)).await;

    assert!(result.is_err());
    assert_eq!(cross.events().last(), Some(&Event::SessionEnded));
    assert_eq!(circle.events().last(), Some(&Event::SessionEnded));
}
