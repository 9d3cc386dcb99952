//! Scenario tests for the game session controller.

use std::sync::Arc;
use tictactoe_core::{
    Board, GameController, GameInit, GameStore, MemoryStore, Outcome, Player, Square, Winner,
};

async fn started() -> (Arc<MemoryStore>, GameController<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut controller = GameController::new(store.clone());
    controller.start_new_session().await.expect("Start failed");
    (store, controller)
}

async fn play(controller: &mut GameController<MemoryStore>, moves: &[usize]) {
    for &pos in moves {
        let applied = controller.apply_move(pos).await.expect("Persist failed");
        assert!(applied.is_some(), "Move {} should be accepted", pos);
    }
}

#[tokio::test]
async fn test_top_row_win() {
    let (store, mut controller) = started().await;
    play(&mut controller, &[0, 4, 1, 5, 2]).await;

    assert_eq!(
        controller.outcome(),
        &Outcome::Win {
            player: Player::X,
            line: [0, 1, 2]
        }
    );
    assert!(controller.is_terminal());
    assert_eq!(controller.status_text(), "X Wins!");

    let stored = store.fetch_latest().await.unwrap().unwrap();
    assert_eq!(stored.winner, Some(Winner::X));
    assert_eq!(stored.winning_squares, vec![0, 1, 2]);
    assert_eq!(&stored.board, controller.board());
}

#[tokio::test]
async fn test_full_board_draw() {
    let (store, mut controller) = started().await;
    // X O X / O O X / X X O
    play(&mut controller, &[0, 1, 2, 3, 5, 4, 6, 8, 7]).await;

    assert_eq!(controller.outcome(), &Outcome::Draw);
    assert_eq!(controller.status_text(), "It's a Draw!");

    let stored = store.fetch_latest().await.unwrap().unwrap();
    assert_eq!(stored.winner, Some(Winner::Draw));
    assert!(stored.winning_squares.is_empty());
}

#[tokio::test]
async fn test_repeated_move_changes_state_once() {
    let (store, mut controller) = started().await;
    play(&mut controller, &[3]).await;
    let after_first = controller.session().clone();

    let second = controller.apply_move(3).await.unwrap();
    assert!(second.is_none());
    assert_eq!(controller.session(), &after_first);
    assert_eq!(store.update_count(), 1);
}

#[tokio::test]
async fn test_occupied_square_issues_no_persist_call() {
    let (store, mut controller) = started().await;
    play(&mut controller, &[0, 5]).await;
    assert_eq!(controller.board().get(5), Some(Square::Occupied(Player::O)));
    let writes = store.write_count();
    let before = controller.session().clone();

    assert_eq!(controller.apply_move(5).await.unwrap(), None);
    assert_eq!(controller.session(), &before);
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_out_of_range_move_is_rejected() {
    let (store, mut controller) = started().await;
    assert_eq!(controller.apply_move(9).await.unwrap(), None);
    assert!(!controller.has_started());
    assert_eq!(store.update_count(), 0);
}

#[tokio::test]
async fn test_turn_alternates_with_move_count() {
    let (_store, mut controller) = started().await;
    let moves = [4, 0, 8, 2, 1, 7, 3, 5];
    assert_eq!(controller.turn(), Player::X);
    for (n, &pos) in moves.iter().enumerate() {
        controller.apply_move(pos).await.unwrap();
        let accepted = n + 1;
        let expected = if accepted % 2 == 0 {
            Player::X
        } else {
            Player::O
        };
        assert_eq!(controller.turn(), expected, "after {} moves", accepted);
        assert_eq!(controller.session().turns_taken(), accepted);
    }
}

#[tokio::test]
async fn test_no_moves_after_terminal() {
    let (store, mut controller) = started().await;
    play(&mut controller, &[0, 4, 1, 5, 2]).await;
    let finished = controller.session().clone();
    let writes = store.write_count();

    for pos in [3, 6, 7, 8] {
        assert_eq!(controller.apply_move(pos).await.unwrap(), None);
    }
    assert_eq!(controller.session(), &finished);
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_restart_replaces_record_with_new_id() {
    let (store, mut controller) = started().await;
    play(&mut controller, &[0, 4]).await;
    let old_id = controller.game_id().unwrap();

    let fresh = controller.on_restart_clicked().await.unwrap();

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_ne!(records[0].id, old_id);
    assert_eq!(fresh.id(), Some(records[0].id));
    assert_eq!(fresh.board(), &Board::new());
    assert_eq!(fresh.turn(), Player::X);
}

#[tokio::test]
async fn test_mount_resumes_existing_game() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut first = GameController::new(store.clone());
        first.on_mount().await.unwrap();
        first.on_cell_clicked(0).await.unwrap();
        first.on_cell_clicked(4).await.unwrap();
    }

    let mut second = GameController::new(store.clone());
    let resumed = second.on_mount().await.unwrap();
    assert_eq!(resumed.turns_taken(), 2);
    assert_eq!(resumed.turn(), Player::X);
    assert_eq!(resumed.status_text(), "Next turn: X");
    assert_eq!(store.records().await.len(), 1);
}

#[tokio::test]
async fn test_mount_creates_game_when_store_empty() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = GameController::new(store.clone());

    let session = controller.on_mount().await.unwrap();
    assert!(session.id().is_some());
    assert_eq!(session.status_text(), "Game Started!");
    assert_eq!(store.records().await.len(), 1);
}

#[tokio::test]
async fn test_mount_resumes_finished_game_as_terminal() {
    let store = Arc::new(MemoryStore::new());
    let record = store.replace_all_with(GameInit::initial()).await.unwrap();
    let mut fields = record.fields();
    for pos in [2, 4, 6] {
        fields.board = fields.board.place(pos, Player::O);
    }
    for pos in [0, 1, 8] {
        fields.board = fields.board.place(pos, Player::X);
    }
    fields.winner = Some(Winner::O);
    fields.winning_squares = vec![2, 4, 6];
    store.update(record.id, fields).await.unwrap();

    let mut controller = GameController::new(store.clone());
    controller.on_mount().await.unwrap();
    assert_eq!(
        controller.outcome(),
        &Outcome::Win {
            player: Player::O,
            line: [2, 4, 6]
        }
    );
    assert_eq!(controller.apply_move(3).await.unwrap(), None);
}
