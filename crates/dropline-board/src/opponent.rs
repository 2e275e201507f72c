//! Heuristic move selection for the synthetic AI participant.
//!
//! The heuristic is deliberately shallow:
//!
//! 1. Take an immediate win if one exists.
//! 2. Otherwise block the opponent's immediate win.
//! 3. Otherwise play the most central open column.
//!
//! Candidate moves are tried on a scratch copy of the board and undone
//! right after the win check, so evaluation never leaks into the board
//! the caller passed in.

use dropline_types::Role;
use tracing::debug;

use crate::board::Board;

/// Pick a column for `own` to play.
///
/// Returns `None` only when every column is full; callers should not ask
/// for a move once the board is full.
pub fn select_move(board: &Board, own: Role, opponent: Role) -> Option<usize> {
    let mut scratch = board.clone();

    if let Some(column) = completing_column(&mut scratch, own) {
        debug!(column, role = %own, "opponent taking winning column");
        return Some(column);
    }
    if let Some(column) = completing_column(&mut scratch, opponent) {
        debug!(column, role = %own, "opponent blocking column");
        return Some(column);
    }
    let column = center_order(board.columns()).find(|&c| board.lowest_open_row(c).is_some());
    debug!(column, role = %own, "opponent playing positional column");
    column
}

/// First column, left to right, where a disc of `role` would complete a line.
///
/// Each candidate is placed, checked and cleared before moving on.
fn completing_column(board: &mut Board, role: Role) -> Option<usize> {
    (0..board.columns()).find(|&column| {
        let Some(row) = board.lowest_open_row(column) else {
            return false;
        };
        board.place(row, column, role);
        let wins = board.check_win(row, column, role);
        board.clear(row, column);
        wins
    })
}

/// Columns ordered from the center outward, left side first.
///
/// Seven columns yield `3, 2, 4, 1, 5, 0, 6`.
pub fn center_order(columns: usize) -> impl Iterator<Item = usize> {
    let center = columns / 2;
    core::iter::once(center)
        .chain((1..=columns).flat_map(move |offset| {
            let left = center.checked_sub(offset);
            let right = center.checked_add(offset).filter(|&c| c < columns);
            left.into_iter().chain(right)
        }))
        .filter(move |&c| c < columns)
}
