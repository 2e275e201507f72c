//! Error types for the `dropline-board` crate.

/// Errors that can occur when configuring a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A dimension was zero.
    #[error("board dimension `{name}` must be at least 1")]
    ZeroDimension {
        /// Which dimension.
        name: &'static str,
    },

    /// The line length can never fit on the board.
    #[error("connect length {connect} does not fit a {rows}x{columns} board")]
    ConnectTooLong {
        /// Rows on the board.
        rows: usize,
        /// Columns on the board.
        columns: usize,
        /// Required line length.
        connect: usize,
    },
}
