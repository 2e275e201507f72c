//! Grid state and four-in-a-row detection.
//!
//! Row 0 is the top of the board. Discs obey gravity by construction:
//! callers find the landing row with [`Board::lowest_open_row`] and only
//! then [`Board::place`] the disc there. Nothing validates the grid after
//! the fact.

use dropline_types::Role;
use serde::Serialize;

use crate::error::BoardError;

/// The four axes a line can run along, as `(row_step, column_step)`.
///
/// Each axis is walked in both signs, so these cover horizontal,
/// vertical and both diagonals.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Board geometry and win length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardDims {
    rows: usize,
    columns: usize,
    connect: usize,
}

impl BoardDims {
    /// The classic 6 x 7 board, four in a row.
    pub const STANDARD: Self = Self {
        rows: 6,
        columns: 7,
        connect: 4,
    };

    /// Validate and build board dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ZeroDimension`] if any value is zero, or
    /// [`BoardError::ConnectTooLong`] if a line of `connect` discs cannot
    /// fit in either direction.
    pub fn new(rows: usize, columns: usize, connect: usize) -> Result<Self, BoardError> {
        for (name, value) in [("rows", rows), ("columns", columns), ("connect", connect)] {
            if value == 0 {
                return Err(BoardError::ZeroDimension { name });
            }
        }
        if connect > rows.max(columns) {
            return Err(BoardError::ConnectTooLong {
                rows,
                columns,
                connect,
            });
        }
        Ok(Self {
            rows,
            columns,
            connect,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Discs in a line needed to win.
    pub const fn connect(&self) -> usize {
        self.connect
    }
}

impl Default for BoardDims {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cell {
    /// No disc.
    Empty,
    /// A disc belonging to [`Role::PlayerA`].
    PlayerA,
    /// A disc belonging to [`Role::PlayerB`].
    PlayerB,
}

impl Cell {
    /// The seat owning the disc, if any.
    pub const fn occupant(self) -> Option<Role> {
        match self {
            Self::Empty => None,
            Self::PlayerA => Some(Role::PlayerA),
            Self::PlayerB => Some(Role::PlayerB),
        }
    }
}

impl From<Role> for Cell {
    fn from(role: Role) -> Self {
        match role {
            Role::PlayerA => Self::PlayerA,
            Role::PlayerB => Self::PlayerB,
        }
    }
}

/// A game board, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dims: BoardDims,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board.
    pub fn new(dims: BoardDims) -> Self {
        let len = dims.rows.saturating_mul(dims.columns);
        Self {
            dims,
            cells: vec![Cell::Empty; len],
        }
    }

    /// The board's geometry.
    pub const fn dims(&self) -> BoardDims {
        self.dims
    }

    /// Number of columns (valid drop targets are `0..columns`).
    pub const fn columns(&self) -> usize {
        self.dims.columns
    }

    /// Read a cell. Returns `None` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        self.offset(row, column)
            .and_then(|i| self.cells.get(i))
            .copied()
    }

    /// Find the row a disc dropped into `column` would land in.
    ///
    /// Scans from the bottom up. Returns `None` when the column is full
    /// or does not exist.
    pub fn lowest_open_row(&self, column: usize) -> Option<usize> {
        (0..self.dims.rows)
            .rev()
            .find(|&row| self.cell(row, column) == Some(Cell::Empty))
    }

    /// Write `role`'s disc at `(row, column)`.
    ///
    /// The target must come from [`lowest_open_row`](Self::lowest_open_row);
    /// writing anywhere else breaks the gravity invariant. Coordinates
    /// outside the grid are ignored.
    pub fn place(&mut self, row: usize, column: usize, role: Role) {
        self.write(row, column, Cell::from(role));
    }

    /// Empty a cell. Used to undo a tentative [`place`](Self::place).
    pub fn clear(&mut self, row: usize, column: usize) {
        self.write(row, column, Cell::Empty);
    }

    /// Whether the disc just placed at `(row, column)` completes a line.
    ///
    /// Walks outward from the placed cell along each axis in both
    /// directions and counts contiguous discs of `role`, the placed
    /// disc included. Only meaningful immediately after a placement at
    /// exactly this cell.
    pub fn check_win(&self, row: usize, column: usize, role: Role) -> bool {
        AXES.iter().any(|&(dr, dc)| {
            let forward = self.run_length(row, column, dr, dc, role);
            let backward = self.run_length(row, column, dr.saturating_neg(), dc.saturating_neg(), role);
            forward.saturating_add(backward).saturating_add(1) >= self.dims.connect
        })
    }

    /// Whether every column is full.
    ///
    /// Checking the top row is enough because columns fill bottom-up.
    pub fn is_full(&self) -> bool {
        (0..self.dims.columns).all(|column| self.cell(0, column) != Some(Cell::Empty))
    }

    /// Count contiguous `role` discs starting one step away from
    /// `(row, column)` in direction `(dr, dc)`.
    fn run_length(&self, row: usize, column: usize, dr: isize, dc: isize, role: Role) -> usize {
        let target = Cell::from(role);
        let mut count: usize = 0;
        let (mut r, mut c) = (row, column);
        while let (Some(next_r), Some(next_c)) = (r.checked_add_signed(dr), c.checked_add_signed(dc)) {
            if self.cell(next_r, next_c) != Some(target) {
                break;
            }
            count = count.saturating_add(1);
            r = next_r;
            c = next_c;
        }
        count
    }

    fn offset(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.dims.rows || column >= self.dims.columns {
            return None;
        }
        row.checked_mul(self.dims.columns)?.checked_add(column)
    }

    fn write(&mut self, row: usize, column: usize, cell: Cell) {
        if let Some(slot) = self.offset(row, column).and_then(|i| self.cells.get_mut(i)) {
            *slot = cell;
        }
    }
}

impl core::fmt::Display for Board {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for row in 0..self.dims.rows {
            for column in 0..self.dims.columns {
                let glyph = match self.cell(row, column) {
                    Some(Cell::PlayerA) => 'X',
                    Some(Cell::PlayerB) => 'O',
                    _ => '.',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    /// Drop a disc the way the session does: lookup, then place.
    fn drop(board: &mut Board, column: usize, role: Role) -> usize {
        let row = board.lowest_open_row(column).unwrap();
        board.place(row, column, role);
        row
    }

    /// Full-board scan: is there a line of `connect` through `(row, column)`?
    fn line_through(board: &Board, row: usize, column: usize, role: Role) -> bool {
        let connect = board.dims().connect() as isize;
        let target = Some(Cell::from(role));
        for (dr, dc) in AXES {
            // Every window of `connect` cells along this axis that contains the cell.
            for start in -(connect - 1)..=0 {
                let all = (0..connect).all(|k| {
                    let r = row as isize + (start + k) * dr;
                    let c = column as isize + (start + k) * dc;
                    r >= 0 && c >= 0 && board.cell(r as usize, c as usize) == target
                });
                if all {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn standard_dims_are_six_by_seven() {
        let dims = BoardDims::default();
        assert_eq!((dims.rows(), dims.columns(), dims.connect()), (6, 7, 4));
    }

    #[test]
    fn dims_validation() {
        assert_eq!(
            BoardDims::new(0, 7, 4),
            Err(BoardError::ZeroDimension { name: "rows" })
        );
        assert!(matches!(
            BoardDims::new(3, 3, 4),
            Err(BoardError::ConnectTooLong { .. })
        ));
        assert!(BoardDims::new(4, 4, 4).is_ok());
    }

    #[test]
    fn discs_stack_from_the_bottom() {
        let mut board = Board::new(BoardDims::STANDARD);
        assert_eq!(board.lowest_open_row(3), Some(5));
        assert_eq!(drop(&mut board, 3, Role::PlayerA), 5);
        assert_eq!(drop(&mut board, 3, Role::PlayerB), 4);
        assert_eq!(board.cell(5, 3), Some(Cell::PlayerA));
        assert_eq!(board.cell(4, 3), Some(Cell::PlayerB));
        assert_eq!(board.lowest_open_row(3), Some(3));
    }

    #[test]
    fn full_and_missing_columns_have_no_open_row() {
        let mut board = Board::new(BoardDims::STANDARD);
        for i in 0..6 {
            let role = if i % 2 == 0 { Role::PlayerA } else { Role::PlayerB };
            drop(&mut board, 0, role);
        }
        assert_eq!(board.lowest_open_row(0), None);
        assert_eq!(board.lowest_open_row(7), None);
        assert_eq!(board.lowest_open_row(usize::MAX), None);
    }

    #[test]
    fn clear_undoes_place() {
        let mut board = Board::new(BoardDims::STANDARD);
        let before = board.clone();
        let row = drop(&mut board, 2, Role::PlayerB);
        board.clear(row, 2);
        assert_eq!(board, before);
    }

    #[test]
    fn vertical_win() {
        let mut board = Board::new(BoardDims::STANDARD);
        for _ in 0..3 {
            let row = drop(&mut board, 3, Role::PlayerA);
            assert!(!board.check_win(row, 3, Role::PlayerA));
        }
        let row = drop(&mut board, 3, Role::PlayerA);
        assert!(board.check_win(row, 3, Role::PlayerA));
        assert!(!board.check_win(row, 3, Role::PlayerB));
    }

    #[test]
    fn horizontal_win_completed_in_the_middle() {
        let mut board = Board::new(BoardDims::STANDARD);
        for column in [0, 1, 3] {
            drop(&mut board, column, Role::PlayerB);
        }
        let row = drop(&mut board, 2, Role::PlayerB);
        assert!(board.check_win(row, 2, Role::PlayerB));
    }

    #[test]
    fn both_diagonals_win() {
        // Rising diagonal: (5,0) (4,1) (3,2) (2,3).
        let mut board = Board::new(BoardDims::STANDARD);
        for (column, fillers) in [(0, 0), (1, 1), (2, 2), (3, 3)] {
            for _ in 0..fillers {
                drop(&mut board, column, Role::PlayerB);
            }
        }
        for column in 0..3 {
            drop(&mut board, column, Role::PlayerA);
        }
        let row = drop(&mut board, 3, Role::PlayerA);
        assert_eq!(row, 2);
        assert!(board.check_win(row, 3, Role::PlayerA));

        // Falling diagonal: (2,3) (3,4) (4,5) (5,6).
        let mut board = Board::new(BoardDims::STANDARD);
        for (column, fillers) in [(3, 3), (4, 2), (5, 1), (6, 0)] {
            for _ in 0..fillers {
                drop(&mut board, column, Role::PlayerB);
            }
        }
        for column in [4, 5, 6] {
            drop(&mut board, column, Role::PlayerA);
        }
        let row = drop(&mut board, 3, Role::PlayerA);
        assert!(board.check_win(row, 3, Role::PlayerA));
    }

    #[test]
    fn broken_line_does_not_win() {
        let mut board = Board::new(BoardDims::STANDARD);
        for column in [0, 1, 2] {
            drop(&mut board, column, Role::PlayerA);
        }
        drop(&mut board, 3, Role::PlayerB);
        let row = drop(&mut board, 4, Role::PlayerA);
        assert!(!board.check_win(row, 4, Role::PlayerA));
    }

    #[test]
    fn check_win_agrees_with_full_scan() {
        // Deterministic pseudo-random games; after every drop the local
        // check must agree with a brute-force scan through that cell.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _game in 0..200 {
            let mut board = Board::new(BoardDims::STANDARD);
            let mut role = Role::PlayerA;
            while !board.is_full() {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                let column = (seed % 7) as usize;
                let Some(row) = board.lowest_open_row(column) else {
                    continue;
                };
                board.place(row, column, role);
                assert_eq!(
                    board.check_win(row, column, role),
                    line_through(&board, row, column, role),
                    "mismatch at ({row}, {column}) on\n{board}"
                );
                role = role.opponent();
            }
        }
    }

    #[test]
    fn small_board_connect_three() {
        let dims = BoardDims::new(3, 3, 3).unwrap();
        let mut board = Board::new(dims);
        drop(&mut board, 0, Role::PlayerA);
        drop(&mut board, 1, Role::PlayerA);
        let row = drop(&mut board, 2, Role::PlayerA);
        assert!(board.check_win(row, 2, Role::PlayerA));
    }

    #[test]
    fn is_full_only_when_top_row_filled() {
        let dims = BoardDims::new(2, 2, 2).unwrap();
        let mut board = Board::new(dims);
        drop(&mut board, 0, Role::PlayerA);
        drop(&mut board, 1, Role::PlayerB);
        assert!(!board.is_full());
        drop(&mut board, 0, Role::PlayerB);
        assert!(!board.is_full());
        drop(&mut board, 1, Role::PlayerA);
        assert!(board.is_full());
    }

    #[test]
    fn display_renders_rows_top_down() {
        let dims = BoardDims::new(2, 3, 2).unwrap();
        let mut board = Board::new(dims);
        drop(&mut board, 1, Role::PlayerA);
        drop(&mut board, 1, Role::PlayerB);
        assert_eq!(board.to_string(), ".O.\n.X.\n");
    }
}
