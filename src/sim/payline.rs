//! Payline evaluation over a settled grid

use serde::{Deserialize, Serialize};

use super::reel::Reel;
use super::symbol::Symbol;

/// Snapshot of every reel's slots, indexed `[reel][row]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: Vec<Vec<Symbol>>,
}

impl Grid {
    pub fn new(columns: Vec<Vec<Symbol>>) -> Self {
        Self { columns }
    }

    /// Read the current slots of every reel
    pub fn from_reels(reels: &[Reel]) -> Self {
        Self {
            columns: reels.iter().map(|r| r.slots().to_vec()).collect(),
        }
    }

    pub fn reel_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, reel: usize, row: usize) -> Option<Symbol> {
        self.columns.get(reel)?.get(row).copied()
    }

    pub fn columns(&self) -> &[Vec<Symbol>] {
        &self.columns
    }
}

/// Identifier of a payline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineId {
    Top,
    Middle,
    Bottom,
    DiagonalDown,
    DiagonalUp,
}

impl LineId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineId::Top => "top",
            LineId::Middle => "middle",
            LineId::Bottom => "bottom",
            LineId::DiagonalDown => "diagonal-down",
            LineId::DiagonalUp => "diagonal-up",
        }
    }

    /// Human-readable name for the result banner
    pub fn label(&self) -> &'static str {
        match self {
            LineId::Top => "Top line",
            LineId::Middle => "Middle line",
            LineId::Bottom => "Bottom line",
            LineId::DiagonalDown => "Diagonal ↘",
            LineId::DiagonalUp => "Diagonal ↗",
        }
    }
}

/// Picks one row per reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSelector {
    /// Same row on every reel
    Row(usize),
    /// Row `start + step * reel`
    Diagonal { start: usize, step: isize },
}

impl RowSelector {
    /// Row read on `reel`, or None when the selector walks off the strip
    pub fn row_for(&self, reel: usize) -> Option<usize> {
        match *self {
            RowSelector::Row(row) => Some(row),
            RowSelector::Diagonal { start, step } => {
                let offset = step.checked_mul(isize::try_from(reel).ok()?)?;
                start.checked_add_signed(offset)
            }
        }
    }
}

/// A payline and its fixed reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    pub id: LineId,
    pub reward: u64,
    pub selector: RowSelector,
}

impl PayLine {
    pub const fn new(id: LineId, reward: u64, selector: RowSelector) -> Self {
        Self {
            id,
            reward,
            selector,
        }
    }

    /// Three rows and two diagonals over the visible window (rows 1..=3 of the strip)
    pub fn standard() -> Vec<PayLine> {
        vec![
            PayLine::new(LineId::Top, 100, RowSelector::Row(1)),
            PayLine::new(LineId::Middle, 300, RowSelector::Row(2)),
            PayLine::new(LineId::Bottom, 100, RowSelector::Row(3)),
            PayLine::new(
                LineId::DiagonalDown,
                50,
                RowSelector::Diagonal { start: 1, step: 1 },
            ),
            PayLine::new(
                LineId::DiagonalUp,
                50,
                RowSelector::Diagonal { start: 3, step: -1 },
            ),
        ]
    }

    /// True when every selected symbol equals the first one
    pub fn matches(&self, grid: &Grid) -> bool {
        let mut first = None;
        for reel in 0..grid.reel_count() {
            let Some(symbol) = self
                .selector
                .row_for(reel)
                .and_then(|row| grid.get(reel, row))
            else {
                return false;
            };
            match first {
                None => first = Some(symbol),
                Some(f) if f != symbol => return false,
                Some(_) => {}
            }
        }
        first.is_some()
    }
}

/// Result of evaluating all paylines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub total_payout: u64,
    /// Matched lines, in configured order
    pub matched_lines: Vec<LineId>,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.total_payout > 0
    }

    /// Result banner text
    pub fn message(&self) -> String {
        if self.is_win() {
            let labels: Vec<_> = self.matched_lines.iter().map(|l| l.label()).collect();
            format!("WIN {}$!\n({})", self.total_payout, labels.join(", "))
        } else {
            "TRY AGAIN".to_string()
        }
    }
}

/// Evaluate `lines` over `grid`
pub fn evaluate(grid: &Grid, lines: &[PayLine]) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for line in lines.iter().filter(|line| line.matches(grid)) {
        evaluation.total_payout += line.reward;
        evaluation.matched_lines.push(line.id);
    }
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::symbol::Symbol::*;
    use proptest::prelude::*;

    /// Build a grid from visible rows (top, middle, bottom) with overscan filler around them
    fn grid_from_rows(rows: [[Symbol; 3]; 3]) -> Grid {
        let filler = [Seven, Star, Orange];
        let columns = (0..3)
            .map(|reel| {
                vec![
                    filler[reel],
                    rows[0][reel],
                    rows[1][reel],
                    rows[2][reel],
                    filler[reel],
                    filler[(reel + 1) % 3],
                    filler[(reel + 2) % 3],
                ]
            })
            .collect();
        Grid::new(columns)
    }

    #[test]
    fn test_top_row_only() {
        let grid = grid_from_rows([
            [Cherry, Cherry, Cherry],
            [Bell, Lemon, Orange],
            [Lemon, Orange, Bell],
        ]);
        let result = evaluate(&grid, &PayLine::standard());
        assert_eq!(result.total_payout, 100);
        assert_eq!(result.matched_lines, vec![LineId::Top]);
        assert_eq!(result.message(), "WIN 100$!\n(Top line)");
    }

    #[test]
    fn test_no_match() {
        let grid = grid_from_rows([
            [Cherry, Bell, Seven],
            [Bell, Lemon, Orange],
            [Lemon, Orange, Cherry],
        ]);
        let result = evaluate(&grid, &PayLine::standard());
        assert_eq!(result, Evaluation::default());
        assert_eq!(result.message(), "TRY AGAIN");
    }

    #[test]
    fn test_diagonals() {
        let grid = grid_from_rows([
            [Star, Bell, Star],
            [Lemon, Star, Orange],
            [Star, Cherry, Star],
        ]);
        let result = evaluate(&grid, &PayLine::standard());
        assert_eq!(
            result.matched_lines,
            vec![LineId::DiagonalDown, LineId::DiagonalUp]
        );
        assert_eq!(result.total_payout, 100);
    }

    #[test]
    fn test_uniform_grid_pays_every_line_in_order() {
        let grid = Grid::new(vec![vec![Bell; 7]; 3]);
        let result = evaluate(&grid, &PayLine::standard());
        assert_eq!(result.total_payout, 600);
        assert_eq!(
            result.matched_lines,
            vec![
                LineId::Top,
                LineId::Middle,
                LineId::Bottom,
                LineId::DiagonalDown,
                LineId::DiagonalUp
            ]
        );
    }

    #[test]
    fn test_selector_off_strip_never_matches() {
        // Five reels walk the up-diagonal below row 0
        let grid = Grid::new(vec![vec![Seven; 7]; 5]);
        let up = PayLine::new(
            LineId::DiagonalUp,
            50,
            RowSelector::Diagonal { start: 3, step: -1 },
        );
        assert!(!up.matches(&grid));
        let short = Grid::new(vec![vec![Seven; 2]; 3]);
        assert!(!PayLine::new(LineId::Bottom, 100, RowSelector::Row(3)).matches(&short));
    }

    #[test]
    fn test_empty_grid_pays_nothing() {
        let result = evaluate(&Grid::new(Vec::new()), &PayLine::standard());
        assert_eq!(result.total_payout, 0);
        assert!(result.matched_lines.is_empty());
    }

    fn symbol_strategy() -> impl Strategy<Value = Symbol> {
        prop::sample::select(Symbol::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_payout_is_sum_of_all_equal_lines(
            columns in proptest::collection::vec(
                proptest::collection::vec(symbol_strategy(), 7),
                3,
            )
        ) {
            let grid = Grid::new(columns);
            let lines = PayLine::standard();
            let result = evaluate(&grid, &lines);

            let mut expected = 0;
            let mut expected_ids = Vec::new();
            for line in &lines {
                let picked: Vec<Symbol> = (0..3)
                    .map(|reel| grid.get(reel, line.selector.row_for(reel).unwrap()).unwrap())
                    .collect();
                if picked.iter().all(|s| *s == picked[0]) {
                    expected += line.reward;
                    expected_ids.push(line.id);
                }
            }

            prop_assert_eq!(result.total_payout, expected);
            prop_assert_eq!(result.matched_lines, expected_ids);
        }
    }
}
