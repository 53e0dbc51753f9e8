// tictactoe.rs

use std::fmt;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Winner(Mark),
    Draw,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: [Option<Mark>; 9],
    current: Mark,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            board: [None; 9],
            current: Mark::X,
        }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mark {
        self.current
    }

    /// Places the current mark at `pos` (0..=8). False if the cell is
    /// occupied or out of range.
    pub fn play(&mut self, pos: usize) -> bool {
        match self.board.get_mut(pos) {
            Some(cell @ None) => {
                *cell = Some(self.current);
                self.current = self.current.other();
                true
            }
            _ => false,
        }
    }

    pub fn outcome(&self) -> Outcome {
        for [a, b, c] in LINES {
            if let Some(mark) = self.board[a] {
                if self.board[b] == Some(mark) && self.board[c] == Some(mark) {
                    return Outcome::Winner(mark);
                }
            }
        }
        if self.board.iter().all(Option::is_some) {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    pub fn render(&self) -> String {
        let cell = |i: usize| self.board[i].map_or(' ', Mark::symbol);
        (0..3)
            .map(|row| {
                let i = row * 3;
                format!(" {} | {} | {} ", cell(i), cell(i + 1), cell(i + 2))
            })
            .collect::<Vec<_>>()
            .join("\n---+---+---\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(cells: &str) -> Game {
        let mut g = Game::new();
        for (i, ch) in cells.chars().enumerate() {
            g.board[i] = match ch {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        g
    }

    #[test]
    fn play_alternates_and_rejects_bad_moves() {
        let mut g = Game::new();
        assert!(g.play(0));
        assert_eq!(g.current(), Mark::O);
        assert!(!g.play(0));
        assert!(!g.play(9));
        assert_eq!(g.current(), Mark::O);
    }

    #[test]
    fn detects_winners_and_draws() {
        assert_eq!(game("XXXOO....").outcome(), Outcome::Winner(Mark::X));
        assert_eq!(game("XO.XO..O.").outcome(), Outcome::Winner(Mark::O));
        assert_eq!(game("O.X.X.X.O").outcome(), Outcome::Winner(Mark::X));
        assert_eq!(game("XOXXOOOXX").outcome(), Outcome::Draw);
        assert_eq!(game("X........").outcome(), Outcome::InProgress);
    }

    #[test]
    fn row_win_through_play() {
        let mut g = Game::new();
        for pos in [0, 3, 1, 4, 2] {
            assert!(g.play(pos));
        }
        assert_eq!(g.outcome(), Outcome::Winner(Mark::X));
    }

    #[test]
    fn renders_grid() {
        assert_eq!(
            game("X...O....").render(),
            " X |   |   \n---+---+---\n   | O |   \n---+---+---\n   |   |   "
        );
    }
}
