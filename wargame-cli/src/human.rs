//! Keyboard move entry

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use wargame_core::{GameState, Move, MoveSource, SourceError};

/// Reads moves like `D2 D3` from a line-oriented input
pub struct Keyboard<R, W> {
    input: R,
    output: W,
}

impl Keyboard<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Keyboard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> MoveSource for Keyboard<R, W> {
    fn next_move(&mut self, state: &GameState) -> Result<Move, SourceError> {
        loop {
            write!(self.output, "Player {}, enter your move: ", state.next_player())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(SourceError::Closed);
            }

            match Move::parse(&line) {
                Some(mv) if state.is_valid_coord(mv.src) && state.is_valid_coord(mv.dst) => {
                    return Ok(mv)
                }
                _ => writeln!(self.output, "Invalid coordinates! Try again.")?,
            }
        }
    }
}
