use dioxus::prelude::*;

use board_common::board::{BoardHandle, BoardState};

/// The board state signal, shared as context at the top of the app.
///
/// A newtype so the controller's [`BoardHandle`] can be implemented for it.
#[derive(Clone, Copy, PartialEq)]
pub struct BoardSignal(Signal<BoardState>);

impl BoardSignal {
    pub fn new() -> Self {
        Self(Signal::new(BoardState::new()))
    }

    pub fn state(self) -> Signal<BoardState> {
        self.0
    }
}

impl BoardHandle for BoardSignal {
    fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let mut signal = self.0;
        signal.with_mut(f)
    }
}

pub fn use_board() -> BoardSignal {
    use_context::<BoardSignal>()
}
