//! Viterbi decoding of two-state hidden Markov models, in log space.
//!
//! ```
//! use twostate::model::HiddenMarkovModel;
//! let model = HiddenMarkovModel::casino();
//! // Rolls of a die, 0-based.
//! let rolls = vec![0, 3, 2, 5, 5, 5, 5, 5, 5, 5, 1, 4];
//! let decoded = model.decode(&rolls).unwrap();
//! assert_eq!(decoded.len(), rolls.len());
//! println!("{}", model.labels.render(&decoded.path));
//! ```
#[macro_use]
extern crate log;
pub mod config;
pub mod dptable;
pub mod emission;
pub mod error;
pub mod gen_seq;
pub mod io;
pub mod logprob;
pub mod model;
pub mod viterbi;
pub use error::{Error, Result};

/// A hidden state. There are only two of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    First,
    Second,
}

/// All the states, in index order.
pub const STATES: [State; 2] = [State::First, State::Second];

impl State {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            State::First => 0,
            State::Second => 1,
        }
    }
    pub fn from_index(index: usize) -> Option<Self> {
        STATES.get(index).copied()
    }
}
