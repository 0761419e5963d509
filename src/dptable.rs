//! A dynamic programming table for two-state models.
//! Columns are time steps, and each column holds one cell per state.
use crate::State;

#[derive(Debug, Clone)]
pub struct DPTable<T> {
    // Total memory, column-major: [t * 2 + state].
    mem: Vec<T>,
    // Number of columns.
    len: usize,
}

impl<T: Copy> DPTable<T> {
    /// Allocate `2 * len` cells at once, all set to `init`.
    pub fn new(len: usize, init: T) -> Self {
        Self {
            mem: vec![init; 2 * len],
            len,
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[inline]
    fn offset(state: State, t: usize) -> usize {
        t * 2 + state.index()
    }
    pub fn get(&self, state: State, t: usize) -> T {
        self.mem[Self::offset(state, t)]
    }
    pub fn set(&mut self, state: State, t: usize, target: T) {
        if let Some(slot) = self.mem.get_mut(Self::offset(state, t)) {
            *slot = target;
        }
    }
    pub fn get_mut(&mut self, state: State, t: usize) -> Option<&mut T> {
        self.mem.get_mut(Self::offset(state, t))
    }
    /// The two cells of the t-th column, indexed by `State::index`.
    pub fn column(&self, t: usize) -> &[T] {
        match self.mem.get(2 * t..2 * t + 2) {
            Some(column) => column,
            None => &self.mem[0..0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn set_and_get() {
        let mut table = DPTable::new(4, 0f64);
        assert_eq!(table.len(), 4);
        table.set(State::Second, 2, 1.5);
        *table.get_mut(State::First, 3).unwrap() = -2.0;
        assert_eq!(table.get(State::Second, 2), 1.5);
        assert_eq!(table.get(State::First, 2), 0.0);
        assert_eq!(table.column(3), &[-2.0, 0.0]);
        assert!(table.column(4).is_empty());
        assert!(table.get_mut(State::First, 4).is_none());
    }
    #[test]
    fn back_pointers() {
        let mut table = DPTable::new(3, State::First);
        table.set(State::First, 1, State::Second);
        assert_eq!(table.get(State::First, 1), State::Second);
        assert_eq!(table.get(State::Second, 1), State::First);
        // Out of range writes are ignored.
        table.set(State::Second, 10, State::Second);
        assert_eq!(table.column(2), &[State::First, State::First]);
    }
}
