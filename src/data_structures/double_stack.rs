/// Double-buffered worklist: pushes land on the write stack, pops come from
/// the read stack, and [DoubleStack::swap] exchanges the two.
///
/// The propagation engine drains one level of updates from the read stack
/// while queueing the next level on the write stack, so a swap marks a level
/// boundary.
///
/// # Example
/// ```
/// # use gatesim::data_structures::DoubleStack;
/// let mut stacks = DoubleStack::new();
///
/// stacks.push(1);
/// stacks.push(2);
/// assert_eq!(stacks.pop(), None);
///
/// stacks.swap();
/// assert_eq!(stacks.pop(), Some(2));
/// assert_eq!(stacks.pop(), Some(1));
/// assert_eq!(stacks.pop(), None);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DoubleStack<T> {
    read_stack: Vec<T>,
    write_stack: Vec<T>,
}

impl<T> DoubleStack<T> {
    /// Returns an empty [DoubleStack].
    pub fn new() -> Self {
        Self {
            read_stack: Vec::new(),
            write_stack: Vec::new(),
        }
    }

    /// Pops an item from the read stack, [None] when the level is drained.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        self.read_stack.pop()
    }

    /// Pushes an item onto the write stack.
    #[inline(always)]
    pub fn push(&mut self, v: T) {
        self.write_stack.push(v);
    }

    /// Swaps the read and write stacks, exposing everything pushed since the
    /// last swap.
    #[inline(always)]
    pub fn swap(&mut self) {
        debug_assert!(
            self.read_stack.is_empty(),
            "Tried to swap stacks while the read stack is not empty"
        );
        std::mem::swap(&mut self.read_stack, &mut self.write_stack);
    }

    /// Drops everything from both stacks, used to abandon a propagation pass
    /// after an error.
    pub fn clear(&mut self) {
        self.read_stack.clear();
        self.write_stack.clear();
    }

    /// Returns the total number of items across both stacks.
    pub fn len(&self) -> usize {
        self.read_stack.len() + self.write_stack.len()
    }

    /// Returns true if both stacks are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for DoubleStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
