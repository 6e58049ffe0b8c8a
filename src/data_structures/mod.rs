mod double_stack;
pub use double_stack::*;
