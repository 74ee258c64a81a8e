//! UI-visible session state, owned and mutated by the controller.

pub mod state;
