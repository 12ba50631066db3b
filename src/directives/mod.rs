//! Line-activation algorithms driven by label tags.
//!
//! All functions here are pure over `(label, buffer)` strings or a
//! [`Document`](crate::buffer::Document); host I/O and per-trigger bookkeeping
//! live in [`crate::engine`].

pub mod bulk;
pub mod chaos;
pub mod random;
pub mod turn;

pub use bulk::{
    adjust_weight_text, deactivate_prompt_text, force_all_inactive, reset_all_weights,
    reset_weights_text, toggle_all, toggle_all_prompts, toggle_line, toggle_line_text,
};
pub use chaos::ChaosRewrite;
pub use random::{pick_sections, random_pickup, SelectionRange};
pub use turn::{TurnRewrite, TurnState};
