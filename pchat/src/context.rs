//! Bounded context construction from stored history.
//!
//! ```rust
//! use pchat::build_context;
//!
//! assert!(build_context(&[], 10).is_empty());
//! ```

use pprovider::Message;

use crate::Turn;

/// Default number of trailing turns sent to the provider.
pub const CONTEXT_WINDOW_TURNS: usize = 10;

/// Reduces ascending-by-time history to at most the last `window` turns,
/// order preserved, metadata dropped. Pure and total.
pub fn build_context(history: &[Turn], window: usize) -> Vec<Message> {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|turn| Message::new(turn.role, turn.content.clone()))
        .collect()
}
