/*
 * Pure helpers for turning raw clicks into gestures. The tree treats two
 * activations of the same entry in quick succession as a toggle; clicks that
 * land on empty space clear the current selection. Keeping these as functions
 * of their inputs, with time passed in, lets them be tested without a clock.
 */
use super::ui_types::{EntryId, RowBounds};

pub const DOUBLE_ACTIVATION_WINDOW_MS: u64 = 400;

// Memory of the previous activation. The default state has seen nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationState {
    last_entry: Option<EntryId>,
    last_timestamp_ms: u64,
}

/*
 * Returns whether this activation completes a double activation, together with
 * the state to keep for the next call. A detected pair resets the state, so a
 * third quick click starts a new pair instead of completing another one.
 */
pub fn detect_double_activation(
    state: ActivationState,
    entry: Option<EntryId>,
    timestamp_ms: u64,
) -> (bool, ActivationState) {
    let within_window = timestamp_ms >= state.last_timestamp_ms
        && timestamp_ms - state.last_timestamp_ms < DOUBLE_ACTIVATION_WINDOW_MS;
    let same_entry = entry.is_some() && entry == state.last_entry;

    if within_window && same_entry {
        (true, ActivationState::default())
    } else {
        (
            false,
            ActivationState {
                last_entry: entry,
                last_timestamp_ms: timestamp_ms,
            },
        )
    }
}

// A click on empty tree space clears an existing tree selection.
pub fn should_clear_tree_selection(hit: Option<EntryId>, has_tree_selection: bool) -> bool {
    hit.is_none() && has_tree_selection
}

/*
 * Whether a click at `y` really landed on the row the list reported as
 * nearest. Lists report the nearest row even for clicks below the last one.
 */
pub fn list_click_hits_row(y: i32, row: Option<RowBounds>) -> bool {
    match row {
        Some(bounds) => y >= bounds.top && y <= bounds.top + bounds.height,
        None => false,
    }
}
