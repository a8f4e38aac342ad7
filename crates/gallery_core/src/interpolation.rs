//! Tab indicator weights derived from the selection state alone.

use crate::selection::SelectionState;

pub const ACTIVE_WEIGHT: f32 = 1.0;
pub const REST_WEIGHT: f32 = 0.5;

/// One opacity weight per tab: `1.0` where the indicator sits, falling off
/// linearly to `0.5` one tab away.
pub fn indicator_weights(selection: &SelectionState, tab_count: usize) -> Vec<f32> {
    (0..tab_count)
        .map(|index| tab_weight(selection.transition_position, index))
        .collect()
}

fn tab_weight(position: f32, index: usize) -> f32 {
    let distance = (position - index as f32).abs();
    (ACTIVE_WEIGHT - (ACTIVE_WEIGHT - REST_WEIGHT) * distance).clamp(REST_WEIGHT, ACTIVE_WEIGHT)
}

/// The underline bar follows the committed selection, not the animation.
pub fn indicator_underline(selection: &SelectionState, index: usize) -> bool {
    selection.active_index == index
}
