//! Dropdown selection state.

/// Which category and sub-item the left panel dropdowns point at.
#[derive(Default)]
pub struct SelectionState {
    pub category_index: usize,
    pub sub_item_index: usize,
}

impl SelectionState {
    /// Clamps the sub-item index after a category switch.
    pub fn select_category(&mut self, index: usize) {
        if index != self.category_index {
            self.category_index = index;
            self.sub_item_index = 0;
        }
    }
}
