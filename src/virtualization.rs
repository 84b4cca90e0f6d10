// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Contract between presenters and the virtualizing control showing them.
//!
//! A virtualizing host only materializes the rows that are on screen. It
//! needs to know when the order or the primary selection changed so it can
//! bring the right row into view, and each row needs to know when it was
//! materialized so it can fetch its artwork lazily. Nothing here depends on
//! how rows are drawn.

use crate::{artwork::ThumbnailProvider, model::DatabaseIndex, observer::SubscriptionId};

/// Notifications a presenter sends to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VirtualizationEvent {
    /// Items were reordered; the host should find the primary selection again
    /// and scroll to it, if there is one.
    SortOrderChanged,

    /// The primary selection changed.
    SelectionChanged,

    /// Scroll the row at this view index into view.
    ScrollToIndexRequested(usize),

    /// Restore a scroll offset captured before a rebuild.
    ScrollOffsetRestoreRequested(f64),
}

/// Keyboard and pointer state accompanying a selection gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub drag_select: bool,
}

impl SelectionModifiers {
    pub const NONE: Self = Self { ctrl: false, shift: false, drag_select: false };
    pub const CTRL: Self = Self { ctrl: true, shift: false, drag_select: false };
    pub const SHIFT: Self = Self { ctrl: false, shift: true, drag_select: false };
    pub const DRAG: Self = Self { ctrl: false, shift: false, drag_select: true };

    /// Whether selecting an item should deselect every other item.
    pub fn is_exclusive(&self) -> bool {
        !(self.ctrl || self.shift || self.drag_select)
    }
}

/// Presenter-side half of the virtualization contract.
pub trait SelectVirtualizableItems {
    fn subscribe_virtualization(
        &mut self,
        callback: Box<dyn FnMut(&VirtualizationEvent)>,
    ) -> SubscriptionId;

    fn unsubscribe_virtualization(&mut self, id: SubscriptionId) -> bool;

    fn item_count(&self) -> usize;

    /// View index of the primary selection, if it is in view.
    fn selected_index(&self) -> Option<usize>;

    /// View index of the item backed by `entity`, if it is in view.
    fn index_of_entity(&self, entity: DatabaseIndex) -> Option<usize>;

    /// Records the host's current scroll offset so a refresh can restore it.
    fn set_scroll_offset(&mut self, offset: f64);

    fn scroll_offset(&self) -> f64;

    /// Asks the host to bring a row into view; ignored for `None`.
    fn request_scroll_to(&mut self, index: Option<usize>);
}

/// Row lifecycle hooks called by the host.
pub trait VirtualizableItem {
    /// The row became visible.
    fn on_prepared(&self, thumbnails: &mut dyn ThumbnailProvider);

    /// The row is no longer visible.
    fn on_cleared(&self, thumbnails: &mut dyn ThumbnailProvider);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_modifier_makes_selection_additive() {
        assert!(SelectionModifiers::NONE.is_exclusive());
        assert!(!SelectionModifiers::CTRL.is_exclusive());
        assert!(!SelectionModifiers::SHIFT.is_exclusive());
        assert!(!SelectionModifiers::DRAG.is_exclusive());
    }
}
