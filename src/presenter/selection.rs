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

//! Selection handling for [`ListPresenter`].
//!
//! Every item carries its own selected flag and a stamp recording when it
//! was selected. The presenter additionally tracks a primary item (the one
//! the user last acted on) and an anchor for range selection. The derived
//! values (selected items, selected tracks and contiguity) only count items
//! currently in view.

use std::sync::Arc;

use log::trace;

use super::{ListItem, ListPresenter, ListProperty};
use crate::{
    model::Track,
    virtualization::{SelectionModifiers, VirtualizationEvent},
};

impl<W: ListItem> ListPresenter<W> {
    /// The primary selection, if it is in view.
    pub fn selected_item(&self) -> Option<&W> {
        self.selected_item
            .filter(|&i| self.view.contains(&i))
            .map(|i| &self.items[i])
    }

    /// Selected items in view, in the order they were selected.
    pub fn selected_items(&self) -> impl Iterator<Item = &W> + '_ {
        self.selected_items.iter().map(|&i| &self.items[i])
    }

    /// Tracks of every selected item, in selection order. A track belonging
    /// to two selected groups appears twice.
    pub fn selected_tracks(&self) -> &[Arc<Track>] {
        &self.selected_tracks
    }

    /// Whether the selected items form one unbroken run in the view.
    pub fn is_selection_contiguous(&self) -> bool {
        self.selection_contiguous
    }

    pub fn select(&mut self, index: usize, modifiers: SelectionModifiers) {
        self.set_item_selected(index, true, modifiers);
    }

    pub fn toggle_selected(&mut self, index: usize, modifiers: SelectionModifiers) {
        let selected = self.item(index).is_some_and(ListItem::is_selected);
        self.set_item_selected(index, !selected, modifiers);
    }

    /// Makes the item at `index` the primary selection, or clears the whole
    /// selection for `None`.
    pub fn set_selected_item(&mut self, index: Option<usize>, modifiers: SelectionModifiers) {
        match index {
            Some(index) => self.set_item_selected(index, true, modifiers),
            None => self.select_none(),
        }
    }

    /// Selects or deselects the item at view `index`.
    ///
    /// With no modifiers every other item is deselected first. With shift,
    /// and an anchor in view, everything from the anchor to `index` is
    /// selected as well; otherwise `index` becomes the new anchor.
    pub fn set_item_selected(&mut self, index: usize, selected: bool, modifiers: SelectionModifiers) {
        let Some(&target) = self.view.get(index) else {
            return;
        };
        trace!("Selection at {index} -> {selected} with {modifiers:?}");

        if !selected {
            self.mark_selected(target, false);
            if self.selected_item == Some(target) {
                let fallback = self.latest_selected();
                self.assign_primary(fallback);
            }
            self.selection_changed();
            return;
        }

        // Items hidden by a filter are deselected too.
        if modifiers.is_exclusive() && !self.restoring_selection {
            for i in 0..self.items.len() {
                if i != target {
                    self.items[i].state_mut().is_selected = false;
                }
            }
        }

        let anchor = self.anchor.and_then(|a| self.view_position(a));
        match anchor {
            Some(from) if modifiers.shift => {
                let range: Vec<usize> = if from <= index {
                    self.view[from..=index].to_vec()
                } else {
                    self.view[index..=from].iter().rev().copied().collect()
                };
                for i in range {
                    self.mark_selected(i, true);
                }
            }
            _ => {
                self.mark_selected(target, true);
                self.anchor = Some(target);
            }
        }

        self.assign_primary(Some(target));
        self.selection_changed();
    }

    pub fn select_all(&mut self) {
        for i in self.view.clone() {
            if !self.items[i].is_selected() {
                self.mark_selected(i, true);
            }
        }
        self.selection_changed();
    }

    pub fn select_none(&mut self) {
        for item in &mut self.items {
            item.state_mut().is_selected = false;
        }
        self.anchor = None;
        self.assign_primary(None);
        self.selection_changed();
    }

    /// Flips the selected flag of every item in view.
    pub fn select_inverse(&mut self) {
        for i in self.view.clone() {
            let selected = self.items[i].is_selected();
            self.mark_selected(i, !selected);
        }
        if self.selected_item.is_some_and(|i| !self.items[i].is_selected()) {
            let fallback = self.latest_selected();
            self.assign_primary(fallback);
        }
        self.selection_changed();
    }

    pub(super) fn mark_selected(&mut self, item: usize, selected: bool) {
        let state = self.items[item].state_mut();
        state.is_selected = selected;
        if selected {
            state.selection_stamp = self.next_stamp;
            self.next_stamp += 1;
        }
    }

    pub(super) fn assign_primary(&mut self, item: Option<usize>) {
        if self.selected_item == item {
            return;
        }
        self.selected_item = item;
        self.properties.notify(&ListProperty::SelectedItem);
        if !self.restoring_selection {
            self.virtualization.notify(&VirtualizationEvent::SelectionChanged);
        }
    }

    /// Recomputes the derived selection values from the view.
    pub(super) fn selection_changed(&mut self) {
        let mut selected: Vec<usize> = self
            .view
            .iter()
            .copied()
            .filter(|&i| self.items[i].is_selected())
            .collect();

        let contiguous = match (selected.first(), selected.last()) {
            (Some(&first), Some(&last)) => {
                let start = self.view_position(first).unwrap_or(0);
                let end = self.view_position(last).unwrap_or(0);
                end + 1 - start == selected.len()
            }
            _ => false,
        };

        selected.sort_by_key(|&i| self.items[i].state().selection_stamp);

        if selected != self.selected_items {
            self.selected_tracks = selected
                .iter()
                .flat_map(|&i| self.items[i].tracks())
                .cloned()
                .collect();
            self.selected_items = selected;
            self.properties.notify(&ListProperty::SelectedItems);
            self.properties.notify(&ListProperty::SelectedTracks);
        }

        if contiguous != self.selection_contiguous {
            self.selection_contiguous = contiguous;
            self.properties.notify(&ListProperty::IsSelectionContiguous);
        }
    }

    /// The selected item in view with the highest stamp.
    fn latest_selected(&self) -> Option<usize> {
        self.view
            .iter()
            .copied()
            .filter(|&i| self.items[i].is_selected())
            .max_by_key(|&i| self.items[i].state().selection_stamp)
    }
}
