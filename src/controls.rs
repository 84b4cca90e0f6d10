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

//! Small stateful controls shared by hosts.
//!
//! * [`MultiStateToggle`] cycles through a fixed list of states, wrapping at
//!   either end (ordering presets, repeat modes).
//! * [`Slider`] holds a value clamped to a range and moved in steps (page
//!   size, volume).

/// A control that cycles through a fixed, non-empty list of states.
#[derive(Debug, Clone)]
pub struct MultiStateToggle<T> {
    states: Vec<T>,
    current: usize,
}

impl<T> MultiStateToggle<T> {
    /// Returns `None` when `states` is empty.
    pub fn new(states: Vec<T>) -> Option<Self> {
        (!states.is_empty()).then_some(Self { states, current: 0 })
    }

    pub fn current(&self) -> &T {
        &self.states[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Advances to the next state, wrapping to the first.
    pub fn next(&mut self) -> &T {
        self.current = (self.current + 1) % self.states.len();
        self.current()
    }

    pub fn previous(&mut self) -> &T {
        self.current = (self.current + self.states.len() - 1) % self.states.len();
        self.current()
    }

    /// Jumps to the first state matching `predicate`; returns whether one did.
    pub fn select(&mut self, predicate: impl Fn(&T) -> bool) -> bool {
        match self.states.iter().position(predicate) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }
}

/// A value clamped to `min..=max`, moved in fixed steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Slider {
    /// `min` and `max` are swapped if given in the wrong order.
    pub fn new(value: f64, min: f64, max: f64, step: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { value: value.clamp(min, max), min, max, step: step.abs() }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Sets the value, clamped to the range. Returns the stored value.
    pub fn set(&mut self, value: f64) -> f64 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    pub fn increment(&mut self) -> f64 {
        self.set(self.value + self.step)
    }

    pub fn decrement(&mut self) -> f64 {
        self.set(self.value - self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_wraps_both_ways() {
        let mut toggle = MultiStateToggle::new(vec!["off", "all", "one"]).expect("states");

        assert_eq!(*toggle.current(), "off");
        assert_eq!(*toggle.next(), "all");
        assert_eq!(*toggle.next(), "one");
        assert_eq!(*toggle.next(), "off");
        assert_eq!(*toggle.previous(), "one");
        assert_eq!(toggle.index(), 2);
    }

    #[test]
    fn test_toggle_needs_states() {
        assert!(MultiStateToggle::<u8>::new(vec![]).is_none());
    }

    #[test]
    fn test_toggle_select() {
        let mut toggle = MultiStateToggle::new(vec![1, 2, 3]).expect("states");
        assert!(toggle.select(|s| *s == 3));
        assert_eq!(*toggle.current(), 3);
        assert!(!toggle.select(|s| *s == 9));
        assert_eq!(*toggle.current(), 3);
    }

    #[test]
    fn test_slider_clamps_and_steps() {
        let mut slider = Slider::new(25.0, 50.0, 1.0, 10.0);

        assert_eq!(slider.value(), 25.0);
        assert_eq!(slider.increment(), 35.0);
        assert_eq!(slider.increment(), 45.0);
        assert_eq!(slider.increment(), 50.0);
        assert_eq!(slider.decrement(), 40.0);
        assert_eq!(slider.set(-3.0), 1.0);
        assert_eq!(slider.decrement(), 1.0);
    }
}
