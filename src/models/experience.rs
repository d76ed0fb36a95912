use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_EXPERIENCE_YEARS: u8 = 20;
pub const MAX_EXPERIENCE_MONTHS: u8 = 11;

/// Structured experience value carried on a slot and sent at booking time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub years: u8,
    pub months: u8,
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years {} months", self.years, self.months)
    }
}

/// Prefix-toggle picker: choosing `k` highlights every value up to `k`, and
/// the current value is the highest highlighted one. Zero is its own marker
/// so "fresher" reads as an explicit choice rather than an untouched widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixSelector {
    limit: u8,
    selected: Vec<u8>,
}

impl PrefixSelector {
    pub fn new(limit: u8) -> Self {
        Self {
            limit,
            selected: Vec::new(),
        }
    }

    /// Applies one click. Rules:
    /// - values above the limit are ignored
    /// - `0` toggles the exclusive zero marker on and off
    /// - selecting `k > 0` activates `1..=k`
    /// - re-selecting the current maximum steps it down to `1..=k-1`
    pub fn select(&mut self, value: u8) {
        if value > self.limit {
            return;
        }
        if value == 0 {
            if self.selected.as_slice() == [0] {
                self.selected.clear();
            } else {
                self.selected = vec![0];
            }
            return;
        }
        if self.selected.last() == Some(&value) {
            self.selected = (1..value).collect();
        } else {
            self.selected = (1..=value).collect();
        }
    }

    /// Current value: the highest selected entry, or 0 when nothing is picked.
    pub fn value(&self) -> u8 {
        self.selected.last().copied().unwrap_or(0)
    }

    /// Distinguishes an explicit pick (including the zero marker) from an
    /// untouched widget. Both report `value() == 0`.
    pub fn is_explicit(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn selected(&self) -> &[u8] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceSelector {
    pub years: PrefixSelector,
    pub months: PrefixSelector,
}

impl ExperienceSelector {
    pub fn new() -> Self {
        Self {
            years: PrefixSelector::new(MAX_EXPERIENCE_YEARS),
            months: PrefixSelector::new(MAX_EXPERIENCE_MONTHS),
        }
    }

    pub fn experience(&self) -> Experience {
        Experience {
            years: self.years.value(),
            months: self.months.value(),
        }
    }

    /// True once either picker carries an explicit choice. Zero years with
    /// zero months still counts when the user actually clicked a zero.
    pub fn is_explicit(&self) -> bool {
        self.years.is_explicit() || self.months.is_explicit()
    }

    pub fn display(&self) -> String {
        self.experience().to_string()
    }
}

impl Default for ExperienceSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_value_activates_the_full_prefix() {
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_YEARS);
        picker.select(3);
        assert_eq!(picker.selected(), &[1, 2, 3]);
        assert_eq!(picker.value(), 3);
        assert!(picker.is_explicit());
    }

    #[test]
    fn reselecting_the_maximum_steps_down_by_one() {
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_YEARS);
        picker.select(3);
        picker.select(3);
        assert_eq!(picker.selected(), &[1, 2]);
        assert_eq!(picker.value(), 2);

        picker.select(2);
        assert_eq!(picker.selected(), &[1]);
        picker.select(1);
        assert_eq!(picker.selected(), &[] as &[u8]);
        assert!(!picker.is_explicit());
    }

    #[test]
    fn zero_is_an_exclusive_toggle() {
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_YEARS);
        picker.select(0);
        assert_eq!(picker.selected(), &[0]);
        assert_eq!(picker.value(), 0);
        assert!(picker.is_explicit());

        picker.select(0);
        assert_eq!(picker.selected(), &[] as &[u8]);
        assert!(!picker.is_explicit());

        picker.select(5);
        picker.select(0);
        assert_eq!(picker.selected(), &[0]);
    }

    #[test]
    fn selecting_a_higher_value_replaces_the_zero_marker() {
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_YEARS);
        picker.select(0);
        picker.select(4);
        assert_eq!(picker.selected(), &[1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_clicks_are_ignored() {
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_MONTHS);
        picker.select(12);
        assert_eq!(picker.selected(), &[] as &[u8]);
        picker.select(11);
        assert_eq!(picker.value(), 11);
        picker.select(200);
        assert_eq!(picker.value(), 11);
    }

    #[test]
    fn any_click_sequence_leaves_a_prefix_or_zero_marker() {
        let clicks = [5u8, 2, 9, 9, 0, 3, 0, 0, 20, 20, 1, 1, 7];
        let mut picker = PrefixSelector::new(MAX_EXPERIENCE_YEARS);
        for click in clicks {
            picker.select(click);
            let selected = picker.selected();
            let is_prefix = selected
                .iter()
                .enumerate()
                .all(|(i, v)| *v == (i + 1) as u8);
            let is_zero_marker = selected == [0];
            assert!(
                selected.is_empty() || is_prefix || is_zero_marker,
                "after clicking {click}: {selected:?}"
            );
        }
    }

    #[test]
    fn selector_combines_both_pickers() {
        let mut selector = ExperienceSelector::new();
        assert!(!selector.is_explicit());
        assert_eq!(selector.display(), "0 years 0 months");

        selector.years.select(3);
        selector.months.select(6);
        assert_eq!(
            selector.experience(),
            Experience { years: 3, months: 6 }
        );
        assert_eq!(selector.display(), "3 years 6 months");

        selector.years.clear();
        selector.months.clear();
        selector.months.select(0);
        assert!(selector.is_explicit());
        assert_eq!(selector.experience(), Experience { years: 0, months: 0 });
    }
}
