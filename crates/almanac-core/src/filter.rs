use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::event::CalendarEvent;
use crate::palette::ColorTag;

/// Independent per-category visibility toggles. Categories are the color tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    toggles: BTreeMap<ColorTag, bool>,
    defaults: BTreeMap<ColorTag, bool>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::all_visible()
    }
}

impl FilterState {
    #[must_use]
    pub fn all_visible() -> Self {
        Self::with_defaults(ColorTag::ALL.into_iter().map(|tag| (tag, true)))
    }

    /// Categories missing from `defaults` start visible.
    pub fn with_defaults<I>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (ColorTag, bool)>,
    {
        let mut toggles: BTreeMap<ColorTag, bool> =
            ColorTag::ALL.into_iter().map(|tag| (tag, true)).collect();
        toggles.extend(defaults);
        Self {
            defaults: toggles.clone(),
            toggles,
        }
    }

    pub fn toggle(&mut self, category: ColorTag) -> bool {
        let entry = self.toggles.entry(category).or_insert(true);
        *entry = !*entry;
        debug!(category = %category, active = *entry, "toggled filter");
        *entry
    }

    pub fn set(&mut self, category: ColorTag, active: bool) {
        self.toggles.insert(category, active);
    }

    #[must_use]
    pub fn is_active(&self, category: ColorTag) -> bool {
        self.toggles.get(&category).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn active_set(&self) -> BTreeSet<ColorTag> {
        self.toggles
            .iter()
            .filter(|(_, active)| **active)
            .map(|(tag, _)| *tag)
            .collect()
    }

    #[must_use]
    pub fn admits(&self, event: &CalendarEvent) -> bool {
        self.is_active(event.color())
    }

    /// Back to the defaults this state was created with.
    pub fn reset(&mut self) {
        self.toggles = self.defaults.clone();
    }
}
