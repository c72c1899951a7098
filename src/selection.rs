//! Variant selection across mutually-exclusive button groups.

use std::fmt;

use serde::Serialize;

use crate::config::GroupConfig;

/// Sentinel identifier for the user-customized variant.
pub const CUSTOM: &str = "custom";

/// A named preset or the custom palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Variant {
    Custom,
    Preset(String),
}

impl Variant {
    /// Opaque identifier from a `data-variant` value or button label.
    pub fn parse(id: &str) -> Self {
        if id == CUSTOM {
            Self::Custom
        } else {
            Self::Preset(id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Custom => CUSTOM,
            Self::Preset(id) => id,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Variant> for String {
    fn from(variant: Variant) -> Self {
        variant.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub variant: Variant,
}

/// One `.button-group`: at most one button carries the active marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonGroup {
    pub name: String,
    pub drives_preview: bool,
    buttons: Vec<Button>,
    active: Option<usize>,
}

impl ButtonGroup {
    pub fn new(name: impl Into<String>, drives_preview: bool, buttons: Vec<Button>) -> Self {
        Self {
            name: name.into(),
            drives_preview,
            buttons,
            active: None,
        }
    }

    pub fn from_config(config: &GroupConfig) -> Self {
        let buttons = config
            .buttons
            .iter()
            .map(|b| Button {
                label: b.label.clone(),
                variant: Variant::parse(b.variant.as_deref().unwrap_or(&b.label)),
            })
            .collect();
        Self::new(config.name.clone(), config.drives_preview, buttons)
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_button(&self) -> Option<&Button> {
        self.active.and_then(|i| self.buttons.get(i))
    }

    /// Find a button by variant identifier, falling back to its label.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.buttons
            .iter()
            .position(|b| b.variant.as_str() == key)
            .or_else(|| self.buttons.iter().position(|b| b.label == key))
    }
}

/// Outcome of a click, consumed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub group: usize,
    pub button: usize,
    pub variant: Variant,
    pub drives_preview: bool,
}

/// Tracks the active button of every group.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    groups: Vec<ButtonGroup>,
}

impl SelectionTracker {
    pub fn new(groups: Vec<ButtonGroup>) -> Self {
        Self { groups }
    }

    pub fn from_config(groups: &[GroupConfig]) -> Self {
        Self::new(groups.iter().map(ButtonGroup::from_config).collect())
    }

    pub fn groups(&self) -> &[ButtonGroup] {
        &self.groups
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    /// Resolve `(group name, button key)` to indices.
    pub fn locate(&self, group: &str, button: &str) -> Option<(usize, usize)> {
        let g = self.group_index(group)?;
        let b = self.groups[g].position(button)?;
        Some((g, b))
    }

    /// Mark `button` as the only active button of `group`.
    ///
    /// Returns `None` when the indices do not name a button.
    pub fn select(&mut self, group: usize, button: usize) -> Option<Selected> {
        let g = self.groups.get_mut(group)?;
        let chosen = g.buttons.get(button)?;
        let selected = Selected {
            group,
            button,
            variant: chosen.variant.clone(),
            drives_preview: g.drives_preview,
        };
        g.active = Some(button);
        tracing::debug!(group = %g.name, variant = %selected.variant, "button selected");
        Some(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ButtonConfig;

    fn group(name: &str, drives_preview: bool, labels: &[(&str, Option<&str>)]) -> GroupConfig {
        GroupConfig {
            name: name.to_string(),
            drives_preview,
            buttons: labels
                .iter()
                .map(|(label, variant)| ButtonConfig {
                    label: label.to_string(),
                    variant: variant.map(String::from),
                })
                .collect(),
        }
    }

    fn tracker() -> SelectionTracker {
        SelectionTracker::from_config(&[
            group(
                "variant",
                true,
                &[
                    ("Adaptive", Some("adaptive")),
                    ("Dark", Some("dark")),
                    ("Custom", Some("custom")),
                ],
            ),
            group("format", false, &[("markdown", None), ("html", None)]),
        ])
    }

    fn active_count(tracker: &SelectionTracker, group: usize) -> usize {
        usize::from(tracker.groups()[group].active().is_some())
    }

    #[test]
    fn nothing_is_active_initially() {
        let tracker = tracker();
        assert!(tracker.groups().iter().all(|g| g.active().is_none()));
    }

    #[test]
    fn exclusive_within_group_and_independent_across_groups() {
        let mut tracker = tracker();
        let clicks = [(0, 1), (1, 0), (0, 2), (0, 2), (1, 1), (0, 0)];
        for (g, b) in clicks {
            tracker.select(g, b).unwrap();
            assert!(active_count(&tracker, 0) <= 1);
            assert_eq!(tracker.groups()[g].active(), Some(b));
        }
        assert_eq!(tracker.groups()[0].active(), Some(0));
        assert_eq!(tracker.groups()[1].active(), Some(1));
    }

    #[test]
    fn reselecting_is_idempotent() {
        let mut tracker = tracker();
        let first = tracker.select(0, 1).unwrap();
        let second = tracker.select(0, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.variant, Variant::parse("dark"));
        assert_eq!(
            tracker.groups()[0].active_button().map(|b| b.label.as_str()),
            Some("Dark")
        );
    }

    #[test]
    fn missing_variant_attribute_uses_label() {
        let tracker = tracker();
        let format = &tracker.groups()[1];
        assert_eq!(format.buttons()[0].variant, Variant::Preset("markdown".into()));
        assert_eq!(tracker.locate("format", "html"), Some((1, 1)));
    }

    #[test]
    fn custom_sentinel_is_recognized() {
        let mut tracker = tracker();
        let selected = tracker.select(0, 2).unwrap();
        assert!(selected.variant.is_custom());
        assert!(selected.drives_preview);
        assert_eq!(tracker.locate("variant", "Custom"), Some((0, 2)));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut tracker = tracker();
        assert!(tracker.select(0, 9).is_none());
        assert!(tracker.select(5, 0).is_none());
        assert_eq!(tracker.locate("variant", "neon"), None);
    }
}
