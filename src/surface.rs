//! Presentation surface the controller writes to, and a headless recording page.

use std::collections::BTreeMap;

use crate::config::{PageConfig, PickerConfig};

/// DOM operations the controller performs.
///
/// Indices follow document order of groups and buttons; fields and triggers
/// are addressed by their identity.
pub trait Surface {
    fn set_button_active(&mut self, group: usize, button: usize, active: bool);
    fn set_customisation_open(&mut self, open: bool);
    fn set_color_value(&mut self, field: &str, value: &str);
    /// Attach the color picker to every color input.
    fn configure_picker(&mut self, config: &PickerConfig);
    /// Assigning a source starts a new image load.
    fn set_preview_source(&mut self, url: &str);
    fn set_snippet_text(&mut self, text: &str);
    fn snippet_text(&self) -> String;
    fn set_snippet_html(&mut self, html: &str);
    fn trigger_label(&self, trigger: &str) -> Option<String>;
    fn set_trigger_label(&mut self, trigger: &str, label: &str);
    /// Drop the text selection a copy action leaves behind.
    fn clear_selection(&mut self);
    fn set_time_text(&mut self, index: usize, text: &str);
}

/// In-memory page that records every write.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPage {
    active: Vec<Vec<bool>>,
    customisation_open: bool,
    color_values: Vec<(String, String)>,
    picker: Option<PickerConfig>,
    preview_source: Option<String>,
    preview_loads: usize,
    snippet_text: String,
    snippet_html: String,
    trigger_labels: BTreeMap<String, String>,
    label_history: Vec<(String, String)>,
    selection_clears: usize,
    times: Vec<Option<String>>,
}

impl HeadlessPage {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            active: config
                .groups
                .iter()
                .map(|g| vec![false; g.buttons.len()])
                .collect(),
            color_values: config
                .colors
                .iter()
                .map(|c| (c.name.clone(), c.default.clone()))
                .collect(),
            trigger_labels: config
                .triggers
                .iter()
                .map(|t| (t.id.clone(), t.label.clone()))
                .collect(),
            times: vec![None; config.times.len()],
            ..Default::default()
        }
    }

    pub fn is_active(&self, group: usize, button: usize) -> bool {
        self.active
            .get(group)
            .and_then(|g| g.get(button))
            .copied()
            .unwrap_or(false)
    }

    /// Indices of buttons carrying the active marker in `group`.
    pub fn active_buttons(&self, group: usize) -> Vec<usize> {
        self.active
            .get(group)
            .map(|g| (0..g.len()).filter(|&i| g[i]).collect())
            .unwrap_or_default()
    }

    pub fn customisation_open(&self) -> bool {
        self.customisation_open
    }

    pub fn color_value(&self, field: &str) -> Option<&str> {
        self.color_values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Picker settings received at load, if any.
    pub fn picker(&self) -> Option<&PickerConfig> {
        self.picker.as_ref()
    }

    pub fn preview_source(&self) -> Option<&str> {
        self.preview_source.as_deref()
    }

    /// Number of times an image load was started.
    pub fn preview_loads(&self) -> usize {
        self.preview_loads
    }

    pub fn snippet_html(&self) -> &str {
        &self.snippet_html
    }

    pub fn label(&self, trigger: &str) -> Option<&str> {
        self.trigger_labels.get(trigger).map(String::as_str)
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.trigger_labels
    }

    /// Every `(trigger, label)` write, oldest first.
    pub fn label_history(&self) -> &[(String, String)] {
        &self.label_history
    }

    pub fn selection_clears(&self) -> usize {
        self.selection_clears
    }

    pub fn times(&self) -> &[Option<String>] {
        &self.times
    }
}

impl Surface for HeadlessPage {
    fn set_button_active(&mut self, group: usize, button: usize, active: bool) {
        if let Some(flag) = self.active.get_mut(group).and_then(|g| g.get_mut(button)) {
            *flag = active;
        }
    }

    fn set_customisation_open(&mut self, open: bool) {
        self.customisation_open = open;
    }

    fn set_color_value(&mut self, field: &str, value: &str) {
        match self.color_values.iter_mut().find(|(name, _)| name == field) {
            Some((_, current)) => *current = value.to_string(),
            None => self
                .color_values
                .push((field.to_string(), value.to_string())),
        }
    }

    fn configure_picker(&mut self, config: &PickerConfig) {
        self.picker = Some(config.clone());
    }

    fn set_preview_source(&mut self, url: &str) {
        self.preview_source = Some(url.to_string());
        self.preview_loads += 1;
    }

    fn set_snippet_text(&mut self, text: &str) {
        self.snippet_text = text.to_string();
    }

    fn snippet_text(&self) -> String {
        self.snippet_text.clone()
    }

    fn set_snippet_html(&mut self, html: &str) {
        self.snippet_html = html.to_string();
    }

    fn trigger_label(&self, trigger: &str) -> Option<String> {
        self.trigger_labels.get(trigger).cloned()
    }

    fn set_trigger_label(&mut self, trigger: &str, label: &str) {
        if let Some(current) = self.trigger_labels.get_mut(trigger) {
            *current = label.to_string();
            self.label_history
                .push((trigger.to_string(), label.to_string()));
        }
    }

    fn clear_selection(&mut self) {
        self.selection_clears += 1;
    }

    fn set_time_text(&mut self, index: usize, text: &str) {
        if let Some(slot) = self.times.get_mut(index) {
            *slot = Some(text.to_string());
        }
    }
}
