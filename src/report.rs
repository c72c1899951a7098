//! Serializable snapshot of a headless session.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::colors::ColorField;
use crate::config::PickerConfig;
use crate::controller::Controller;
use crate::surface::HeadlessPage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub variant: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
    pub highlighted: String,
    /// Active button label per group (`None` until a button is clicked)
    pub active: BTreeMap<String, Option<String>>,
    pub colors: Vec<ColorField>,
    pub triggers: BTreeMap<String, String>,
    pub customisation_open: bool,
    /// Picker settings the page received at load
    pub picker: Option<PickerConfig>,
    pub times: Vec<Option<String>>,
    pub preview_loads: usize,
    pub elapsed_ms: u64,
}

impl SessionReport {
    pub fn capture(controller: &Controller<HeadlessPage>) -> Self {
        let page = controller.surface();
        let (variant, state) = match controller.current() {
            Some((variant, state)) => (Some(variant.to_string()), Some(state)),
            None => (None, None),
        };

        let active = controller
            .selection()
            .groups()
            .iter()
            .map(|g| (g.name.clone(), g.active_button().map(|b| b.label.clone())))
            .collect();

        Self {
            variant,
            url: state.map(|s| s.url.clone()),
            snippet: state.map(|s| s.snippet.clone()),
            highlighted: page.snippet_html().to_string(),
            active,
            colors: controller.colors().fields().to_vec(),
            triggers: page.labels().clone(),
            customisation_open: page.customisation_open(),
            picker: page.picker().cloned(),
            times: page.times().to_vec(),
            preview_loads: page.preview_loads(),
            elapsed_ms: controller.now().as_millis() as u64,
        }
    }

    /// Line-oriented rendering; omits the highlighted markup.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "variant: {}", self.variant.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "url: {}", self.url.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "snippet: {}", self.snippet.as_deref().unwrap_or("-"));
        for (group, label) in &self.active {
            let _ = writeln!(out, "group {}: {}", group, label.as_deref().unwrap_or("-"));
        }
        for field in &self.colors {
            let _ = writeln!(out, "color {}: {}", field.name, field.value);
        }
        for (trigger, label) in &self.triggers {
            let _ = writeln!(out, "trigger {}: {}", trigger, label);
        }
        let _ = writeln!(
            out,
            "customisation: {}",
            if self.customisation_open { "open" } else { "closed" }
        );
        if let Some(picker) = &self.picker {
            let _ = writeln!(
                out,
                "picker: {} {} alpha={} close={}",
                picker.theme, picker.format, picker.alpha, picker.close_label
            );
        }
        for time in self.times.iter().flatten() {
            let _ = writeln!(out, "time: {}", time);
        }
        let _ = writeln!(out, "preview loads: {}", self.preview_loads);
        out
    }
}
