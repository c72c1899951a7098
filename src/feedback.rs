//! Transient copy confirmation and snippet re-highlighting.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::FeedbackConfig;
use crate::controller::ControllerError;
use crate::highlighting::Highlight;
use crate::surface::Surface;

/// Captured label and pending restore for one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CopyFeedback {
    original: String,
    restore_at: Duration,
}

pub struct FeedbackPresenter {
    confirmation: String,
    restore_after: Duration,
    pending: BTreeMap<String, CopyFeedback>,
    highlighter: Box<dyn Highlight>,
}

impl FeedbackPresenter {
    pub fn new(config: &FeedbackConfig, highlighter: Box<dyn Highlight>) -> Self {
        Self {
            confirmation: config.confirmation.clone(),
            restore_after: Duration::from_millis(config.restore_after_ms),
            pending: BTreeMap::new(),
            highlighter,
        }
    }

    pub fn confirmation(&self) -> &str {
        &self.confirmation
    }

    /// Deadline of the pending restore for `trigger`, if any.
    pub fn pending_restore(&self, trigger: &str) -> Option<Duration> {
        self.pending.get(trigger).map(|p| p.restore_at)
    }

    /// Show the confirmation on `trigger` and (re)schedule the restore.
    ///
    /// A copy while a restore is pending replaces that restore and keeps the
    /// label captured by the first copy.
    pub fn on_copy_success(
        &mut self,
        trigger: &str,
        now: Duration,
        surface: &mut dyn Surface,
    ) -> Result<(), ControllerError> {
        surface.clear_selection();

        let original = match self.pending.remove(trigger) {
            Some(previous) => previous.original,
            None => surface
                .trigger_label(trigger)
                .ok_or_else(|| ControllerError::UnknownTrigger(trigger.to_string()))?,
        };

        surface.set_trigger_label(trigger, &self.confirmation);
        let restore_at = now + self.restore_after;
        tracing::debug!(trigger, restore_ms = restore_at.as_millis() as u64, "copy confirmed");
        self.pending.insert(
            trigger.to_string(),
            CopyFeedback {
                original,
                restore_at,
            },
        );
        Ok(())
    }

    /// Fire every restore due at `now`, earliest first. Returns how many fired.
    pub fn advance(&mut self, now: Duration, surface: &mut dyn Surface) -> usize {
        let mut due: Vec<(String, CopyFeedback)> = Vec::new();
        self.pending.retain(|trigger, feedback| {
            if feedback.restore_at <= now {
                due.push((trigger.clone(), feedback.clone()));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(_, feedback)| feedback.restore_at);

        for (trigger, feedback) in &due {
            surface.set_trigger_label(trigger, &feedback.original);
            tracing::debug!(trigger = %trigger, "copy label restored");
        }
        due.len()
    }

    /// Replace the snippet markup with a highlighted rendering of its text.
    ///
    /// Must run after the snippet text has been replaced.
    pub fn highlight(&self, surface: &mut dyn Surface) {
        let html = self.highlighter.highlight(&surface.snippet_text());
        surface.set_snippet_html(&html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PageConfig, TriggerConfig};
    use crate::highlighting::PlainText;
    use crate::surface::HeadlessPage;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn setup() -> (FeedbackPresenter, HeadlessPage) {
        let config = PageConfig {
            triggers: vec![
                TriggerConfig {
                    id: "snippet".into(),
                    label: "Copy".into(),
                },
                TriggerConfig {
                    id: "url".into(),
                    label: "Copy URL".into(),
                },
            ],
            ..Default::default()
        };
        let presenter = FeedbackPresenter::new(&FeedbackConfig::default(), Box::new(PlainText));
        (presenter, HeadlessPage::from_config(&config))
    }

    #[test]
    fn single_copy_restores_after_delay() {
        let (mut presenter, mut page) = setup();
        presenter.on_copy_success("snippet", ms(0), &mut page).unwrap();
        assert_eq!(page.label("snippet"), Some("Copied!"));
        assert_eq!(page.selection_clears(), 1);

        assert_eq!(presenter.advance(ms(999), &mut page), 0);
        assert_eq!(page.label("snippet"), Some("Copied!"));

        assert_eq!(presenter.advance(ms(1000), &mut page), 1);
        assert_eq!(page.label("snippet"), Some("Copy"));
        assert_eq!(presenter.pending_restore("snippet"), None);
    }

    #[test]
    fn rapid_copies_keep_original_label() {
        let (mut presenter, mut page) = setup();
        presenter.on_copy_success("snippet", ms(0), &mut page).unwrap();
        presenter.advance(ms(400), &mut page);
        presenter.on_copy_success("snippet", ms(400), &mut page).unwrap();
        assert_eq!(presenter.pending_restore("snippet"), Some(ms(1400)));

        assert_eq!(presenter.advance(ms(1000), &mut page), 0);
        assert_eq!(page.label("snippet"), Some("Copied!"));
        assert_eq!(presenter.advance(ms(1400), &mut page), 1);
        assert_eq!(page.label("snippet"), Some("Copy"));

        let restores = page
            .label_history()
            .iter()
            .filter(|(_, label)| label == "Copy")
            .count();
        assert_eq!(restores, 1);
    }

    #[test]
    fn triggers_are_independent() {
        let (mut presenter, mut page) = setup();
        presenter.on_copy_success("snippet", ms(0), &mut page).unwrap();
        presenter.on_copy_success("url", ms(500), &mut page).unwrap();

        assert_eq!(presenter.advance(ms(1000), &mut page), 1);
        assert_eq!(page.label("snippet"), Some("Copy"));
        assert_eq!(page.label("url"), Some("Copied!"));

        assert_eq!(presenter.advance(ms(1500), &mut page), 1);
        assert_eq!(page.label("url"), Some("Copy URL"));
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let (mut presenter, mut page) = setup();
        let err = presenter
            .on_copy_success("missing", ms(0), &mut page)
            .unwrap_err();
        assert!(matches!(err, ControllerError::UnknownTrigger(_)));
    }

    #[test]
    fn highlight_reads_current_text() {
        let (presenter, mut page) = setup();
        page.set_snippet_text("<b>");
        presenter.highlight(&mut page);
        assert_eq!(page.snippet_html(), "&lt;b&gt;");
        presenter.highlight(&mut page);
        assert_eq!(page.snippet_html(), "&lt;b&gt;");
    }
}
