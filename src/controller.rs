//! The customization controller: wires selection, colors, preview and feedback
//! to a surface through the dispatch table.

use std::time::Duration;

use crate::colors::ColorStore;
use crate::config::{ConfigError, PageConfig, PickerConfig};
use crate::dispatch::{DispatchTable, Event, EventKind};
use crate::feedback::FeedbackPresenter;
use crate::highlighting::Highlight;
use crate::preview::{PreviewBuilder, PreviewState};
use crate::relative_time::RelativeTime;
use crate::selection::{SelectionTracker, Variant};
use crate::storage::{Storage, StorageError};
use crate::surface::Surface;

/// Error type for event handling.
#[derive(Debug)]
pub enum ControllerError {
    /// Persisting a color failed
    Storage(StorageError),
    /// No group with this name
    UnknownGroup(String),
    /// No button with this variant or label in the group
    UnknownButton { group: String, button: String },
    /// No color field with this name
    UnknownField(String),
    /// No copy trigger with this id
    UnknownTrigger(String),
    /// An event other than `Load` arrived before the page loaded
    NotLoaded(EventKind),
    /// The dispatch table has no handler for this kind
    Unrouted(EventKind),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "{}", e),
            Self::UnknownGroup(group) => write!(f, "Unknown button group '{}'", group),
            Self::UnknownButton { group, button } => {
                write!(f, "Unknown button '{}' in group '{}'", button, group)
            }
            Self::UnknownField(field) => write!(f, "Unknown color field '{}'", field),
            Self::UnknownTrigger(trigger) => write!(f, "Unknown copy trigger '{}'", trigger),
            Self::NotLoaded(kind) => write!(f, "{:?} event before page load", kind),
            Self::Unrouted(kind) => write!(f, "No handler for {:?} events", kind),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<StorageError> for ControllerError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Host capabilities the controller consumes.
pub struct Capabilities {
    pub storage: Box<dyn Storage>,
    pub highlighter: Box<dyn Highlight>,
    pub relative_time: Box<dyn RelativeTime>,
}

pub struct Controller<S> {
    surface: S,
    storage: Box<dyn Storage>,
    relative_time: Box<dyn RelativeTime>,
    selection: SelectionTracker,
    colors: ColorStore,
    preview: PreviewBuilder,
    feedback: FeedbackPresenter,
    times: Vec<String>,
    picker: PickerConfig,
    initial_variant: Variant,
    current: Option<(Variant, PreviewState)>,
    now: Duration,
    loaded: bool,
    routes: DispatchTable<S>,
}

impl<S: Surface> Controller<S> {
    /// Build a controller for `config`, failing fast on missing singletons.
    pub fn new(config: &PageConfig, surface: S, capabilities: Capabilities) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolved = config.resolve()?;

        Ok(Self {
            surface,
            storage: capabilities.storage,
            relative_time: capabilities.relative_time,
            selection: SelectionTracker::from_config(&config.groups),
            colors: ColorStore::from_config(&config.colors),
            preview: PreviewBuilder::new(&resolved),
            feedback: FeedbackPresenter::new(&config.feedback, capabilities.highlighter),
            times: config.times.iter().map(|t| t.datetime.clone()).collect(),
            picker: config.picker.clone(),
            initial_variant: Variant::parse(&config.preview.initial_variant),
            current: None,
            now: Duration::ZERO,
            loaded: false,
            routes: DispatchTable::standard(),
        })
    }

    /// Route `event` through the dispatch table.
    pub fn dispatch(&mut self, event: &Event) -> Result<(), ControllerError> {
        let kind = event.kind();
        if !self.loaded && kind != EventKind::Load {
            return Err(ControllerError::NotLoaded(kind));
        }
        let handler = self
            .routes
            .handler(kind)
            .ok_or(ControllerError::Unrouted(kind))?;
        handler(self, event)
    }

    /// Rebuild the preview for `variant` and push it to the surface.
    ///
    /// Starts exactly one image load and re-highlights the new snippet.
    pub fn recompute(&mut self, variant: Variant) -> &PreviewState {
        let state = self.preview.recompute(&variant, &self.colors);
        tracing::debug!(variant = %variant, url = %state.url, "preview recomputed");

        self.surface.set_preview_source(&state.url);
        self.surface.set_snippet_text(&state.snippet);
        self.feedback.highlight(&mut self.surface);

        &self.current.insert((variant, state)).1
    }

    pub(crate) fn handle_load(&mut self, _event: &Event) -> Result<(), ControllerError> {
        if self.loaded {
            tracing::warn!("ignoring repeated load event");
            return Ok(());
        }

        let restored = self.colors.initialize(&*self.storage);
        for field in self.colors.fields() {
            self.surface.set_color_value(&field.name, &field.value);
        }
        self.surface.configure_picker(&self.picker);

        for (index, datetime) in self.times.iter().enumerate() {
            match self.relative_time.render(datetime) {
                Some(text) => self.surface.set_time_text(index, &text),
                None => tracing::warn!(datetime = %datetime, "unparseable time marker"),
            }
        }

        self.loaded = true;
        let initial = self.initial_variant.clone();
        self.recompute(initial);
        tracing::info!(
            restored,
            groups = self.selection.groups().len(),
            colors = self.colors.fields().len(),
            "page loaded"
        );
        Ok(())
    }

    pub(crate) fn handle_click(&mut self, event: &Event) -> Result<(), ControllerError> {
        let Event::Click { group, button } = event else {
            return Ok(());
        };
        let (g, b) = self.selection.locate(group, button).ok_or_else(|| {
            match self.selection.group_index(group) {
                Some(_) => ControllerError::UnknownButton {
                    group: group.clone(),
                    button: button.clone(),
                },
                None => ControllerError::UnknownGroup(group.clone()),
            }
        })?;
        let selected = self
            .selection
            .select(g, b)
            .ok_or_else(|| ControllerError::UnknownGroup(group.clone()))?;

        let count = self.selection.groups()[g].buttons().len();
        for i in 0..count {
            self.surface.set_button_active(g, i, false);
        }
        self.surface.set_button_active(g, b, true);

        if selected.drives_preview {
            self.surface
                .set_customisation_open(selected.variant.is_custom());
            self.recompute(selected.variant);
        }
        Ok(())
    }

    pub(crate) fn handle_color_change(&mut self, event: &Event) -> Result<(), ControllerError> {
        let Event::ColorChange { field, value } = event else {
            return Ok(());
        };
        self.colors.set(field, value, &mut *self.storage)?;
        self.surface.set_color_value(field, value);
        self.recompute(Variant::Custom);
        Ok(())
    }

    pub(crate) fn handle_copy_success(&mut self, event: &Event) -> Result<(), ControllerError> {
        let Event::CopySuccess { trigger } = event else {
            return Ok(());
        };
        self.feedback
            .on_copy_success(trigger, self.now, &mut self.surface)
    }

    pub(crate) fn handle_elapsed(&mut self, event: &Event) -> Result<(), ControllerError> {
        let Event::Elapsed(delta) = event else {
            return Ok(());
        };
        self.now += *delta;
        self.feedback.advance(self.now, &mut self.surface);
        Ok(())
    }

    /// Advance session time to `elapsed`, a wall-clock offset since load.
    /// Earlier offsets are ignored.
    pub fn catch_up(&mut self, elapsed: Duration) -> Result<(), ControllerError> {
        match elapsed.checked_sub(self.now) {
            Some(delta) if !delta.is_zero() => self.dispatch(&Event::Elapsed(delta)),
            _ => Ok(()),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn colors(&self) -> &ColorStore {
        &self.colors
    }

    pub fn feedback(&self) -> &FeedbackPresenter {
        &self.feedback
    }

    /// Variant and preview of the last recompute.
    pub fn current(&self) -> Option<(&Variant, &PreviewState)> {
        self.current.as_ref().map(|(v, s)| (v, s))
    }

    /// Session time since load.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Routed event kinds, for auditing the dispatch surface.
    pub fn routes(&self) -> Vec<EventKind> {
        self.routes.kinds()
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
