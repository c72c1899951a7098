//! Browser bindings (feature `web`): `localStorage`, the DOM as a [`Surface`]
//! and the [`mount`] entry point exported to JavaScript.
//!
//! ```js
//! const customizer = mount();
//! new ClipboardJS('.copy-btn').on('success', (e) => customizer.onCopySuccess(e.trigger));
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlInputElement, NodeList, Window};

use crate::config::{
    ButtonConfig, ColorConfig, ConfigError, GroupConfig, PageConfig, PickerConfig, TimeConfig,
    TriggerConfig,
};
use crate::controller::{Capabilities, Controller, ControllerError};
use crate::dispatch::Event;
use crate::highlighting::SyntectHighlighter;
use crate::relative_time::TimeAgo;
use crate::storage::{MemoryStorage, Storage, StorageError};
use crate::surface::Surface;

const GROUP_SELECTOR: &str = ".button-group";
const BUTTON_SELECTOR: &str = "button";
const COLOR_SELECTOR: &str = "[data-coloris]";
const PREVIEW_SELECTOR: &str = "#chart";
const CODE_SELECTOR: &str = ".code-block code";
const TEMPLATE_SELECTOR: &str = "#code-template";
const TRIGGER_SELECTOR: &str = ".copy-btn";
const PANEL_SELECTOR: &str = ".customisation";
const TIME_SELECTOR: &str = "time[datetime]";
const ACTIVE_CLASS: &str = "active";
const OPEN_CLASS: &str = "opened";
/// Global installed by the Coloris script.
const PICKER_GLOBAL: &str = "Coloris";

/// `window.localStorage`.
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// `None` when storage is disabled for the origin.
    pub fn from_window(window: &Window) -> Option<Self> {
        window
            .local_storage()
            .ok()
            .flatten()
            .map(|inner| Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}

/// Read the page description from the DOM's `data-*` attributes and markup.
pub fn discover(document: &Document) -> Result<PageConfig, ConfigError> {
    let preview = required(document, PREVIEW_SELECTOR)?;
    let base_url = preview
        .get_attribute("data-src")
        .ok_or(ConfigError::MissingField("#chart[data-src]"))?;
    let template = required(document, TEMPLATE_SELECTOR)?;

    let mut config = PageConfig::default();
    config.preview.base_url = Some(base_url);
    config.preview.snippet_template = Some(visible_text(&template));
    config.preview.origin = document.location().and_then(|l| l.origin().ok());

    config.groups = elements(document.query_selector_all(GROUP_SELECTOR))
        .iter()
        .enumerate()
        .map(|(i, group)| GroupConfig {
            name: identity(group, "group", i),
            drives_preview: true,
            buttons: elements(group.query_selector_all(BUTTON_SELECTOR))
                .iter()
                .map(|button| ButtonConfig {
                    label: button.text_content().unwrap_or_default().trim().to_string(),
                    variant: button.get_attribute("data-variant"),
                })
                .collect(),
        })
        .collect();

    config.colors = color_inputs(document)
        .iter()
        .map(|input| ColorConfig {
            name: input.name(),
            default: input.value(),
        })
        .collect();

    config.triggers = elements(document.query_selector_all(TRIGGER_SELECTOR))
        .iter()
        .enumerate()
        .map(|(i, trigger)| TriggerConfig {
            id: identity(trigger, "copy", i),
            label: visible_text(trigger),
        })
        .collect();

    config.times = elements(document.query_selector_all(TIME_SELECTOR))
        .iter()
        .filter_map(|t| t.get_attribute("datetime"))
        .map(|datetime| TimeConfig { datetime })
        .collect();

    Ok(config)
}

/// The live DOM, addressed the same way [`discover`] names things.
pub struct DomSurface {
    window: Window,
    groups: Vec<Vec<Element>>,
    panel: Option<Element>,
    color_inputs: Vec<HtmlInputElement>,
    preview: Element,
    code: Element,
    triggers: Vec<(String, Element)>,
    times: Vec<Element>,
}

impl DomSurface {
    pub fn attach(window: Window) -> Result<Self, ConfigError> {
        let document = window
            .document()
            .ok_or(ConfigError::MissingField("document"))?;

        let groups = elements(document.query_selector_all(GROUP_SELECTOR))
            .iter()
            .map(|g| elements(g.query_selector_all(BUTTON_SELECTOR)))
            .collect();
        let triggers = elements(document.query_selector_all(TRIGGER_SELECTOR))
            .into_iter()
            .enumerate()
            .map(|(i, t)| (identity(&t, "copy", i), t))
            .collect();

        Ok(Self {
            groups,
            panel: document.query_selector(PANEL_SELECTOR).ok().flatten(),
            color_inputs: color_inputs(&document),
            preview: required(&document, PREVIEW_SELECTOR)?,
            code: required(&document, CODE_SELECTOR)?,
            triggers,
            times: elements(document.query_selector_all(TIME_SELECTOR)),
            window,
        })
    }

    /// Identity of a `.copy-btn` element, as used in copy events.
    pub fn trigger_id(&self, element: &Element) -> Option<&str> {
        self.triggers
            .iter()
            .find(|(_, el)| el == element)
            .map(|(id, _)| id.as_str())
    }

    fn trigger(&self, id: &str) -> Option<&Element> {
        self.triggers
            .iter()
            .find(|(trigger, _)| trigger == id)
            .map(|(_, el)| el)
    }
}

impl Surface for DomSurface {
    fn set_button_active(&mut self, group: usize, button: usize, active: bool) {
        if let Some(el) = self.groups.get(group).and_then(|g| g.get(button)) {
            if let Err(e) = el.class_list().toggle_with_force(ACTIVE_CLASS, active) {
                tracing::warn!(error = ?e, group, button, "failed to toggle active button");
            }
        }
    }

    fn set_customisation_open(&mut self, open: bool) {
        if let Some(panel) = &self.panel {
            if let Err(e) = panel.class_list().toggle_with_force(OPEN_CLASS, open) {
                tracing::warn!(error = ?e, open, "failed to toggle customisation panel");
            }
        }
    }

    fn set_color_value(&mut self, field: &str, value: &str) {
        if let Some(input) = self.color_inputs.iter().find(|i| i.name() == field) {
            input.set_value(value);
        }
    }

    fn configure_picker(&mut self, config: &PickerConfig) {
        let options = config.widget_options();

        let picker = js_sys::Reflect::get(&self.window, &JsValue::from_str(PICKER_GLOBAL))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let Some(picker) = picker else {
            tracing::warn!("color picker script is not loaded; inputs stay plain");
            return;
        };
        let result = js_sys::JSON::parse(&options.to_string())
            .and_then(|options| picker.call1(&JsValue::NULL, &options));
        if let Err(e) = result {
            tracing::warn!(error = ?e, "failed to configure color picker");
        }
    }

    fn set_preview_source(&mut self, url: &str) {
        if let Err(e) = self.preview.set_attribute("src", url) {
            tracing::warn!(error = ?e, url, "failed to set preview source");
        }
    }

    fn set_snippet_text(&mut self, text: &str) {
        self.code.set_text_content(Some(text));
    }

    fn snippet_text(&self) -> String {
        self.code.text_content().unwrap_or_default()
    }

    fn set_snippet_html(&mut self, html: &str) {
        self.code.set_inner_html(html);
    }

    fn trigger_label(&self, trigger: &str) -> Option<String> {
        self.trigger(trigger).map(visible_text)
    }

    fn set_trigger_label(&mut self, trigger: &str, label: &str) {
        if let Some(el) = self.trigger(trigger) {
            match el.dyn_ref::<HtmlElement>() {
                Some(html) => html.set_inner_text(label),
                None => el.set_text_content(Some(label)),
            }
        }
    }

    fn clear_selection(&mut self) {
        match self.window.get_selection() {
            Ok(Some(selection)) => {
                if let Err(e) = selection.remove_all_ranges() {
                    tracing::warn!(error = ?e, "failed to clear text selection");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "text selection unavailable"),
        }
    }

    fn set_time_text(&mut self, index: usize, text: &str) {
        if let Some(el) = self.times.get(index) {
            el.set_text_content(Some(text));
        }
    }
}

/// Controller plus the wall clock that feeds its session time.
struct Session {
    controller: Controller<DomSurface>,
    window: Window,
    started_ms: f64,
    restore_after_ms: u64,
}

type Shared = Rc<RefCell<Session>>;

impl Session {
    /// Advance session time to the wall clock, firing due restores.
    fn sync_clock(&mut self) -> Result<(), ControllerError> {
        let elapsed = (js_sys::Date::now() - self.started_ms).max(0.0) as u64;
        self.controller.catch_up(Duration::from_millis(elapsed))
    }

    fn dispatch(&mut self, event: &Event) -> Result<(), ControllerError> {
        if self.controller.is_loaded() {
            self.sync_clock()?;
        }
        self.controller.dispatch(event)
    }
}

/// Handle returned by [`mount`]; listeners live as long as it does.
#[wasm_bindgen]
pub struct Customizer {
    session: Shared,
    _listeners: Vec<Closure<dyn FnMut(web_sys::Event)>>,
}

#[wasm_bindgen]
impl Customizer {
    /// Forward a clipboard success for a `.copy-btn` element and schedule
    /// the label restore.
    #[wasm_bindgen(js_name = onCopySuccess)]
    pub fn on_copy_success(&self, trigger: &Element) -> Result<(), JsValue> {
        let (event, window, delay) = {
            let session = self.session.try_borrow().map_err(to_js)?;
            let id = session
                .controller
                .surface()
                .trigger_id(trigger)
                .ok_or_else(|| JsValue::from_str("element is not a copy trigger"))?;
            let event = Event::CopySuccess {
                trigger: id.to_string(),
            };
            (event, session.window.clone(), session.restore_after_ms)
        };

        self.session
            .try_borrow_mut()
            .map_err(to_js)?
            .dispatch(&event)
            .map_err(to_js)?;
        schedule_restore(&self.session, &window, delay)
    }

    /// URL the preview image currently shows.
    #[wasm_bindgen(js_name = previewUrl)]
    pub fn preview_url(&self) -> Option<String> {
        let session = self.session.try_borrow().ok()?;
        session
            .controller
            .current()
            .map(|(_, state)| state.url.clone())
    }
}

/// Discover the page, load it and wire button clicks and color changes.
#[wasm_bindgen]
pub fn mount() -> Result<Customizer, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = discover(&document).map_err(to_js)?;
    let storage: Box<dyn Storage> = match LocalStorage::from_window(&window) {
        Some(storage) => Box::new(storage),
        None => {
            tracing::warn!("localStorage unavailable; colors will not persist");
            Box::new(MemoryStorage::new())
        }
    };
    let started_ms = js_sys::Date::now();
    let reference = DateTime::<Utc>::from_timestamp_millis(started_ms as i64).unwrap_or_default();
    let capabilities = Capabilities {
        storage,
        highlighter: Box::new(SyntectHighlighter::new(
            config.preview.snippet_language.clone(),
        )),
        relative_time: Box::new(TimeAgo::new(reference)),
    };

    let surface = DomSurface::attach(window.clone()).map_err(to_js)?;
    let controller = Controller::new(&config, surface, capabilities).map_err(to_js)?;
    let session = Rc::new(RefCell::new(Session {
        controller,
        window,
        started_ms,
        restore_after_ms: config.feedback.restore_after_ms,
    }));
    session
        .borrow_mut()
        .dispatch(&Event::Load)
        .map_err(to_js)?;

    let mut listeners = Vec::new();
    let groups = elements(document.query_selector_all(GROUP_SELECTOR));
    for (group_el, group) in groups.iter().zip(&config.groups) {
        let buttons = elements(group_el.query_selector_all(BUTTON_SELECTOR));
        for (button_el, button) in buttons.iter().zip(&group.buttons) {
            let click = Event::Click {
                group: group.name.clone(),
                button: button.variant.clone().unwrap_or_else(|| button.label.clone()),
            };
            listeners.push(listen(button_el, "click", &session, move |_| click.clone())?);
        }
    }
    for input in color_inputs(&document) {
        let field = input.name();
        let source = input.clone();
        listeners.push(listen(&input, "change", &session, move |_| {
            Event::ColorChange {
                field: field.clone(),
                value: source.value(),
            }
        })?);
    }

    tracing::info!(listeners = listeners.len(), "customizer mounted");
    Ok(Customizer {
        session,
        _listeners: listeners,
    })
}

fn listen(
    target: &EventTarget,
    kind: &str,
    session: &Shared,
    to_event: impl Fn(&web_sys::Event) -> Event + 'static,
) -> Result<Closure<dyn FnMut(web_sys::Event)>, JsValue> {
    let session = Rc::clone(session);
    let closure = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
        move |dom_event: web_sys::Event| {
            let event = to_event(&dom_event);
            let Ok(mut session) = session.try_borrow_mut() else {
                tracing::warn!(?event, "event dropped while another is running");
                return;
            };
            if let Err(e) = session.dispatch(&event) {
                tracing::warn!(error = %e, "event failed");
            }
        },
    ));
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

fn schedule_restore(session: &Shared, window: &Window, delay_ms: u64) -> Result<(), JsValue> {
    let session = Rc::clone(session);
    let callback = Closure::once_into_js(move || {
        let Ok(mut session) = session.try_borrow_mut() else {
            tracing::warn!("copy restore skipped while another event is running");
            return;
        };
        if let Err(e) = session.sync_clock() {
            tracing::warn!(error = %e, "copy restore failed");
        }
    });
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)?;
    Ok(())
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn required(document: &Document, selector: &'static str) -> Result<Element, ConfigError> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .ok_or(ConfigError::MissingField(selector))
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn color_inputs(document: &Document) -> Vec<HtmlInputElement> {
    elements(document.query_selector_all(COLOR_SELECTOR))
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

fn identity(el: &Element, prefix: &str, index: usize) -> String {
    let id = el.id();
    if id.is_empty() {
        format!("{prefix}-{index}")
    } else {
        id
    }
}

fn visible_text(el: &Element) -> String {
    match el.dyn_ref::<HtmlElement>() {
        Some(html) => html.inner_text(),
        None => el.text_content().unwrap_or_default(),
    }
}
