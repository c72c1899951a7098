//! Events and the table routing each event kind to its controller handler.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::controller::{Controller, ControllerError};
use crate::surface::Surface;

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Page finished loading
    Load,
    /// A button inside a group was clicked (button by variant or label)
    Click { group: String, button: String },
    /// A color input committed a new value
    ColorChange { field: String, value: String },
    /// The copy capability reported success for a trigger
    CopySuccess { trigger: String },
    /// Session time moved forward
    Elapsed(Duration),
}

/// Event source category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Load,
    Click,
    ColorChange,
    CopySuccess,
    Elapsed,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Load => EventKind::Load,
            Self::Click { .. } => EventKind::Click,
            Self::ColorChange { .. } => EventKind::ColorChange,
            Self::CopySuccess { .. } => EventKind::CopySuccess,
            Self::Elapsed(_) => EventKind::Elapsed,
        }
    }
}

/// Error for malformed event specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParseError(String);

impl fmt::Display for EventParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (expected load, click:<group>/<button>, color:<field>=<value>, copy:<trigger> or wait:<ms>)",
            self.0
        )
    }
}

impl std::error::Error for EventParseError {}

impl FromStr for Event {
    type Err = EventParseError;

    /// Parse the textual form used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "load" {
            return Ok(Self::Load);
        }
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| EventParseError(format!("invalid event '{s}'")))?;
        match kind {
            "click" => {
                let (group, button) = rest
                    .split_once('/')
                    .filter(|(g, b)| !g.is_empty() && !b.is_empty())
                    .ok_or_else(|| EventParseError(format!("invalid click '{rest}'")))?;
                Ok(Self::Click {
                    group: group.to_string(),
                    button: button.to_string(),
                })
            }
            "color" => {
                let (field, value) = rest
                    .split_once('=')
                    .filter(|(f, _)| !f.is_empty())
                    .ok_or_else(|| EventParseError(format!("invalid color change '{rest}'")))?;
                Ok(Self::ColorChange {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            "copy" if !rest.is_empty() => Ok(Self::CopySuccess {
                trigger: rest.to_string(),
            }),
            "wait" => rest
                .parse::<u64>()
                .map(|ms| Self::Elapsed(Duration::from_millis(ms)))
                .map_err(|_| EventParseError(format!("invalid wait '{rest}'"))),
            _ => Err(EventParseError(format!("invalid event '{s}'"))),
        }
    }
}

/// Handler invoked for one event kind.
pub type Handler<S> = fn(&mut Controller<S>, &Event) -> Result<(), ControllerError>;

/// Explicit (event kind -> handler) routes, built once per controller.
pub struct DispatchTable<S> {
    routes: Vec<(EventKind, Handler<S>)>,
}

impl<S: Surface> DispatchTable<S> {
    /// The routes every page uses.
    pub fn standard() -> Self {
        Self {
            routes: vec![
                (EventKind::Load, Controller::<S>::handle_load as Handler<S>),
                (EventKind::Click, Controller::<S>::handle_click as Handler<S>),
                (EventKind::ColorChange, Controller::<S>::handle_color_change as Handler<S>),
                (EventKind::CopySuccess, Controller::<S>::handle_copy_success as Handler<S>),
                (EventKind::Elapsed, Controller::<S>::handle_elapsed as Handler<S>),
            ],
        }
    }

    pub fn handler(&self, kind: EventKind) -> Option<Handler<S>> {
        self.routes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handler)| *handler)
    }

    /// Routed event kinds, in table order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.routes.iter().map(|(kind, _)| *kind).collect()
    }
}
