//! Customization controller for star-chart badges.
//!
//! A page offers preset variants and a custom palette. The controller keeps the
//! active variant per button group, persists every color field, rebuilds the
//! preview URL and embed snippet from scratch on each change and shows a
//! transient confirmation when the snippet is copied.
//!
//! All host interaction goes through [`surface::Surface`],
//! [`storage::Storage`], [`highlighting::Highlight`] and
//! [`relative_time::RelativeTime`]. [`surface::HeadlessPage`] records writes
//! for tests and the CLI; the `web` feature binds the same controller to the DOM.

pub mod cli;
pub mod colors;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod feedback;
pub mod highlighting;
pub mod logging;
pub mod preview;
pub mod relative_time;
pub mod report;
pub mod selection;
pub mod snippet;
pub mod storage;
pub mod surface;
#[cfg(feature = "web")]
pub mod web;
