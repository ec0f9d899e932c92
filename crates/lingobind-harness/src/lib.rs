#![forbid(unsafe_code)]

//! Test harness and reference fixtures for lingobind.
//!
//! # Role
//! The binding core never talks to a real translation engine or renderer.
//! This crate provides stand-ins for both so end-to-end scenarios can be
//! driven deterministically:
//!
//! - [`ScriptedEngine`] - per-locale key tables with `{{name}}`
//!   interpolation and explicit language-change / resource-added events.
//! - [`RecordingSite`] - a binding site that remembers what was displayed
//!   and which values arrived out of band.
//! - [`DiagnosticCapture`] - a `tracing` layer that collects events so
//!   tests can assert on diagnostics.

pub mod capture;
pub mod engine;
pub mod site;

pub use capture::{CapturedEvent, DiagnosticCapture, capture_events};
pub use engine::ScriptedEngine;
pub use site::RecordingSite;
