//! Application-level orchestration.
//!
//! This module owns the run lifecycle (start/pause/resume/finish) and the configuration
//! that may change between runs. UI/CLI layers talk to it through [`UiCommand`]s and
//! observe it through the event channel.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
