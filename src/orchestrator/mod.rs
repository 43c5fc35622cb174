//! Application-level orchestration utilities.
//!
//! This module owns run lifecycle control (start/restart/quit) and post-run
//! processing such as reporting and exports. UI/CLI layers call into this
//! module to keep responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, start_run, UiCommand};
pub(crate) use post_process::{process_run_completion, ExportTargets};
