// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # MPD control panel for the acme editor.
//!
//! A remote-control surface for an MPD server, rendered as acme windows:
//! playback status and transport buttons in a main panel, library search
//! results in one secondary window, and the current queue as editable text
//! in another.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns the control window and translates execute
//!   clicks into player commands.
//! * A **Status Watcher** holds a second MPD connection, reporting player
//!   changes to a refresh loop that repaints the panel and keeps the shared
//!   connection alive with periodic pings.
//! * **Secondary Windows** (library search, playlist editor) each run their
//!   own event loop on a background thread against the shared session.
//!
//! ## Architecture
//!
//! Communication between the loops is handled via `std::sync::mpsc`
//! channels; the panel window itself sits behind a mutex so the watcher's
//! repaints and the main loop's writes never interleave. The player is
//! authoritative for all durable state; windows only ever hold ephemeral
//! projections of it.

pub mod acme;
pub mod actions;
pub mod components;
pub mod config;
pub mod player;
pub mod util;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::acme::Fsys;
use crate::config::AppConfig;
use crate::player::{Session, watcher};

/// Connects both services and runs the panel until its window is deleted.
///
/// # Errors
///
/// Returns an error if either connection cannot be established or the panel
/// window cannot be created; later per-call failures are reported inline in
/// the windows and do not end the program.
pub fn run(config: &AppConfig) -> Result<()> {
    let session = Session::connect(&config.server, config.password.as_deref())?;
    let fsys = match &config.namespace {
        Some(dir) => Fsys::at(PathBuf::from(dir).join("acme")),
        None => Fsys::attach(),
    }
    .context("Failed to attach to the editor")?;

    let (view, events) =
        components::panel::open(&fsys).context("Failed to create the control window")?;
    let view = Arc::new(Mutex::new(view));
    let refresh_tx = watcher::spawn(session.clone(), Arc::clone(&view));

    components::panel::run(&view, events, &session, &fsys, &refresh_tx)
}
