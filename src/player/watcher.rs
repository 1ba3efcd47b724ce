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

//! The status refresh loop.
//!
//! Three threads cooperate over one channel: an idle watcher holding its own
//! MPD connection, a ticker that keeps the shared connection alive, and a
//! consumer that repaints the panel. The main loop pushes
//! [`Refresh::Shutdown`] when it exits; the producers notice the closed
//! channel on their next send and stop.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use mpd::idle::{Idle, Subsystem};

use crate::components::panel::StatusView;
use crate::player::Session;

/// Keep-alive period; MPD drops idle clients that never check in.
const PING_INTERVAL: Duration = Duration::from_secs(5);
/// Delay before redialing a failed watcher connection.
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum Refresh {
    /// Player state changed; repaint the panel.
    Changed,
    /// Keep-alive tick; ping the shared connection.
    Tick,
    /// The main loop is done.
    Shutdown,
}

/// Spawns the watcher, ticker and render threads and paints the panel once.
/// Returns the channel the main loop uses to signal shutdown.
pub fn spawn(session: Session, view: Arc<Mutex<StatusView>>) -> Sender<Refresh> {
    let (tx, rx) = mpsc::channel();

    let idle_tx = tx.clone();
    let idle_session = session.clone();
    thread::spawn(move || idle_loop(&idle_session, &idle_tx));

    let tick_tx = tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(PING_INTERVAL);
            if tick_tx.send(Refresh::Tick).is_err() {
                return;
            }
        }
    });

    thread::spawn(move || {
        if let Err(err) = view.lock().unwrap().render(&session) {
            log::warn!("initial render failed: {err:#}");
        }
        while let Ok(refresh) = rx.recv() {
            match refresh {
                Refresh::Changed => {
                    if let Err(err) = view.lock().unwrap().render(&session) {
                        log::warn!("render failed: {err:#}");
                    }
                }
                Refresh::Tick => {
                    if let Err(err) = session.ping() {
                        log::warn!("keep-alive ping failed: {err:#}");
                    }
                }
                Refresh::Shutdown => break,
            }
        }
    });

    tx
}

/// Watches the player over a dedicated connection and reports changes.
fn idle_loop(session: &Session, tx: &Sender<Refresh>) {
    loop {
        let mut client = match session.connect_again() {
            Ok(client) => client,
            Err(err) => {
                log::warn!("watcher connection failed: {err:#}");
                thread::sleep(RETRY_DELAY);
                continue;
            }
        };
        log::info!("watching the player for changes");
        loop {
            match client.wait(&[]) {
                Ok(subsystems) => {
                    if queue_only(&subsystems) {
                        continue;
                    }
                    if tx.send(Refresh::Changed).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    log::warn!("watcher lost the player: {err}");
                    break;
                }
            }
        }
        thread::sleep(RETRY_DELAY);
    }
}

/// True when a notification round reports nothing but edits to the current
/// queue (the `playlist` subsystem). Those alone do not repaint the panel;
/// a playlist editing session would flicker it on every change.
fn queue_only(subsystems: &[Subsystem]) -> bool {
    !subsystems.is_empty() && subsystems.iter().all(|s| *s == Subsystem::Playlist)
}
