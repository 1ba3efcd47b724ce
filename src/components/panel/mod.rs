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

//! The main control window.
//!
//! Owns the `/mpd/` window: execute clicks become transport commands, look
//! clicks open a search window, and the status watcher repaints the body
//! through [`StatusView`] whenever the player reports a change.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use mpd::State;

use crate::acme::{EventReader, Fsys, Win};
use crate::actions::PanelAction;
use crate::components::{playlist, search};
use crate::player::Session;
use crate::player::watcher::Refresh;
use crate::util::format;

/// The panel window plus its render routine; shared between the main loop
/// and the refresh loop behind one mutex so repaints never interleave.
pub struct StatusView {
    win: Win,
}

/// Creates the panel window and splits off its event stream.
pub fn open(fsys: &Fsys) -> Result<(StatusView, EventReader)> {
    let mut win = fsys.new_window()?;
    win.name("/mpd/")?;
    win.write_tag("Prev Pause UnPause Play Next")?;
    win.clean()?;
    let events = win.events()?;
    Ok((StatusView { win }, events))
}

impl StatusView {
    /// Repaints the whole body from live player state. A failed query turns
    /// into a single inline error line; the next trigger retries.
    pub fn render(&mut self, session: &Session) -> Result<()> {
        self.win.clear()?;
        let status = match session.status() {
            Ok(status) => status,
            Err(err) => return self.render_error(&err),
        };
        let song = match session.current_song() {
            Ok(song) => song.unwrap_or_default(),
            Err(err) => return self.render_error(&err),
        };

        // Keep the transport controls at the top so they're always handy.
        let pause_label = if status.state == State::Pause {
            "UnPause"
        } else {
            "Pause"
        };
        let mut body = String::new();
        body.push_str(&format!("[Prev] [{pause_label}] [Play] [Next]\n"));
        body.push_str("[Random] [Repeat] [Playlist]\n");
        body.push_str(&format!(
            "{}: {} - {} (\"{}\")\n",
            format::state_label(status.state),
            format::artist(&song),
            format::title(&song),
            format::album(&song)
        ));
        body.push_str(&format!(
            "Random: {}, Repeat: {}\n",
            status.random, status.repeat
        ));
        self.win.write_body(&body)?;
        self.win.clean()?;
        Ok(())
    }

    fn render_error(&mut self, err: &anyhow::Error) -> Result<()> {
        self.win
            .write_body(&format!("Couldn't query the player: {err:#}\n"))?;
        Ok(())
    }

    pub(crate) fn win_mut(&mut self) -> &mut Win {
        &mut self.win
    }
}

/// Runs the main control loop until the panel window is deleted, then tells
/// the refresh loop to stop. Open secondary windows are left to process
/// teardown.
pub fn run(
    view: &Arc<Mutex<StatusView>>,
    mut events: EventReader,
    session: &Session,
    fsys: &Fsys,
    refresh_tx: &Sender<Refresh>,
) -> Result<()> {
    loop {
        let event = match events.read_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => {
                log::warn!("panel event stream ended: {err}");
                break;
            }
        };
        if event.is_execute() {
            match PanelAction::parse(&event.text) {
                Some(PanelAction::Del) => {
                    view.lock().unwrap().win_mut().del()?;
                    break;
                }
                Some(action) => {
                    if let Err(err) = dispatch(action, session, fsys) {
                        log::warn!("{action:?} failed: {err:#}");
                    }
                }
                None => {
                    // Not ours; let the editor run it.
                    events.write_event(&event)?;
                }
            }
        } else if event.is_look() {
            view.lock().unwrap().win_mut().clean()?;
            search::spawn(fsys.clone(), session.clone(), event.text.clone());
        }
    }
    let _ = refresh_tx.send(Refresh::Shutdown);
    Ok(())
}

fn dispatch(action: PanelAction, session: &Session, fsys: &Fsys) -> Result<()> {
    match action {
        PanelAction::Next => session.next(),
        PanelAction::Prev => session.prev(),
        PanelAction::Pause => session.pause(true),
        PanelAction::UnPause => session.pause(false),
        PanelAction::Play => session.play(),
        PanelAction::Random => session.toggle_random(),
        PanelAction::Repeat => session.toggle_repeat(),
        PanelAction::Playlist => {
            playlist::spawn(fsys.clone(), session.clone());
            Ok(())
        }
        // Handled by the loop itself.
        PanelAction::Del => Ok(()),
    }
}
