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

//! The playlist editor window.
//!
//! Shows the current queue one line per song and treats the body text as an
//! editable serialization of it: WriteBack keeps every queue id still
//! present as some line's leading token and deletes the rest, then redraws
//! from the player's authoritative state. Deleting a line of text and
//! writing back is how songs are removed.

use std::collections::HashSet;
use std::thread;

use anyhow::Result;

use crate::acme::{Fsys, Win};
use crate::actions::{self, PlaylistAction};
use crate::player::Session;
use crate::util::format;

/// Runs a playlist editor window on its own thread; failures end up in the
/// log.
pub fn spawn(fsys: Fsys, session: Session) {
    thread::spawn(move || {
        if let Err(err) = run(&fsys, &session) {
            log::warn!("playlist window failed: {err:#}");
        }
    });
}

fn run(fsys: &Fsys, session: &Session) -> Result<()> {
    let mut win = fsys.new_window()?;
    win.name("/mpd/CurrentPlaylist")?;
    win.clean()?;
    win.write_tag("Clear Reload WriteBack SavePlaylist")?;
    populate(&mut win, session)?;

    let mut events = win.events()?;
    loop {
        let event = match events.read_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => {
                log::warn!("playlist event stream ended: {err}");
                break;
            }
        };
        if event.is_execute() {
            match PlaylistAction::parse(&event.text) {
                Some(PlaylistAction::Del) => {
                    win.del()?;
                    break;
                }
                Some(PlaylistAction::Clear) => {
                    win.clear()?;
                    if let Err(err) = session.clear_queue() {
                        win.err(&format!("Couldn't clear the queue: {err:#}"))?;
                    }
                    win.clean()?;
                }
                Some(PlaylistAction::Reload) => populate(&mut win, session)?,
                Some(PlaylistAction::WriteBack) => write_back(&mut win, session)?,
                Some(PlaylistAction::Save(args)) => match actions::save_target(&args) {
                    Some(name) => {
                        if let Err(err) = session.save_playlist(name) {
                            win.err(&format!("Couldn't save playlist {name}: {err:#}"))?;
                        }
                    }
                    None => win.err("SavePlaylist requires exactly one playlist name")?,
                },
                None => events.write_event(&event)?,
            }
        } else if event.is_look() {
            win.clean()?;
        }
    }
    Ok(())
}

/// Redraws the body from the current queue, discarding any edits.
fn populate(win: &mut Win, session: &Session) -> Result<()> {
    win.clear()?;
    let songs = match session.queue() {
        Ok(songs) => songs,
        Err(err) => {
            win.write_body(&format!("Couldn't fetch the queue: {err:#}"))?;
            return Ok(());
        }
    };
    let mut contents = String::new();
    for song in &songs {
        if let Some(place) = &song.place {
            contents.push_str(&format::queue_line(place.id.0, song));
        }
    }
    win.write_body(&contents)?;
    win.clean()?;
    Ok(())
}

/// Deletes every queued song whose id no longer leads a body line, then
/// redraws from the queue.
fn write_back(win: &mut Win, session: &Session) -> Result<()> {
    let songs = match session.queue() {
        Ok(songs) => songs,
        Err(err) => {
            win.err(&format!("Couldn't fetch the queue: {err:#}"))?;
            return Ok(());
        }
    };
    let body = match win.read_body() {
        Ok(body) => body,
        Err(err) => {
            win.err(&format!("Can't read the playlist body: {err}"))?;
            return Ok(());
        }
    };
    let ids: Vec<u32> = songs
        .iter()
        .filter_map(|song| song.place.as_ref().map(|place| place.id.0))
        .collect();
    for id in stale_ids(&ids, &body) {
        if let Err(err) = session.delete_id(id) {
            win.err(&format!("Couldn't delete song {id}: {err:#}"))?;
        }
    }
    populate(win, session)
}

/// Queue ids absent from the leading tokens of `body`'s lines. A line
/// protects an id only when its first whitespace-delimited token is exactly
/// that id's decimal form; anything else protects nothing.
fn stale_ids(queue: &[u32], body: &str) -> Vec<u32> {
    let surviving: HashSet<&str> = body
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    queue
        .iter()
        .copied()
        .filter(|id| !surviving.contains(id.to_string().as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_every_id_still_listed() {
        let stale = stale_ids(&[1, 3, 5, 7], "3 A - T [Alb]\n7 B - U [Alb2]");
        assert_eq!(stale, vec![1, 5]);
    }

    #[test]
    fn line_order_does_not_matter() {
        let stale = stale_ids(&[1, 3, 5, 7], "7 B - U [Alb2]\n3 A - T [Alb]");
        assert_eq!(stale, vec![1, 5]);
    }

    #[test]
    fn unparseable_tokens_protect_nothing() {
        let stale = stale_ids(&[3, 5], "x3 A - T [Alb]\n\n  5 B - U [Alb2]");
        assert_eq!(stale, vec![3]);
    }

    #[test]
    fn empty_body_deletes_everything() {
        assert_eq!(stale_ids(&[2, 4], ""), vec![2, 4]);
    }

    #[test]
    fn full_body_deletes_nothing() {
        let body = "2 A - T [Alb]\n4 B - U [Alb2]\n";
        assert!(stale_ids(&[2, 4], body).is_empty());
    }
}
