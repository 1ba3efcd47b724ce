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

//! The library search window.
//!
//! Spawned from a look click on the panel. The query's first word may scope
//! the search to one tag; otherwise artist, title and album are searched in
//! turn and shown as one numbered list. Looking at result lines enqueues
//! the songs they name.

use std::thread;

use anyhow::Result;
use mpd::Song;

use crate::acme::{Fsys, Win};
use crate::actions::{self, SearchScope};
use crate::player::Session;
use crate::util::format;

/// Runs a search window on its own thread; failures end up in the log.
pub fn spawn(fsys: Fsys, session: Session, query: String) {
    thread::spawn(move || {
        if let Err(err) = run(&fsys, &session, &query) {
            log::warn!("search window failed: {err:#}");
        }
    });
}

fn run(fsys: &Fsys, session: &Session, query: &str) -> Result<()> {
    let Some(scope) = SearchScope::parse(query) else {
        return Ok(());
    };
    let mut win = fsys.new_window()?;
    win.name("/mpd/Search")?;
    win.clean()?;

    let songs = match session.search(&scope) {
        Ok(songs) => songs,
        Err(err) => {
            win.write_body(&format!("{err:#}\n"))?;
            return Ok(());
        }
    };
    let mut contents = String::new();
    for (index, song) in songs.iter().enumerate() {
        contents.push_str(&format::search_line(index, song));
    }
    win.write_body(&contents)?;
    win.clean()?;

    let mut events = win.events()?;
    loop {
        let event = match events.read_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => {
                log::warn!("search event stream ended: {err}");
                break;
            }
        };
        if event.is_execute() {
            if event.text.trim() == "Del" {
                win.del()?;
                break;
            }
            events.write_event(&event)?;
        } else if event.is_look() {
            win.clean()?;
            let picked = if event.text.is_empty() {
                win.selection()?
            } else {
                event.text.clone()
            };
            if !enqueue_picked(&mut win, session, &songs, &picked)? {
                // The indices no longer match what this window shows; close
                // it rather than guess.
                win.del()?;
                break;
            }
        }
    }
    Ok(())
}

/// Enqueues the songs named by leading index tokens in `picked`, line by
/// line and in order, skipping lines without one. Returns false when an
/// out-of-range index cut the selection short; everything before it has
/// already been queued.
fn enqueue_picked(
    win: &mut Win,
    session: &Session,
    songs: &[Song],
    picked: &str,
) -> Result<bool> {
    let (indices, cut_short) = picked_indices(picked, songs.len());
    for index in indices {
        let song = &songs[index];
        if let Err(err) = session.enqueue(&song.file) {
            win.err(&format!("Couldn't enqueue {}: {err:#}", song.file))?;
        }
    }
    Ok(!cut_short)
}

/// Result indices named by the leading tokens of `picked`'s lines, in line
/// order, stopping at the first index outside `0..count`. Lines without a
/// parseable token are skipped. Also reports whether an out-of-range index
/// cut the selection short.
fn picked_indices(picked: &str, count: usize) -> (Vec<usize>, bool) {
    let mut indices = Vec::new();
    for line in picked.lines() {
        let Some(index) = actions::line_index(line) else {
            continue;
        };
        if index < 0 || index as usize >= count {
            return (indices, true);
        }
        indices.push(index as usize);
    }
    (indices, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_lines_map_to_their_songs() {
        let picked = "0/ A - T [X]\n2/ B - U [Y]\n";
        assert_eq!(picked_indices(picked, 3), (vec![0, 2], false));
    }

    #[test]
    fn unparseable_lines_are_skipped() {
        let picked = "not a result\n1/ B - U [Y]\n";
        assert_eq!(picked_indices(picked, 2), (vec![1], false));
    }

    #[test]
    fn out_of_range_cuts_the_selection_short() {
        assert_eq!(picked_indices("3/ A - T [X]", 3), (vec![], true));
        assert_eq!(picked_indices("-1/ A - T [X]", 3), (vec![], true));
        // Lines before the bad index still count.
        assert_eq!(picked_indices("1/ A - T [X]\n9/ B - U [Y]", 3), (vec![1], true));
    }

    #[test]
    fn empty_selection_enqueues_nothing() {
        assert_eq!(picked_indices("", 3), (vec![], false));
    }
}
