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

//! The shared MPD session.
//!
//! A [`Session`] wraps the one command connection behind a mutex and exposes
//! the handful of calls the windows need. The status watcher keeps its own
//! connection (see [`watcher`]) because `idle` parks whatever connection it
//! runs on.

pub mod watcher;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use mpd::{Client, Query, Song, Status, Term};

use crate::actions::SearchScope;

/// Cloneable handle on the player; every window loop holds one.
#[derive(Clone)]
pub struct Session {
    client: Arc<Mutex<Client>>,
    addr: String,
    password: Option<String>,
}

impl Session {
    /// Dials and authenticates the shared command connection.
    pub fn connect(addr: &str, password: Option<&str>) -> Result<Self> {
        let client = dial(addr, password)?;
        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            addr: addr.to_string(),
            password: password.map(str::to_owned),
        })
    }

    /// Dials a second connection with the same credentials, for the idle
    /// watcher.
    pub(crate) fn connect_again(&self) -> Result<Client> {
        dial(&self.addr, self.password.as_deref())
    }

    fn lock(&self) -> MutexGuard<'_, Client> {
        self.client.lock().unwrap()
    }

    pub fn status(&self) -> Result<Status> {
        Ok(self.lock().status()?)
    }

    pub fn current_song(&self) -> Result<Option<Song>> {
        Ok(self.lock().currentsong()?)
    }

    /// The current queue, in play order.
    pub fn queue(&self) -> Result<Vec<Song>> {
        Ok(self.lock().queue()?)
    }

    pub fn play(&self) -> Result<()> {
        Ok(self.lock().play()?)
    }

    pub fn pause(&self, pause: bool) -> Result<()> {
        Ok(self.lock().pause(pause)?)
    }

    pub fn next(&self) -> Result<()> {
        Ok(self.lock().next()?)
    }

    pub fn prev(&self) -> Result<()> {
        Ok(self.lock().prev()?)
    }

    pub fn ping(&self) -> Result<()> {
        Ok(self.lock().ping()?)
    }

    pub fn clear_queue(&self) -> Result<()> {
        Ok(self.lock().clear()?)
    }

    /// Flips random mode, reading the current state first.
    pub fn toggle_random(&self) -> Result<()> {
        let mut client = self.lock();
        let current = client.status()?.random;
        Ok(client.random(!current)?)
    }

    /// Flips repeat mode, reading the current state first.
    pub fn toggle_repeat(&self) -> Result<()> {
        let mut client = self.lock();
        let current = client.status()?.repeat;
        Ok(client.repeat(!current)?)
    }

    /// Appends a song to the queue by file path.
    pub fn enqueue(&self, path: &str) -> Result<()> {
        let song = Song {
            file: path.to_string(),
            ..Song::default()
        };
        self.lock().push(&song)?;
        Ok(())
    }

    /// Removes one song from the queue by its queue id.
    pub fn delete_id(&self, id: u32) -> Result<()> {
        Ok(self.lock().delete(mpd::song::Id(id))?)
    }

    /// Saves the current queue server-side under `name`.
    pub fn save_playlist(&self, name: &str) -> Result<()> {
        Ok(self.lock().save(name)?)
    }

    /// Runs the library searches a scope calls for. Broad scopes search
    /// artist, then title, then album, and keep that order in the combined
    /// result; duplicates across fields are not folded.
    pub fn search(&self, scope: &SearchScope) -> Result<Vec<Song>> {
        match scope {
            SearchScope::Field(field, term) => self.search_tag(field.tag(), term),
            SearchScope::Broad(query) => {
                let mut songs = self.search_tag("artist", query)?;
                songs.extend(self.search_tag("title", query)?);
                songs.extend(self.search_tag("album", query)?);
                Ok(songs)
            }
        }
    }

    fn search_tag(&self, tag: &str, term: &str) -> Result<Vec<Song>> {
        let mut query = Query::new();
        let query = query.and(Term::Tag(tag.into()), term);
        Ok(self.lock().search(query, None)?)
    }
}

fn dial(addr: &str, password: Option<&str>) -> Result<Client> {
    let mut client =
        Client::connect(addr).with_context(|| format!("Failed to connect to MPD at {addr}"))?;
    if let Some(password) = password {
        client.login(password).context("MPD password rejected")?;
    }
    Ok(client)
}
