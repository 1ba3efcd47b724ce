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

//! Song and status line formatting for the windows.

use mpd::{Song, State};

/// Looks up a tag value on a song, e.g. `Artist` or `Album`.
pub fn tag<'a>(song: &'a Song, name: &str) -> Option<&'a str> {
    song.tags
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

pub fn artist(song: &Song) -> &str {
    tag(song, "Artist").unwrap_or("")
}

pub fn album(song: &Song) -> &str {
    tag(song, "Album").unwrap_or("")
}

pub fn title(song: &Song) -> &str {
    song.title
        .as_deref()
        .or_else(|| tag(song, "Title"))
        .unwrap_or("")
}

/// One playlist editor line: `<id> <artist> - <title> [<album>]`.
pub fn queue_line(id: u32, song: &Song) -> String {
    format!("{} {} - {} [{}]\n", id, artist(song), title(song), album(song))
}

/// One search result line: `<index>/ <artist> - <title> [<album>]`.
pub fn search_line(index: usize, song: &Song) -> String {
    format!(
        "{}/ {} - {} [{}]\n",
        index,
        artist(song),
        title(song),
        album(song)
    )
}

pub fn state_label(state: State) -> &'static str {
    match state {
        State::Play => "Playing",
        State::Pause => "Paused",
        State::Stop => "Stopped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(artist: &str, title: &str, album: &str) -> Song {
        let mut song = Song::default();
        song.file = "music/one.flac".to_string();
        song.title = Some(title.to_string());
        song.tags = vec![
            ("Artist".to_string(), artist.to_string()),
            ("Album".to_string(), album.to_string()),
        ];
        song
    }

    #[test]
    fn queue_lines_lead_with_the_id() {
        let line = queue_line(3, &song("A", "T", "Alb"));
        assert_eq!(line, "3 A - T [Alb]\n");
    }

    #[test]
    fn search_lines_number_the_results() {
        let line = search_line(0, &song("Cool Band", "One", "Great"));
        assert_eq!(line, "0/ Cool Band - One [Great]\n");
    }

    #[test]
    fn missing_tags_render_empty() {
        let mut bare = Song::default();
        bare.file = "music/two.flac".to_string();
        assert_eq!(queue_line(9, &bare), "9  -  []\n");
    }

    #[test]
    fn tag_lookup_ignores_case() {
        let song = song("A", "T", "Alb");
        assert_eq!(tag(&song, "artist"), Some("A"));
        assert_eq!(tag(&song, "ALBUM"), Some("Alb"));
        assert_eq!(tag(&song, "Genre"), None);
    }

    #[test]
    fn states_have_labels() {
        assert_eq!(state_label(State::Play), "Playing");
        assert_eq!(state_label(State::Pause), "Paused");
        assert_eq!(state_label(State::Stop), "Stopped");
    }
}
