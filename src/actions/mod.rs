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

//! Typed window actions.
//!
//! Execute and look clicks arrive as plain text; these enums give the window
//! loops a fixed vocabulary to dispatch on, with anything unrecognized
//! handed back to the editor's default handling.

/// Commands understood by the main panel window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelAction {
    Next,
    Prev,
    Pause,
    UnPause,
    Play,
    Random,
    Repeat,
    Playlist,
    Del,
}

impl PanelAction {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Next" => Some(Self::Next),
            "Prev" => Some(Self::Prev),
            "Pause" => Some(Self::Pause),
            "UnPause" => Some(Self::UnPause),
            "Play" => Some(Self::Play),
            "Random" => Some(Self::Random),
            "Repeat" => Some(Self::Repeat),
            "Playlist" => Some(Self::Playlist),
            "Del" => Some(Self::Del),
            _ => None,
        }
    }
}

/// Commands understood by the playlist editor window.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaylistAction {
    Del,
    Clear,
    Reload,
    WriteBack,
    /// `SavePlaylist` with whatever arguments followed it; arity is checked
    /// by [`save_target`] so a bad call can be reported in the window.
    Save(Vec<String>),
}

impl PlaylistAction {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            "Del" => return Some(Self::Del),
            "Clear" => return Some(Self::Clear),
            "Reload" => return Some(Self::Reload),
            "WriteBack" => return Some(Self::WriteBack),
            _ => {}
        }
        let mut fields = text.split_whitespace();
        if fields.next() == Some("SavePlaylist") {
            return Some(Self::Save(fields.map(str::to_owned).collect()));
        }
        None
    }
}

/// The playlist name of a `SavePlaylist` invocation, if the arity is right.
pub fn save_target(args: &[String]) -> Option<&str> {
    match args {
        [name] => Some(name),
        _ => None,
    }
}

/// Tags the library can be searched by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchField {
    Artist,
    Title,
    Album,
}

impl SearchField {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "artist" => Some(Self::Artist),
            "title" => Some(Self::Title),
            "album" => Some(Self::Album),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Title => "title",
            Self::Album => "album",
        }
    }
}

/// How a free-text query maps onto library searches: scoped to one field by
/// its leading word, or broad across artist, title and album.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchScope {
    Field(SearchField, String),
    Broad(String),
}

impl SearchScope {
    /// `None` for a blank query.
    pub fn parse(query: &str) -> Option<Self> {
        let first = query.split_whitespace().next()?;
        if let Some(field) = SearchField::parse(first) {
            let term = query.strip_prefix(first).unwrap_or(query).trim();
            Some(Self::Field(field, term.to_string()))
        } else {
            Some(Self::Broad(query.trim().to_string()))
        }
    }
}

/// Leading index token of a search result line, with the line-number slash
/// trimmed. Unparseable lines yield `None`; range checking is the caller's
/// business.
pub fn line_index(line: &str) -> Option<i64> {
    let token = line.split_whitespace().next()?;
    token.trim_matches('/').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_panel_button_parses() {
        assert_eq!(PanelAction::parse("Next"), Some(PanelAction::Next));
        assert_eq!(PanelAction::parse("Prev"), Some(PanelAction::Prev));
        assert_eq!(PanelAction::parse("Pause"), Some(PanelAction::Pause));
        assert_eq!(PanelAction::parse("UnPause"), Some(PanelAction::UnPause));
        assert_eq!(PanelAction::parse("Play"), Some(PanelAction::Play));
        assert_eq!(PanelAction::parse("Random"), Some(PanelAction::Random));
        assert_eq!(PanelAction::parse("Repeat"), Some(PanelAction::Repeat));
        assert_eq!(PanelAction::parse("Playlist"), Some(PanelAction::Playlist));
        assert_eq!(PanelAction::parse(" Del\n"), Some(PanelAction::Del));
    }

    #[test]
    fn unknown_panel_text_is_left_to_the_editor() {
        assert_eq!(PanelAction::parse("Cut"), None);
        assert_eq!(PanelAction::parse("next"), None);
        assert_eq!(PanelAction::parse(""), None);
    }

    #[test]
    fn playlist_commands_match_exactly() {
        assert_eq!(PlaylistAction::parse("Clear"), Some(PlaylistAction::Clear));
        assert_eq!(PlaylistAction::parse("Reload"), Some(PlaylistAction::Reload));
        assert_eq!(
            PlaylistAction::parse("WriteBack"),
            Some(PlaylistAction::WriteBack)
        );
        assert_eq!(PlaylistAction::parse("Del"), Some(PlaylistAction::Del));
        // Trailing words make it someone else's command.
        assert_eq!(PlaylistAction::parse("Clear now"), None);
    }

    #[test]
    fn save_collects_its_arguments() {
        assert_eq!(
            PlaylistAction::parse("SavePlaylist mix"),
            Some(PlaylistAction::Save(vec!["mix".to_string()]))
        );
        assert_eq!(
            PlaylistAction::parse("SavePlaylist"),
            Some(PlaylistAction::Save(vec![]))
        );
    }

    #[test]
    fn save_target_wants_exactly_one_name() {
        assert_eq!(save_target(&["mix".to_string()]), Some("mix"));
        assert_eq!(save_target(&[]), None);
        assert_eq!(save_target(&["a".to_string(), "b".to_string()]), None);
    }

    #[test]
    fn scoped_query_keeps_the_remainder() {
        assert_eq!(
            SearchScope::parse("artist The Knife"),
            Some(SearchScope::Field(
                SearchField::Artist,
                "The Knife".to_string()
            ))
        );
        assert_eq!(
            SearchScope::parse("album  In Rainbows "),
            Some(SearchScope::Field(
                SearchField::Album,
                "In Rainbows".to_string()
            ))
        );
    }

    #[test]
    fn bare_query_searches_broadly() {
        assert_eq!(
            SearchScope::parse("knife"),
            Some(SearchScope::Broad("knife".to_string()))
        );
        // Field words only scope from the front.
        assert_eq!(
            SearchScope::parse("the artist"),
            Some(SearchScope::Broad("the artist".to_string()))
        );
    }

    #[test]
    fn blank_query_is_nothing() {
        assert_eq!(SearchScope::parse(""), None);
        assert_eq!(SearchScope::parse("   "), None);
    }

    #[test]
    fn line_index_reads_the_leading_token() {
        assert_eq!(line_index("3/ A - T [X]"), Some(3));
        assert_eq!(line_index("12 whatever"), Some(12));
        assert_eq!(line_index("-1/ A - T [X]"), Some(-1));
        assert_eq!(line_index("x A - T"), None);
        assert_eq!(line_index(""), None);
    }
}
