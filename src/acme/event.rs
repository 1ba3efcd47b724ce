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

//! Window event stream parsing.
//!
//! Events arrive on a window's `event` file as framed text: an origin and a
//! cause character, four space-terminated decimal fields (q0, q1, flag and
//! the text length in characters), the text itself and a closing newline.
//! A click on a null selection is followed by a second message carrying the
//! expansion; a chorded command is followed by two more carrying the
//! argument and where it came from. Text longer than the editor cares to
//! ship is elided (the length field is zero while q1 > q0).

use std::io::Read;

use crate::acme::AcmeError;

/// Flag bit on execute/look events: a second message follows with the
/// expanded text of a null selection.
const FLAG_EXPAND: u32 = 2;
/// Flag bit on execute events: two more messages follow with the chorded
/// argument and its origin.
const FLAG_CHORD: u32 = 8;

/// One user action reported by the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Where the action came from: keyboard, mouse, or file writes.
    pub origin: char,
    /// Action type; execute and look clicks are `x`/`X` and `l`/`L`.
    pub cause: char,
    pub q0: u32,
    pub q1: u32,
    /// Selection addresses before null-selection expansion.
    pub orig_q0: u32,
    pub orig_q1: u32,
    pub flag: u32,
    pub text: String,
    /// Chorded argument, when the chord flag was set.
    pub arg: String,
    /// Origin window of the chorded argument.
    pub loc: String,
}

impl Event {
    pub fn is_execute(&self) -> bool {
        matches!(self.cause, 'x' | 'X')
    }

    pub fn is_look(&self) -> bool {
        matches!(self.cause, 'l' | 'L')
    }
}

/// Reads one complete event, folding in expansion and chord follow-ups.
/// Returns `None` on a clean end of stream, i.e. the window went away.
pub(crate) fn read_event<R: Read>(src: &mut R) -> Result<Option<Event>, AcmeError> {
    let Some(mut event) = read_frame(src)? else {
        return Ok(None);
    };
    if event.flag & FLAG_EXPAND != 0 {
        let Some(mut expansion) = read_frame(src)? else {
            return Ok(None);
        };
        if event.q0 == event.q1 {
            expansion.orig_q0 = event.q0;
            expansion.orig_q1 = event.q1;
            expansion.flag = event.flag;
            event = expansion;
        }
    }
    if event.flag & FLAG_CHORD != 0 {
        let Some(arg) = read_frame(src)? else {
            return Ok(None);
        };
        let Some(loc) = read_frame(src)? else {
            return Ok(None);
        };
        event.arg = arg.text;
        event.loc = loc.text;
    }
    Ok(Some(event))
}

fn read_frame<R: Read>(src: &mut R) -> Result<Option<Event>, AcmeError> {
    let Some(origin) = read_char(src)? else {
        return Ok(None);
    };
    let cause = require_char(src)?;
    let q0 = read_number(src)?;
    let q1 = read_number(src)?;
    let flag = read_number(src)?;
    let count = read_number(src)?;
    let mut text = String::new();
    for _ in 0..count {
        text.push(require_char(src)?);
    }
    if require_char(src)? != '\n' {
        return Err(AcmeError::BadEvent);
    }
    Ok(Some(Event {
        origin,
        cause,
        q0,
        q1,
        orig_q0: q0,
        orig_q1: q1,
        flag,
        text,
        ..Event::default()
    }))
}

/// Space-terminated decimal field.
fn read_number<R: Read>(src: &mut R) -> Result<u32, AcmeError> {
    let mut value: u32 = 0;
    let mut digits = 0;
    loop {
        match require_char(src)? {
            c @ '0'..='9' => {
                digits += 1;
                value = value.wrapping_mul(10).wrapping_add(c as u32 - '0' as u32);
            }
            ' ' if digits > 0 => return Ok(value),
            _ => return Err(AcmeError::BadEvent),
        }
    }
}

fn require_char<R: Read>(src: &mut R) -> Result<char, AcmeError> {
    read_char(src)?.ok_or(AcmeError::BadEvent)
}

/// One UTF-8 character off the stream; `None` on end of stream.
fn read_char<R: Read>(src: &mut R) -> Result<Option<char>, AcmeError> {
    let mut first = [0u8; 1];
    match src.read(&mut first) {
        Ok(0) => return Ok(None),
        Ok(_) => {}
        Err(err) => return Err(err.into()),
    }
    let len = match first[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Err(AcmeError::BadEvent),
    };
    let mut buf = [0u8; 4];
    buf[0] = first[0];
    if len > 1 {
        src.read_exact(&mut buf[1..len])?;
    }
    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => Ok(s.chars().next()),
        Err(_) => Err(AcmeError::BadEvent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> Vec<Event> {
        let mut src = Cursor::new(input.as_bytes().to_vec());
        let mut events = Vec::new();
        while let Some(event) = read_event(&mut src).expect("parse failed") {
            events.push(event);
        }
        events
    }

    #[test]
    fn plain_execute_click() {
        let events = read_all("Mx11 15 0 4 Next\n");
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.origin, 'M');
        assert_eq!(event.cause, 'x');
        assert_eq!((event.q0, event.q1), (11, 15));
        assert_eq!(event.text, "Next");
        assert!(event.is_execute());
        assert!(!event.is_look());
    }

    #[test]
    fn null_selection_expands_to_the_follow_up() {
        let events = read_all("Mx16 16 2 0 \nMx14 18 0 4 Next\n");
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.text, "Next");
        assert_eq!((event.q0, event.q1), (14, 18));
        assert_eq!((event.orig_q0, event.orig_q1), (16, 16));
        assert_eq!(event.flag, FLAG_EXPAND);
    }

    #[test]
    fn chorded_argument_is_attached() {
        let events = read_all("Mx10 14 8 4 Echo\nMx0 0 0 5 hello\nMx0 0 0 6 /mpd/+\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Echo");
        assert_eq!(events[0].arg, "hello");
        assert_eq!(events[0].loc, "/mpd/+");
    }

    #[test]
    fn counts_are_characters_not_bytes() {
        // Seven characters spanning two lines, with a multi-byte first word.
        let events = read_all("ML0 7 0 7 \u{e9}tat\nun\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "\u{e9}tat\nun");
        assert!(events[0].is_look());
    }

    #[test]
    fn elided_text_is_left_empty() {
        let events = read_all("Mx5 400 0 0 \n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "");
        assert_eq!(events[0].q1, 400);
    }

    #[test]
    fn end_of_stream_is_none() {
        let mut src = Cursor::new(Vec::new());
        assert!(read_event(&mut src).expect("clean eof").is_none());
    }

    #[test]
    fn truncated_frames_are_errors() {
        let mut src = Cursor::new(b"Mx11 15 0 4 Ne".to_vec());
        assert!(read_event(&mut src).is_err());
    }
}
