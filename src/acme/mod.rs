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

//! Client for the acme editor's window file interface.
//!
//! Each window is a directory of files (`ctl`, `tag`, `body`, `addr`,
//! `data`, `errors`, `event`) served over 9P on the editor's namespace
//! socket. A [`Win`] keeps one connection for control and text traffic; its
//! event stream runs on a second connection so that a blocked event read
//! never stalls a concurrent render.

mod event;
mod nine;

pub use event::Event;

use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use thiserror::Error;

use crate::acme::nine::{Conn, OREAD, ORDWR, OWRITE};

#[derive(Debug, Error)]
pub enum AcmeError {
    #[error("no editor namespace; set NAMESPACE or start the editor")]
    NoNamespace,
    #[error("editor protocol: {0}")]
    Protocol(String),
    #[error("malformed window event")]
    BadEvent,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Handle on the editor's file service; cheap to clone, dials per window.
#[derive(Clone, Debug)]
pub struct Fsys {
    socket: PathBuf,
}

impl Fsys {
    /// Locates the service socket in the conventional namespace directory.
    pub fn attach() -> Result<Self, AcmeError> {
        let dir = namespace().ok_or(AcmeError::NoNamespace)?;
        Self::at(dir.join("acme"))
    }

    pub fn at(socket: impl Into<PathBuf>) -> Result<Self, AcmeError> {
        let socket = socket.into();
        if !socket.exists() {
            return Err(AcmeError::NoNamespace);
        }
        Ok(Self { socket })
    }

    /// Creates a new window and returns a handle on its files.
    pub fn new_window(&self) -> Result<Win, AcmeError> {
        let mut conn = Conn::dial(&self.socket)?;
        let ctl = conn.alloc_fid();
        conn.walk(ctl, &["new", "ctl"])?;
        conn.open(ctl, ORDWR)?;
        // Reading the fresh ctl file reports the window id in the first of
        // its columns.
        let line = conn.read(ctl, 0, 256)?;
        let line = String::from_utf8_lossy(&line).into_owned();
        let id = line
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| AcmeError::Protocol(format!("bad window id line {line:?}")))?;
        Ok(Win {
            conn,
            socket: self.socket.clone(),
            id,
            ctl: FileHandle::new(ctl),
            tag: None,
            body: None,
            addr: None,
            data: None,
            errors: None,
        })
    }
}

/// Namespace directory, following the usual conventions: `$NAMESPACE`, or
/// `/tmp/ns.$USER.$DISPLAY` with a trailing `.0` screen suffix dropped.
fn namespace() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("NAMESPACE") {
        return Some(PathBuf::from(dir));
    }
    let user = env::var("USER").ok()?;
    let mut display = env::var("DISPLAY").unwrap_or_else(|_| ":0".to_string());
    if let Some(stripped) = display.strip_suffix(".0") {
        display = stripped.to_string();
    }
    let display = display.replace('/', "_");
    Some(PathBuf::from(format!("/tmp/ns.{user}.{display}")))
}

#[derive(Clone, Copy)]
struct FileHandle {
    fid: u32,
    offset: u64,
}

impl FileHandle {
    fn new(fid: u32) -> Self {
        Self { fid, offset: 0 }
    }
}

/// The window files a [`Win`] keeps open across calls.
#[derive(Clone, Copy)]
enum WinFile {
    Tag,
    Body,
    Addr,
    Data,
    Errors,
}

impl WinFile {
    fn name(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Body => "body",
            Self::Addr => "addr",
            Self::Data => "data",
            Self::Errors => "errors",
        }
    }
}

/// One editor window.
pub struct Win {
    conn: Conn,
    socket: PathBuf,
    id: u32,
    ctl: FileHandle,
    tag: Option<FileHandle>,
    body: Option<FileHandle>,
    addr: Option<FileHandle>,
    data: Option<FileHandle>,
    errors: Option<FileHandle>,
}

impl Win {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Writes a control message to the window.
    pub fn ctl(&mut self, message: &str) -> Result<(), AcmeError> {
        let handle = self.ctl;
        let handle = self.write_handle(handle, format!("{message}\n").as_bytes())?;
        self.ctl = handle;
        Ok(())
    }

    pub fn name(&mut self, name: &str) -> Result<(), AcmeError> {
        self.ctl(&format!("name {name}"))
    }

    /// Marks the window as unmodified.
    pub fn clean(&mut self) -> Result<(), AcmeError> {
        self.ctl("clean")
    }

    /// Deletes the window regardless of modification state.
    pub fn del(&mut self) -> Result<(), AcmeError> {
        self.ctl("delete")
    }

    /// Appends text to the window tag.
    pub fn write_tag(&mut self, text: &str) -> Result<(), AcmeError> {
        self.write_file(WinFile::Tag, text.as_bytes())
    }

    /// Appends text to the window body.
    pub fn write_body(&mut self, text: &str) -> Result<(), AcmeError> {
        self.write_file(WinFile::Body, text.as_bytes())
    }

    /// Empties the body by replacing the whole address range with nothing.
    pub fn clear(&mut self) -> Result<(), AcmeError> {
        self.write_file(WinFile::Addr, b",")?;
        self.write_file(WinFile::Data, b"")
    }

    /// Reports an error against this window; the editor routes it to the
    /// +Errors window.
    pub fn err(&mut self, message: &str) -> Result<(), AcmeError> {
        let mut text = message.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        self.write_file(WinFile::Errors, text.as_bytes())
    }

    /// Reads the full body text.
    pub fn read_body(&mut self) -> Result<String, AcmeError> {
        self.read_whole("body")
    }

    /// Reads the currently selected text.
    pub fn selection(&mut self) -> Result<String, AcmeError> {
        // addr only tracks dot while the addr file is held open.
        self.ensure(WinFile::Addr)?;
        self.ctl("addr=dot")?;
        self.read_whole("xdata")
    }

    /// Opens the window's event stream on its own connection.
    pub fn events(&mut self) -> Result<EventReader, AcmeError> {
        let mut conn = Conn::dial(&self.socket)?;
        let fid = conn.alloc_fid();
        conn.walk(fid, &[&self.id.to_string(), "event"])?;
        conn.open(fid, ORDWR)?;
        Ok(EventReader::new(conn, fid))
    }

    fn slot(&mut self, file: WinFile) -> &mut Option<FileHandle> {
        match file {
            WinFile::Tag => &mut self.tag,
            WinFile::Body => &mut self.body,
            WinFile::Addr => &mut self.addr,
            WinFile::Data => &mut self.data,
            WinFile::Errors => &mut self.errors,
        }
    }

    fn ensure(&mut self, file: WinFile) -> Result<FileHandle, AcmeError> {
        if let Some(handle) = *self.slot(file) {
            return Ok(handle);
        }
        let fid = self.conn.alloc_fid();
        self.conn.walk(fid, &[&self.id.to_string(), file.name()])?;
        self.conn.open(fid, OWRITE)?;
        let handle = FileHandle::new(fid);
        *self.slot(file) = Some(handle);
        Ok(handle)
    }

    fn write_file(&mut self, file: WinFile, data: &[u8]) -> Result<(), AcmeError> {
        let handle = self.ensure(file)?;
        let handle = self.write_handle(handle, data)?;
        *self.slot(file) = Some(handle);
        Ok(())
    }

    /// Writes `data` in message-sized chunks; an empty `data` still issues
    /// one zero-length write, which is how a range is deleted.
    fn write_handle(&mut self, mut handle: FileHandle, data: &[u8]) -> Result<FileHandle, AcmeError> {
        let chunk = self.conn.iounit();
        let mut sent = 0;
        loop {
            let end = (sent + chunk).min(data.len());
            let n = self.conn.write(handle.fid, handle.offset, &data[sent..end])? as usize;
            handle.offset += n as u64;
            sent += n;
            if sent >= data.len() {
                return Ok(handle);
            }
            if n == 0 {
                return Err(AcmeError::Protocol("short write".to_string()));
            }
        }
    }

    fn read_whole(&mut self, name: &str) -> Result<String, AcmeError> {
        let fid = self.conn.alloc_fid();
        self.conn.walk(fid, &[&self.id.to_string(), name])?;
        self.conn.open(fid, OREAD)?;
        let chunk = self.conn.iounit() as u32;
        let mut raw = Vec::new();
        let mut offset = 0u64;
        loop {
            let piece = self.conn.read(fid, offset, chunk)?;
            if piece.is_empty() {
                break;
            }
            offset += piece.len() as u64;
            raw.extend_from_slice(&piece);
        }
        let _ = self.conn.clunk(fid);
        String::from_utf8(raw)
            .map_err(|_| AcmeError::Protocol("window text is not valid UTF-8".to_string()))
    }
}

/// Blocking reader over a window's event file.
pub struct EventReader {
    src: io::BufReader<EventStream>,
}

struct EventStream {
    conn: Conn,
    fid: u32,
    offset: u64,
}

impl Read for EventStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.conn.iounit()) as u32;
        let data = self
            .conn
            .read(self.fid, self.offset, count)
            .map_err(io::Error::other)?;
        self.offset += data.len() as u64;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl EventReader {
    fn new(conn: Conn, fid: u32) -> Self {
        Self {
            src: io::BufReader::new(EventStream { conn, fid, offset: 0 }),
        }
    }

    /// Next event; `None` once the window is gone.
    pub fn read_event(&mut self) -> Result<Option<Event>, AcmeError> {
        event::read_event(&mut self.src)
    }

    /// Hands an event back for the editor's default handling.
    pub fn write_event(&mut self, event: &Event) -> Result<(), AcmeError> {
        let message = format!("{}{}{} {}\n", event.origin, event.cause, event.q0, event.q1);
        let stream = self.src.get_mut();
        stream.conn.write(stream.fid, 0, message.as_bytes())?;
        Ok(())
    }
}

impl Iterator for EventReader {
    type Item = Result<Event, AcmeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}
