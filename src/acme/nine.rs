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

//! Minimal synchronous 9P2000 transport.
//!
//! Just enough of the protocol to drive the editor's window file tree over
//! its namespace socket: version and attach at dial time, then walk, open,
//! read, write and clunk on demand. Only one request is ever in flight on a
//! connection, so a single tag is reused for everything.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use crate::acme::AcmeError;

const MSIZE: u32 = 8 * 1024;
/// Per-message header space reserved out of msize for read/write payloads.
const IOHDRSZ: u32 = 24;

const NOTAG: u16 = 0xffff;
const NOFID: u32 = 0xffff_ffff;
const TAG: u16 = 1;

const TVERSION: u8 = 100;
const TATTACH: u8 = 104;
const RERROR: u8 = 107;
const TWALK: u8 = 110;
const TOPEN: u8 = 112;
const TREAD: u8 = 116;
const TWRITE: u8 = 118;
const TCLUNK: u8 = 120;

pub(crate) const OREAD: u8 = 0;
pub(crate) const ORDWR: u8 = 2;
pub(crate) const OWRITE: u8 = 1;

pub(crate) const ROOT_FID: u32 = 0;

pub(crate) struct Conn {
    stream: UnixStream,
    msize: u32,
    next_fid: u32,
}

impl Conn {
    /// Dials the service socket and performs the version/attach handshake.
    /// The tree root is left on [`ROOT_FID`].
    pub(crate) fn dial(socket: &Path) -> Result<Self, AcmeError> {
        let stream = UnixStream::connect(socket)?;
        let mut conn = Conn {
            stream,
            msize: MSIZE,
            next_fid: ROOT_FID + 1,
        };
        conn.version()?;
        conn.attach()?;
        Ok(conn)
    }

    pub(crate) fn alloc_fid(&mut self) -> u32 {
        let fid = self.next_fid;
        self.next_fid += 1;
        fid
    }

    /// Largest read/write payload the negotiated msize allows.
    pub(crate) fn iounit(&self) -> usize {
        (self.msize - IOHDRSZ) as usize
    }

    fn version(&mut self) -> Result<(), AcmeError> {
        let mut body = Vec::new();
        put_u32(&mut body, MSIZE);
        put_str(&mut body, "9P2000");
        let resp = self.rpc_tagged(TVERSION, NOTAG, &body)?;
        let mut fields = Fields::new(&resp);
        let msize = fields.u32()?;
        let version = fields.str()?;
        if version != "9P2000" {
            return Err(AcmeError::Protocol(format!(
                "unsupported protocol version {version}"
            )));
        }
        self.msize = msize.min(MSIZE);
        Ok(())
    }

    fn attach(&mut self) -> Result<(), AcmeError> {
        let uname = std::env::var("USER").unwrap_or_else(|_| "none".to_string());
        let mut body = Vec::new();
        put_u32(&mut body, ROOT_FID);
        put_u32(&mut body, NOFID);
        put_str(&mut body, &uname);
        put_str(&mut body, "");
        // The attach qid is of no use here.
        self.rpc(TATTACH, &body)?;
        Ok(())
    }

    /// Walks `names` from the tree root to `newfid`.
    pub(crate) fn walk(&mut self, newfid: u32, names: &[&str]) -> Result<(), AcmeError> {
        let mut body = Vec::new();
        put_u32(&mut body, ROOT_FID);
        put_u32(&mut body, newfid);
        put_u16(&mut body, names.len() as u16);
        for name in names {
            put_str(&mut body, name);
        }
        let resp = self.rpc(TWALK, &body)?;
        let walked = Fields::new(&resp).u16()? as usize;
        if walked != names.len() {
            return Err(AcmeError::Protocol(format!(
                "walk to {} stopped after {walked} of {} names",
                names.join("/"),
                names.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn open(&mut self, fid: u32, mode: u8) -> Result<(), AcmeError> {
        let mut body = Vec::new();
        put_u32(&mut body, fid);
        body.push(mode);
        self.rpc(TOPEN, &body)?;
        Ok(())
    }

    pub(crate) fn read(&mut self, fid: u32, offset: u64, count: u32) -> Result<Vec<u8>, AcmeError> {
        let count = count.min(self.msize - IOHDRSZ);
        let mut body = Vec::new();
        put_u32(&mut body, fid);
        put_u64(&mut body, offset);
        put_u32(&mut body, count);
        let resp = self.rpc(TREAD, &body)?;
        let mut fields = Fields::new(&resp);
        let n = fields.u32()? as usize;
        fields.bytes(n)
    }

    /// Writes a single message; callers chunk payloads larger than
    /// [`Conn::iounit`].
    pub(crate) fn write(&mut self, fid: u32, offset: u64, data: &[u8]) -> Result<u32, AcmeError> {
        let mut body = Vec::new();
        put_u32(&mut body, fid);
        put_u64(&mut body, offset);
        put_u32(&mut body, data.len() as u32);
        body.extend_from_slice(data);
        let resp = self.rpc(TWRITE, &body)?;
        Fields::new(&resp).u32()
    }

    pub(crate) fn clunk(&mut self, fid: u32) -> Result<(), AcmeError> {
        let mut body = Vec::new();
        put_u32(&mut body, fid);
        self.rpc(TCLUNK, &body)?;
        Ok(())
    }

    fn rpc(&mut self, mtype: u8, body: &[u8]) -> Result<Vec<u8>, AcmeError> {
        self.rpc_tagged(mtype, TAG, body)
    }

    /// One request/response exchange. The reply tag is not checked since a
    /// connection never has more than one outstanding request.
    fn rpc_tagged(&mut self, mtype: u8, tag: u16, body: &[u8]) -> Result<Vec<u8>, AcmeError> {
        let size = (4 + 1 + 2 + body.len()) as u32;
        let mut msg = Vec::with_capacity(size as usize);
        put_u32(&mut msg, size);
        msg.push(mtype);
        put_u16(&mut msg, tag);
        msg.extend_from_slice(body);
        self.stream.write_all(&msg)?;

        let mut head = [0u8; 4];
        self.stream.read_exact(&mut head)?;
        let size = u32::from_le_bytes(head) as usize;
        if size < 7 {
            return Err(AcmeError::Protocol(format!("short message, size {size}")));
        }
        let mut rest = vec![0u8; size - 4];
        self.stream.read_exact(&mut rest)?;
        let rtype = rest[0];
        let payload = rest[3..].to_vec();
        if rtype == RERROR {
            let ename = Fields::new(&payload).str()?;
            return Err(AcmeError::Protocol(ename));
        }
        if rtype != mtype + 1 {
            return Err(AcmeError::Protocol(format!(
                "unexpected reply type {rtype} to request {mtype}"
            )));
        }
        Ok(payload)
    }
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) {
    put_u16(buf, value.len() as u16);
    buf.extend_from_slice(value.as_bytes());
}

/// Little-endian field reader over a reply payload.
struct Fields<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AcmeError> {
        if self.pos + n > self.buf.len() {
            return Err(AcmeError::Protocol("truncated message".to_string()));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, AcmeError> {
        let raw = self.take(2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    fn u32(&mut self) -> Result<u32, AcmeError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn bytes(&mut self, n: usize) -> Result<Vec<u8>, AcmeError> {
        Ok(self.take(n)?.to_vec())
    }

    fn str(&mut self) -> Result<String, AcmeError> {
        let len = self.u16()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| AcmeError::Protocol("string is not valid UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_round_trip() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 8192);
        put_str(&mut buf, "9P2000");
        put_u16(&mut buf, 7);

        let mut fields = Fields::new(&buf);
        assert_eq!(fields.u32().unwrap(), 8192);
        assert_eq!(fields.str().unwrap(), "9P2000");
        assert_eq!(fields.u16().unwrap(), 7);
    }

    #[test]
    fn truncated_payloads_are_rejected() {
        let mut buf = Vec::new();
        put_u16(&mut buf, 40);
        buf.extend_from_slice(b"too short");

        let mut fields = Fields::new(&buf);
        assert!(fields.str().is_err());
    }

    #[test]
    fn empty_payload_has_no_fields() {
        let mut fields = Fields::new(&[]);
        assert!(fields.u32().is_err());
    }
}
