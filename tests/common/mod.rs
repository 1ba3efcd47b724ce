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

//! A scripted MPD server for session tests.
//!
//! Listens on an ephemeral local port, greets like a real server, records
//! every command line it receives and answers each from a canned response
//! table, matched on the command's first word. Anything unlisted gets a
//! bare `OK`.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

pub type Responses = Vec<(&'static str, &'static str)>;

pub struct FakeMpd {
    pub addr: String,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeMpd {
    /// Response bodies are written before the closing `OK`.
    pub fn start(responses: Responses) -> FakeMpd {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        let addr = listener.local_addr().expect("local addr").to_string();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&commands);
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                serve(stream, &responses, &log);
            }
        });
        FakeMpd { addr, commands }
    }

    /// Every command line received so far, in arrival order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

fn serve(stream: TcpStream, responses: &Responses, log: &Arc<Mutex<Vec<String>>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut writer = stream;
    writer.write_all(b"OK MPD 0.23.5\n").expect("greeting");

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let line = line.trim_end();
        log.lock().unwrap().push(line.to_string());

        let head = line.split_whitespace().next().unwrap_or("");
        let body = responses
            .iter()
            .find(|(command, _)| *command == head)
            .map(|(_, body)| *body)
            .unwrap_or("");
        let mut reply = String::new();
        reply.push_str(body);
        if !reply.is_empty() && !reply.ends_with('\n') {
            reply.push('\n');
        }
        reply.push_str("OK\n");
        if writer.write_all(reply.as_bytes()).is_err() {
            return;
        }
    }
}
