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

//! Command-line entry point.

use anyhow::Result;
use clap::Parser;

use mpdwin::config;

#[derive(Parser)]
#[command(version, about = "An MPD control panel living in acme windows")]
struct Cli {
    /// MPD server address as host:port.
    #[arg(short, long, value_name = "HOST:PORT")]
    server: Option<String>,

    /// MPD password.
    #[arg(short, long)]
    password: Option<String>,

    /// Editor namespace directory, when not at the conventional location.
    #[arg(short, long, value_name = "DIR")]
    namespace: Option<String>,
}

fn main() -> Result<()> {
    setup_logger()?;
    let cli = Cli::parse();

    let mut config = config::load_config();
    if let Some(server) = cli.server {
        config.server = server;
    }
    if cli.password.is_some() {
        config.password = cli.password;
    }
    if cli.namespace.is_some() {
        config.namespace = cli.namespace;
    }

    mpdwin::run(&config)
}

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
