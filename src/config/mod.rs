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

//! Application configuration.
//!
//! This module manages the application configuration file; command-line
//! flags override individual values at startup.

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "mpdwin";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub version: u32,
    /// MPD server address as `host:port`.
    pub server: String,
    /// MPD password, when the server requires one.
    pub password: Option<String>,
    /// Editor namespace directory; `None` means the conventional location.
    pub namespace: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: "localhost:6600".to_string(),
            password: None,
            namespace: None,
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_local_server() {
        let config = AppConfig::default();
        assert_eq!(config.server, "localhost:6600");
        assert!(config.password.is_none());
        assert!(config.namespace.is_none());
    }
}
