//! Runtime configuration
//!
//! Every option can be given as a flag or through its environment variable.

use clap::Parser;

use crate::hub::{HubSettings, DEFAULT_BOT_NAME};
use crate::router::BroadcastScope;

/// Room-based WebSocket chat relay
#[derive(Parser, Debug, Clone)]
#[command(name = "chat_relay", version, about = "Room-based WebSocket chat relay")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 2222)]
    pub port: u16,

    /// Sender name shown on system messages
    #[arg(long, env = "CHAT_BOT_NAME", default_value = DEFAULT_BOT_NAME)]
    pub bot_name: String,

    /// Who receives chat messages and "left" notices: the sender's room or everyone
    #[arg(long, env = "CHAT_BROADCAST_SCOPE", value_enum, default_value_t = BroadcastScope::Room)]
    pub broadcast_scope: BroadcastScope,
}

impl Config {
    /// `host:port` for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            bot_name: self.bot_name.clone(),
            scope: self.broadcast_scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let config = Config::try_parse_from([
            "chat_relay",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--bot-name",
            "Relay",
            "--broadcast-scope",
            "global",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(
            config.hub_settings(),
            HubSettings {
                bot_name: "Relay".to_string(),
                scope: BroadcastScope::Global,
            }
        );
    }

    #[test]
    fn test_invalid_scope_rejected() {
        let result =
            Config::try_parse_from(["chat_relay", "--broadcast-scope", "everywhere"]);
        assert!(result.is_err());
    }
}
