//! Command-line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Media travels inline, so frames have to fit a whole encoded video.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 30 * 1024 * 1024;

/// Shared whiteboard relay server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "WHITEBOARD_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Directory holding the client application
    #[arg(long, env = "WHITEBOARD_STATIC_DIR", default_value = "static", value_hint = clap::ValueHint::DirPath)]
    pub static_dir: PathBuf,

    /// Password a client must send to clear the board
    #[arg(long, env = "WHITEBOARD_CLEAR_PASSWORD", hide_env_values = true)]
    pub clear_password: String,

    /// Largest accepted WebSocket message, in bytes
    #[arg(long, env = "WHITEBOARD_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
}
