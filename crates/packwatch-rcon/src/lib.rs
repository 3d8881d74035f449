//! packwatch-rcon: Minimal remote console client
//!
//! Frames requests with the little-endian length-prefixed console protocol and
//! performs the authenticate + execute exchange used to announce updates in a
//! running game server.

pub mod client;
pub mod codec;
pub mod error;

pub use client::{RconClient, tellraw_command};
pub use codec::{Packet, PacketType, encode, read_packet, write_packet};
pub use error::RconError;
