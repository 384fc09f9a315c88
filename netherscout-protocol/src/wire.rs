//! Binary framing of the host pipe.
//!
//! Startup: 16 bytes, eight `0xFF` then eight `0x00`.
//! Then repeatedly: one command byte, a fixed-size payload, one response byte.
//! Multi-byte integers are big-endian.
//!
//! | Command | Payload | Response |
//! |---|---|---|
//! | `0x00` obsidian | `i64 seed, i8 chunk_x, i8 chunk_z` | `i8` score 0..=127, or `0xFF` for no bastion |
//! | `0x01` terrain | `i64 seed, i8 bastion_x, i8 bastion_z, i8 fortress_x, i8 fortress_z` | `1` viable, `0` not |

use std::io::{self, Read};

pub const HANDSHAKE: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Response byte for "no bastion generates here" (-1 as an `i8`).
pub const NO_STRUCTURE: u8 = 0xFF;

pub const OBSIDIAN_PAYLOAD_LEN: usize = 10;
pub const TERRAIN_PAYLOAD_LEN: usize = 12;
pub const MAX_PAYLOAD_LEN: usize = TERRAIN_PAYLOAD_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Obsidian,
    Terrain,
}

impl Command {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Command::Obsidian),
            1 => Some(Command::Terrain),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Command::Obsidian => 0,
            Command::Terrain => 1,
        }
    }

    pub fn payload_len(self) -> usize {
        match self {
            Command::Obsidian => OBSIDIAN_PAYLOAD_LEN,
            Command::Terrain => TERRAIN_PAYLOAD_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObsidianQuery {
    pub seed: i64,
    pub chunk_x: i8,
    pub chunk_z: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainQuery {
    pub seed: i64,
    pub bastion_chunk_x: i8,
    pub bastion_chunk_z: i8,
    pub fortress_chunk_x: i8,
    pub fortress_chunk_z: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Obsidian(ObsidianQuery),
    Terrain(TerrainQuery),
}

fn seed_of(payload: &[u8]) -> i64 {
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&payload[..8]);
    i64::from_be_bytes(seed)
}

impl Request {
    /// Decodes a payload of exactly `command.payload_len()` bytes.
    pub fn decode(command: Command, payload: &[u8]) -> Request {
        debug_assert_eq!(payload.len(), command.payload_len());
        let seed = seed_of(payload);
        let byte = |i: usize| payload[8 + i] as i8;
        match command {
            Command::Obsidian => Request::Obsidian(ObsidianQuery {
                seed,
                chunk_x: byte(0),
                chunk_z: byte(1),
            }),
            Command::Terrain => Request::Terrain(TerrainQuery {
                seed,
                bastion_chunk_x: byte(0),
                bastion_chunk_z: byte(1),
                fortress_chunk_x: byte(2),
                fortress_chunk_z: byte(3),
            }),
        }
    }

    pub fn command(&self) -> Command {
        match self {
            Request::Obsidian(_) => Command::Obsidian,
            Request::Terrain(_) => Command::Terrain,
        }
    }

    /// Host-side framing: command byte followed by the payload.
    #[cfg(test)]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(1 + self.command().payload_len());
        frame.push(self.command().to_byte());
        match self {
            Request::Obsidian(q) => {
                frame.extend_from_slice(&q.seed.to_be_bytes());
                frame.extend_from_slice(&[q.chunk_x as u8, q.chunk_z as u8]);
            }
            Request::Terrain(q) => {
                frame.extend_from_slice(&q.seed.to_be_bytes());
                frame.extend_from_slice(&[
                    q.bastion_chunk_x as u8,
                    q.bastion_chunk_z as u8,
                    q.fortress_chunk_x as u8,
                    q.fortress_chunk_z as u8,
                ]);
            }
        }
        frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Obsidian(i8),
    NoStructure,
    Terrain(bool),
}

impl Response {
    pub fn to_byte(self) -> u8 {
        match self {
            Response::Obsidian(score) => score as u8,
            Response::NoStructure => NO_STRUCTURE,
            Response::Terrain(viable) => viable as u8,
        }
    }
}

/// Fills `buf` completely. `Ok(false)` means the stream closed first.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
