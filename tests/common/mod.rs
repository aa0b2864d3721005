//! Shared test utilities for integration tests.
//!
//! This module builds synthetic save containers: a game-setup payload with
//! its name tables and trailer, compressed and embedded in a
//! `Resource File V2.2` container with a chain of directory blocks.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use rdasave::format::{CLOSING_REGION_LEN, FIRST_BLOCK_POINTER_OFFSET, MAGIC, content_padding};
use rdasave::{NameEncoding, codec};

pub const TAG_GAME: i32 = 1;
pub const TAG_LIST: i32 = 2;
pub const TAG_OTHER: i32 = 3;
pub const ATTR_COUNT: i32 = 32768;
pub const ATTR_DLC: i32 = 32769;
pub const ATTR_NAME: i32 = 32770;

pub const HIGH_LIFE: u32 = 0xE541_0600;
pub const NEW_WORLD_RISING: u32 = 0x8361_0000;
pub const BOTANICA: u32 = 0xB941_0600;

const TAG_NAMES: &[(u16, &str)] = &[(1, "Game"), (2, "ActiveDLCs"), (3, "Other")];
const ATTRIBUTE_NAMES: &[(u16, &str)] = &[(32768, "count"), (32769, "DLC"), (32770, "Name")];

/// Reserved trailer bytes written by [`PayloadBuilder::finish`].
pub const TRAILER_RESERVED: [u8; 8] = [0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89];

/// Builds a payload record by record.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    body: Vec<u8>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, id: i32) -> Self {
        self.body.extend_from_slice(&0u32.to_le_bytes());
        self.body.extend_from_slice(&id.to_le_bytes());
        self
    }

    pub fn close(self) -> Self {
        self.open(0)
    }

    pub fn attr(mut self, id: i32, content: &[u8]) -> Self {
        self.body
            .extend_from_slice(&(content.len() as u32).to_le_bytes());
        self.body.extend_from_slice(&id.to_le_bytes());
        self.body.extend_from_slice(content);
        self.body
            .resize(self.body.len() + content_padding(content.len()), 0);
        self
    }

    /// Appends the name tables and the trailer.
    pub fn finish(self) -> Vec<u8> {
        let mut out = self.body;
        let tag_table = out.len() as u32;
        write_table(&mut out, TAG_NAMES);
        let attribute_table = out.len() as u32;
        write_table(&mut out, ATTRIBUTE_NAMES);
        out.extend_from_slice(&tag_table.to_le_bytes());
        out.extend_from_slice(&attribute_table.to_le_bytes());
        out.extend_from_slice(&TRAILER_RESERVED);
        out
    }
}

fn write_table(out: &mut Vec<u8>, entries: &[(u16, &str)]) {
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (id, _) in entries {
        out.extend_from_slice(&id.to_le_bytes());
    }
    for (_, name) in entries {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
}

/// A game-setup payload whose list holds `items`.
///
/// ```text
/// <Game>
///   <Name>Harbour</Name>
///   <Other><DLC>1</DLC></Other>
///   <ActiveDLCs>
///     <count>len(items)</count>
///     <DLC>item</DLC>...
///   </ActiveDLCs>
/// </Game>
/// ```
pub fn game_setup(items: &[u32]) -> Vec<u8> {
    game_setup_with_counter(items, items.len() as u64)
}

/// Like [`game_setup`], with an explicit stored counter value.
pub fn game_setup_with_counter(items: &[u32], counter: u64) -> Vec<u8> {
    let mut payload = PayloadBuilder::new()
        .open(TAG_GAME)
        .attr(ATTR_NAME, b"Harbour")
        .open(TAG_OTHER)
        .attr(ATTR_DLC, &1u32.to_be_bytes())
        .close()
        .open(TAG_LIST)
        .attr(ATTR_COUNT, &counter.to_le_bytes());
    for item in items {
        payload = payload.attr(ATTR_DLC, &item.to_be_bytes());
    }
    payload.close().close().close().finish()
}

/// A payload with the list container but no counter attribute.
pub fn game_setup_without_counter() -> Vec<u8> {
    PayloadBuilder::new()
        .open(TAG_GAME)
        .open(TAG_LIST)
        .attr(ATTR_DLC, &HIGH_LIFE.to_be_bytes())
        .close()
        .close()
        .close()
        .finish()
}

/// The closing region appended to every built container.
pub fn closing_region() -> Vec<u8> {
    (0..CLOSING_REGION_LEN as u8).map(|b| b ^ 0x5A).collect()
}

/// Builds a container with one directory block per slice of files.
///
/// Each block stores its files' data, then its entry table, then its
/// header. The 80-byte closing region follows the last header.
pub fn build_container(blocks: &[&[(&str, &[u8])]]) -> Vec<u8> {
    build_container_with(blocks, NameEncoding::Utf16Le)
}

/// Like [`build_container`], with a chosen name encoding.
pub fn build_container_with(blocks: &[&[(&str, &[u8])]], encoding: NameEncoding) -> Vec<u8> {
    let mut buf = MAGIC.to_vec();
    buf.resize(FIRST_BLOCK_POINTER_OFFSET + 8, 0);
    let mut pointer_field = FIRST_BLOCK_POINTER_OFFSET;

    for files in blocks {
        let mut entries = Vec::new();
        for (name, data) in files.iter() {
            let data_pointer = buf.len() as u64;
            buf.extend_from_slice(data);
            let size = data.len() as u64;
            let mut entry = encoding.encode(name, 520);
            for value in [data_pointer, size, size, 1_700_000_000, 0] {
                entry.extend_from_slice(&value.to_le_bytes());
            }
            entries.extend_from_slice(&entry);
        }
        buf.extend_from_slice(&entries);

        let header = buf.len() as u64;
        buf[pointer_field..pointer_field + 8].copy_from_slice(&header.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&(files.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(entries.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(entries.len() as u64).to_le_bytes());
        pointer_field = buf.len();
        buf.extend_from_slice(&0u64.to_le_bytes());
    }

    buf.extend_from_slice(&closing_region());
    buf
}

/// A save whose second directory block holds `gamesetup.a7s` with `items`.
pub fn save_with_items(items: &[u32]) -> Vec<u8> {
    save_with_payload(&game_setup(items))
}

/// A save whose second directory block holds `gamesetup.a7s` = `payload`.
pub fn save_with_payload(payload: &[u8]) -> Vec<u8> {
    let compressed = codec::compress(payload, 9).expect("compress fixture payload");
    build_container(&[
        &[("data.a7s", b"island data"), ("meta.a7s", b"meta")],
        &[("gamesetup.a7s", &compressed)],
    ])
}

/// Reads a little-endian `u32`.
pub fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

/// Reads a little-endian `u64`.
pub fn u64_at(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}
