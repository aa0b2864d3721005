//! Element id to name lookup tables.

use std::collections::HashMap;

use crate::format::reader::ByteCursor;
use crate::{Error, Result};

/// A tag or attribute name table.
///
/// On disk: `count: u32`, then `count` `u16` ids, then `count`
/// zero-terminated names, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    entries: Vec<(u16, String)>,
    by_id: HashMap<u16, usize>,
}

impl NameTable {
    /// Reads the table at `offset`.
    pub fn read_at(payload: &[u8], offset: usize) -> Result<Self> {
        let mut cursor = ByteCursor::at(payload, offset);
        let count = cursor.read_u32_le()?;
        let count = usize::try_from(count)
            .map_err(|_| Error::corrupt_header(offset, "name table count out of range"))?;
        // each entry needs at least a 2-byte id and a terminator
        if count.saturating_mul(3) > cursor.remaining() {
            return Err(Error::corrupt_header(
                offset,
                format!("name table claims {} entries", count),
            ));
        }

        let ids = (0..count)
            .map(|_| cursor.read_u16_le())
            .collect::<Result<Vec<_>>>()?;
        let mut table = Self::default();
        for id in ids {
            let name = cursor.read_cstr()?;
            table.insert(id, name);
        }
        Ok(table)
    }

    /// Adds a name; a repeated id replaces the earlier name.
    pub fn insert(&mut self, id: u16, name: impl Into<String>) {
        let name = name.into();
        match self.by_id.get(&id) {
            Some(&index) => self.entries[index].1 = name,
            None => {
                self.by_id.insert(id, self.entries.len());
                self.entries.push((id, name));
            }
        }
    }

    /// Looks up the name for an element id.
    pub fn get(&self, id: i32) -> Option<&str> {
        let id = u16::try_from(id).ok()?;
        self.by_id
            .get(&id)
            .map(|&index| self.entries[index].1.as_str())
    }

    /// Returns the first id listed under `name`.
    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|(_, entry)| entry == name)
            .map(|(id, _)| *id)
    }

    /// Returns the number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, name)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(entries: &[(u16, &str)]) -> Vec<u8> {
        let mut buf = (entries.len() as u32).to_le_bytes().to_vec();
        for (id, _) in entries {
            buf.extend_from_slice(&id.to_le_bytes());
        }
        for (_, name) in entries {
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
        }
        buf
    }

    #[test]
    fn test_read_table() {
        let mut payload = vec![0xEE; 5];
        payload.extend(encode(&[(1, "Game"), (2, "ActiveDLCs")]));
        let table = NameTable::read_at(&payload, 5).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(2), Some("ActiveDLCs"));
        assert_eq!(table.get(3), None);
        assert_eq!(table.id_of("Game"), Some(1));
    }

    #[test]
    fn test_attribute_ids_above_i16() {
        let table = NameTable::read_at(&encode(&[(32768, "count"), (32769, "DLC")]), 0).unwrap();
        assert_eq!(table.get(32769), Some("DLC"));
        assert_eq!(table.get(-1), None);
        assert_eq!(table.get(70000), None);
    }

    #[test]
    fn test_duplicate_id_keeps_last_name() {
        let table = NameTable::read_at(&encode(&[(4, "old"), (4, "new")]), 0).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(4), Some("new"));
    }

    #[test]
    fn test_empty_table() {
        let table = NameTable::read_at(&0u32.to_le_bytes(), 0).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_oversized_count_rejected() {
        let mut payload = u32::MAX.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 16]);
        assert!(NameTable::read_at(&payload, 0).unwrap_err().is_format_error());
    }

    #[test]
    fn test_truncated_names_rejected() {
        let mut payload = encode(&[(1, "Game")]);
        payload.pop();
        assert!(NameTable::read_at(&payload, 0).is_err());
    }
}
