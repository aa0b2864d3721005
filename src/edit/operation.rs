//! Byte-level payload splices.

/// One step of a payload edit.
///
/// Offsets refer to the buffer as it is when the splice is applied, after
/// every earlier splice of the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Splice {
    /// Insert bytes before `offset`, shifting everything after it.
    Insert {
        /// Insertion position.
        offset: usize,
        /// Bytes to insert.
        bytes: Vec<u8>,
    },
    /// Replace `bytes.len()` bytes starting at `offset`.
    Overwrite {
        /// First byte replaced.
        offset: usize,
        /// Replacement bytes.
        bytes: Vec<u8>,
    },
}

impl Splice {
    /// Returns the position this splice applies to.
    pub fn offset(&self) -> usize {
        match self {
            Splice::Insert { offset, .. } | Splice::Overwrite { offset, .. } => *offset,
        }
    }

    /// Returns the spliced bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Splice::Insert { bytes, .. } | Splice::Overwrite { bytes, .. } => bytes,
        }
    }

    /// Returns the number of spliced bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns `true` if the splice carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Returns how much the splice grows the buffer.
    pub fn growth(&self) -> usize {
        match self {
            Splice::Insert { bytes, .. } => bytes.len(),
            Splice::Overwrite { .. } => 0,
        }
    }

    /// Returns the splice type as a string.
    pub fn kind(&self) -> &'static str {
        match self {
            Splice::Insert { .. } => "insert",
            Splice::Overwrite { .. } => "overwrite",
        }
    }
}

/// Builder for an ordered list of splices.
#[derive(Debug, Default)]
pub struct SpliceBuilder {
    splices: Vec<Splice>,
}

impl SpliceBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an insert.
    pub fn insert(mut self, offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        self.splices.push(Splice::Insert {
            offset,
            bytes: bytes.into(),
        });
        self
    }

    /// Appends an overwrite.
    pub fn overwrite(mut self, offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        self.splices.push(Splice::Overwrite {
            offset,
            bytes: bytes.into(),
        });
        self
    }

    /// Returns the total growth of the splices added so far.
    pub fn growth(&self) -> usize {
        self.splices.iter().map(Splice::growth).sum()
    }

    /// Builds the list of splices.
    pub fn build(self) -> Vec<Splice> {
        self.splices
    }
}
