//! `ScratchArena`: short-lived, byte-budgeted storage for encode buffers.
//!
//! An arena is created for one operation, hands out [`ArenaBuf`] handles,
//! and frees every buffer at once when dropped. Handles are only meaningful
//! for the arena that issued them.

/// Handle to a buffer owned by a [`ScratchArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaBuf(usize);

/// Error type for arena allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("scratch arena exhausted: {requested} bytes requested, {in_use} of {limit} in use")]
    Exhausted {
        requested: usize,
        in_use: usize,
        limit: usize,
    },
}

/// Owner of scratch buffers for one operation.
#[derive(Debug, Default)]
pub struct ScratchArena {
    buffers: Vec<Vec<u8>>,
    in_use: usize,
    limit: Option<usize>,
}

impl ScratchArena {
    /// Unbounded arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena that refuses allocations beyond `limit` total bytes.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffers: Vec::new(),
            in_use: 0,
            limit: Some(limit),
        }
    }

    /// Take ownership of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Exhausted`] if the byte budget would be exceeded;
    /// the buffer is dropped and the arena is unchanged.
    pub fn alloc(&mut self, bytes: Vec<u8>) -> Result<ArenaBuf, ArenaError> {
        let requested = bytes.len();
        let total = self.in_use.saturating_add(requested);
        if let Some(limit) = self.limit {
            if total > limit {
                return Err(ArenaError::Exhausted {
                    requested,
                    in_use: self.in_use,
                    limit,
                });
            }
        }
        self.in_use = total;
        self.buffers.push(bytes);
        Ok(ArenaBuf(self.buffers.len() - 1))
    }

    /// Whether `bytes` more would fit in the budget.
    #[must_use]
    pub fn has_room(&self, bytes: usize) -> bool {
        self.limit
            .map_or(true, |limit| self.in_use.saturating_add(bytes) <= limit)
    }

    /// Borrow a buffer. Foreign handles yield an empty slice.
    #[must_use]
    pub fn get(&self, buf: ArenaBuf) -> &[u8] {
        self.buffers.get(buf.0).map_or(&[], Vec::as_slice)
    }

    /// Total bytes currently owned.
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// Free every buffer now. Returns the number of bytes released.
    pub fn release(mut self) -> usize {
        self.release_all()
    }

    fn release_all(&mut self) -> usize {
        let freed = self.in_use;
        self.buffers.clear();
        self.in_use = 0;
        freed
    }
}

impl Drop for ScratchArena {
    fn drop(&mut self) {
        let buffers = self.buffers.len();
        let freed = self.release_all();
        if buffers > 0 {
            tracing::trace!(buffers, freed, "scratch arena released");
        }
    }
}
