use std::collections::TryReserveError;

use crate::error::{Error, Result};

/// Smallest number of words the push buffer grows by.
const MIN_GROWTH: usize = 64;

/// Append-only storage of encoded commands.
///
/// Words are only ever appended while recording and only ever read front to
/// back while replaying. Growth doubles the capacity, so appends are amortized
/// O(1). Allocation failure is reported instead of aborting.
#[derive(Debug, Default)]
pub struct PushBuffer {
    words: Vec<u32>,
}

impl PushBuffer {
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut words = Vec::new();
        words.try_reserve_exact(capacity)?;
        Ok(Self { words })
    }

    #[inline]
    pub fn push(&mut self, word: u32) -> Result<(), TryReserveError> {
        self.reserve(1)?;
        self.words.push(word);
        Ok(())
    }

    pub fn extend_from_slice(&mut self, words: &[u32]) -> Result<(), TryReserveError> {
        self.reserve(words.len())?;
        self.words.extend_from_slice(words);
        Ok(())
    }

    fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let free = self.words.capacity() - self.words.len();
        if free >= additional {
            return Ok(());
        }
        let grow = self
            .words
            .capacity()
            .max(MIN_GROWTH)
            .max(additional - free);
        self.words.try_reserve_exact(free + grow)
    }

    /// Logically empties the buffer. Capacity is kept up to `retain_limit`
    /// words so the next recording does not reallocate.
    pub fn reset(&mut self, retain_limit: usize) {
        self.words.clear();
        if self.words.capacity() > retain_limit {
            self.words.shrink_to(retain_limit);
        }
    }

    /// Drops the words past `len`. Only used to roll back a record that
    /// failed half way through encoding.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.words.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.words.capacity()
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader::new(&self.words)
    }
}

/// Sequential read cursor over encoded words.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    words: &'a [u32],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, offset: 0 }
    }

    /// Position of the next word to be read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn word(&mut self) -> Result<u32> {
        let word = *self
            .words
            .get(self.offset)
            .ok_or_else(|| self.malformed("record truncated"))?;
        self.offset += 1;
        Ok(word)
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u32]> {
        if n > self.remaining() {
            return Err(self.malformed("record truncated"));
        }
        let words = &self.words[self.offset..self.offset + n];
        self.offset += n;
        Ok(words)
    }

    pub(crate) fn malformed(&self, reason: &'static str) -> Error {
        Error::Malformed {
            offset: self.offset,
            reason,
        }
    }
}
