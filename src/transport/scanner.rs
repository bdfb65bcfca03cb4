//! Streaming document scanner.
//!
//! The hosting application may deliver several JSON documents back to back
//! in one message with no delimiter other than balanced braces. The scanner
//! tracks nesting depth and string/escape state byte by byte and cuts a
//! document each time depth returns to zero.
//!
//! Only `{` opens a document. Any other non-whitespace byte outside a
//! document is reported as stray.
//!
//! Scanning works on raw bytes: `{`, `}`, `[`, `]`, `"` and `\` are ASCII
//! and never occur inside a multi-byte UTF-8 sequence.
//!
//! A document still open when a [`DocumentScanner::feed`] call ends stays
//! buffered until the next call or [`DocumentScanner::finish`]. Callers
//! that treat every buffer as self-contained call `finish` after each feed.
//!
//! A document that grows past the size limit is dropped, but its structure
//! is still tracked until it closes so nothing inside it is mistaken for a
//! top-level document.

// ============================================================================
// Imports
// ============================================================================

use std::mem;

// ============================================================================
// Constants
// ============================================================================

/// Largest single document the scanner will buffer.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Fragment
// ============================================================================

/// A unit produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A complete, brace-balanced object. Not yet validated as JSON.
    Document(Vec<u8>),

    /// Non-whitespace bytes found between documents.
    Stray(Vec<u8>),

    /// A document that exceeded the size limit and was dropped.
    Oversized {
        /// Bytes dropped.
        discarded: usize,
    },

    /// An unterminated document left over when the scanner was finished.
    Incomplete(Vec<u8>),
}

// ============================================================================
// DocumentScanner
// ============================================================================

/// Incremental splitter for concatenated JSON documents.
#[derive(Debug)]
pub struct DocumentScanner {
    /// Bytes of the document in progress.
    pending: Vec<u8>,
    /// Byte count of an oversized document being skipped.
    discarding: Option<usize>,
    /// Current nesting depth.
    depth: usize,
    /// Inside a string literal.
    in_string: bool,
    /// Previous byte was a backslash inside a string.
    escaped: bool,
    /// Size limit for `pending`.
    max_document_bytes: usize,
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentScanner {
    /// Creates a scanner with the default size limit.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_document_bytes(MAX_DOCUMENT_BYTES)
    }

    /// Creates a scanner with a custom size limit.
    #[inline]
    #[must_use]
    pub fn with_max_document_bytes(max_document_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            discarding: None,
            depth: 0,
            in_string: false,
            escaped: false,
            max_document_bytes,
        }
    }

    /// Returns `true` if a document is partially buffered.
    #[inline]
    #[must_use]
    pub fn has_partial(&self) -> bool {
        self.depth > 0
    }

    /// Scans a buffer and returns the fragments it completes, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut stray = Vec::new();

        for &byte in bytes {
            if self.depth == 0 {
                match byte {
                    b'{' => {
                        Self::flush_stray(&mut stray, &mut fragments);
                        self.pending.push(byte);
                        self.depth = 1;
                    }
                    b if b.is_ascii_whitespace() => {}
                    _ => stray.push(byte),
                }
                continue;
            }

            match &mut self.discarding {
                Some(discarded) => *discarded += 1,
                None => self.pending.push(byte),
            }

            if self.advance(byte) {
                fragments.push(self.take_completed());
                continue;
            }

            if self.discarding.is_none() && self.pending.len() > self.max_document_bytes {
                self.discarding = Some(self.pending.len());
                self.pending = Vec::new();
            }
        }

        Self::flush_stray(&mut stray, &mut fragments);
        fragments
    }

    /// Returns any unterminated document and resets the scanner.
    pub fn finish(&mut self) -> Option<Fragment> {
        if !self.has_partial() {
            return None;
        }

        let leftover = match self.discarding {
            Some(discarded) => Fragment::Oversized { discarded },
            None => Fragment::Incomplete(mem::take(&mut self.pending)),
        };
        self.reset();
        Some(leftover)
    }

    /// Updates string and depth state for one byte inside a document.
    /// Returns `true` when the document closes.
    fn advance(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => {
                self.depth -= 1;
                return self.depth == 0;
            }
            _ => {}
        }
        false
    }

    fn take_completed(&mut self) -> Fragment {
        match self.discarding.take() {
            Some(discarded) => Fragment::Oversized { discarded },
            None => Fragment::Document(mem::take(&mut self.pending)),
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.discarding = None;
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }

    fn flush_stray(stray: &mut Vec<u8>, fragments: &mut Vec<Fragment>) {
        if !stray.is_empty() {
            fragments.push(Fragment::Stray(mem::take(stray)));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
