//! The scratch stack (component C): a single grow-only byte arena used to
//! materialise lexed strings, with strict LIFO push/pop discipline mirroring
//! the original reader's stack-allocated `SerdString` cells.
//!
//! A [`Ref`] is a byte offset into the arena rather than a pointer, so it
//! stays valid across any reallocation the backing `Vec<u8>` performs on
//! push — the tradeoff is that a `Ref` must be dereferenced again (`deref`)
//! every time it's used rather than held as a live borrow, which is exactly
//! the discipline the parser already needs to keep further pushes from
//! invalidating a `&str` taken out of the arena.

use std::collections::HashSet;

const HEADER_LEN: usize = 8;

/// A handle into a [`ScratchStack`]: the byte offset of a pushed string's
/// header. `Ref` is `Copy` and carries no lifetime, unlike a `&str` into
/// the arena.
pub type Ref = usize;

/// Grow-only byte arena with LIFO push/pop. Entries are laid out as a
/// 4-byte `n_bytes` length prefix followed by `n_bytes` raw UTF-8 bytes (no
/// trailing terminator is needed — Rust slices carry their own length).
pub struct ScratchStack {
    buf: Vec<u8>,
    /// Refs that must never actually be popped (the `rdf:first`/`rdf:rest`/
    /// `rdf:nil` sentinels, pushed once at construction and referenced by
    /// every collection the reader expands).
    pinned: HashSet<Ref>,
    #[cfg(debug_assertions)]
    alloc_stack: Vec<Ref>,
}

impl ScratchStack {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(4096),
            pinned: HashSet::new(),
            #[cfg(debug_assertions)]
            alloc_stack: Vec::new(),
        }
    }

    /// Pushes a new, empty string and returns its `Ref`. Bytes are appended
    /// to it with [`push_byte`](Self::push_byte).
    pub fn push_string(&mut self) -> Ref {
        let r = self.buf.len();
        self.buf.extend_from_slice(&0u32.to_ne_bytes());
        self.buf.extend_from_slice(&0u32.to_ne_bytes());
        #[cfg(debug_assertions)]
        self.alloc_stack.push(r);
        r
    }

    /// Appends one byte of UTF-8 to the string at `r`, which must be the
    /// most recently pushed not-yet-popped string.
    pub fn push_byte(&mut self, r: Ref, byte: u8) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(
                self.alloc_stack.last() == Some(&r),
                "push_byte on non-top string"
            );
        }
        self.buf.push(byte);
        let n_bytes = self.read_u32(r) + 1;
        self.write_u32(r, n_bytes);
        let n_chars = self.read_u32(r + 4) + (((byte & 0xC0) != 0x80) as u32);
        self.write_u32(r + 4, n_chars);
    }

    pub fn push_bytes(&mut self, r: Ref, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(r, b);
        }
    }

    /// Appends a whole `&str`, e.g. to splice in a well-known IRI such as
    /// `rdf:type` without reading it byte by byte.
    pub fn push_str(&mut self, r: Ref, s: &str) {
        self.push_bytes(r, s.as_bytes());
    }

    /// Number of bytes currently stored in the string at `r`.
    pub fn len_of(&self, r: Ref) -> usize {
        self.read_u32(r) as usize
    }

    /// Overwrites `new.len()` bytes of the string at `r` starting at byte
    /// `offset`, in place. `new` must be the same length as the span it
    /// replaces — this never changes `n_bytes`/`n_chars`, only the content,
    /// so it's only safe for same-width ASCII substitutions such as the
    /// `genid` → `docid` blank-node rewrite in `turtle::read_node_id`.
    pub fn overwrite(&mut self, r: Ref, offset: usize, new: &[u8]) {
        let start = r + HEADER_LEN + offset;
        self.buf[start..start + new.len()].copy_from_slice(new);
    }

    /// Borrows the string at `r` as `&str`. The borrow's lifetime is tied to
    /// `&self`, so the caller cannot also hold a `&mut` to push further
    /// bytes while this is alive — exactly the invariant that keeps this
    /// safe without unsafe pointer arithmetic.
    pub fn as_str(&self, r: Ref) -> &str {
        let n_bytes = self.read_u32(r) as usize;
        let start = r + HEADER_LEN;
        std::str::from_utf8(&self.buf[start..start + n_bytes])
            .expect("scratch stack only ever receives valid UTF-8")
    }

    /// Marks `r` as a sentinel that [`pop`](Self::pop) must silently ignore
    /// (the reader's well-known `rdf:first`/`rdf:rest`/`rdf:nil` nodes,
    /// which outlive any single production's LIFO scope).
    pub fn pin(&mut self, r: Ref) {
        self.pinned.insert(r);
    }

    /// Pops the string at `r`, which must be the top of the stack unless it
    /// was [`pin`](Self::pin)ned.
    pub fn pop(&mut self, r: Ref) {
        if self.pinned.contains(&r) {
            return;
        }
        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(self.alloc_stack.pop(), Some(r), "pop of non-top string");
        }
        self.buf.truncate(r);
    }

    /// Current stack size, usable as a mark to `truncate_to` back to on a
    /// cancelled or failed production that allocated more than one string.
    pub fn mark(&self) -> usize {
        self.buf.len()
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_ne_bytes(self.buf[at..at + 4].try_into().unwrap())
    }

    fn write_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_ne_bytes());
    }
}

impl Default for ScratchStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut s = ScratchStack::new();
        let r = s.push_string();
        s.push_str(r, "hello");
        assert_eq!(s.as_str(r), "hello");
        s.pop(r);
    }

    #[test]
    fn lifo_nesting() {
        let mut s = ScratchStack::new();
        let outer = s.push_string();
        s.push_str(outer, "outer");
        let inner = s.push_string();
        s.push_str(inner, "inner");
        assert_eq!(s.as_str(inner), "inner");
        s.pop(inner);
        assert_eq!(s.as_str(outer), "outer");
        s.pop(outer);
    }

    #[test]
    fn n_chars_counts_utf8_scalars() {
        let mut s = ScratchStack::new();
        let r = s.push_string();
        s.push_str(r, "héllo");
        assert_eq!(s.as_str(r), "héllo");
        s.pop(r);
    }

    #[test]
    fn pinned_ref_survives_pop() {
        let mut s = ScratchStack::new();
        let r = s.push_string();
        s.push_str(r, "rdf:nil");
        s.pin(r);
        s.pop(r);
        assert_eq!(s.as_str(r), "rdf:nil");
    }
}
