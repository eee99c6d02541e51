use core::{fmt, ptr};

use crate::header::{GcRef, HEADER_SIZE};
use crate::memory::Memory;
use crate::WORD_SIZE;

/// One half of the heap: a fixed region with a bump cursor.
///
/// Objects are handed out from `bottom` upward with no gaps between them,
/// so `[bottom, top)` is always a run of whole objects that can be walked
/// by following each header's `end`. There's no way to free one object;
/// the whole space is recycled with `reset()`.
pub struct Space<'heap> {
    bottom: *mut u8,
    top: *mut u8,
    limit: *mut u8,

    // keeps the region alive (and frees it, if it's owned)
    memory: Memory<'heap>,
}

impl<'heap> Space<'heap> {
    /// Create a new space out of a chunk of memory. The front and back are
    /// trimmed to word alignment.
    pub fn new(m: Memory<'heap>) -> Space<'heap> {
        let memory = m.aligned(WORD_SIZE);
        let bottom = memory.start();
        Space { bottom, top: bottom, limit: memory.end(), memory }
    }

    /// Create a new space out of a mutable byte-slice.
    pub fn from_bytes(bytes: &'heap mut [u8]) -> Space<'heap> {
        Space::new(Memory::new(bytes))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    #[inline]
    pub fn used_bytes(&self) -> usize {
        (self.top as usize) - (self.bottom as usize)
    }

    #[inline]
    pub fn remaining_bytes(&self) -> usize {
        (self.limit as usize) - (self.top as usize)
    }

    #[inline]
    pub fn bottom(&self) -> *mut u8 {
        self.bottom
    }

    /// The bump cursor: where the next object will go.
    #[inline]
    pub fn top(&self) -> *mut u8 {
        self.top
    }

    /// Is `p` inside an object allocated in this space?
    pub fn contains(&self, p: *const u8) -> bool {
        p >= self.bottom as *const u8 && p < self.top as *const u8
    }

    fn bump(&mut self, size: usize) -> Option<*mut u8> {
        if size > self.remaining_bytes() { return None }
        let start = self.top;
        self.top = self.top.wrapping_add(size);
        Some(start)
    }

    /// Reserve `size` bytes (header included) at the cursor. The memory is
    /// zeroed, and the header's `end` is already set. Returns `None` if the
    /// space is full.
    pub fn allocate(&mut self, size: usize) -> Option<GcRef> {
        debug_assert!(size >= HEADER_SIZE && size % WORD_SIZE == 0);
        let start = self.bump(size)?;
        unsafe { ptr::write_bytes(start, 0, size) };
        let object = unsafe { GcRef::from_ptr(start) }?;
        object.set_end(start.wrapping_add(size));
        Some(object)
    }

    /// Copy `object` (from some other space) to the cursor, byte for byte.
    /// The copy gets a fresh `end` and no forwarding address.
    pub fn copy_of(&mut self, object: GcRef) -> Option<GcRef> {
        let size = object.size();
        let start = self.bump(size)?;
        unsafe { ptr::copy_nonoverlapping(object.as_ptr() as *const u8, start, size) };
        let copy = unsafe { GcRef::from_ptr(start) }?;
        copy.set_forwarding(None);
        copy.set_end(start.wrapping_add(size));
        Some(copy)
    }

    /// Discard every object in this space.
    pub fn reset(&mut self) {
        self.top = self.bottom;
    }

    /// Walk the objects in allocation order.
    pub fn iter(&self) -> SpaceIterator<'_> {
        SpaceIterator { space: self, current: self.bottom }
    }

    /// For debugging: generate a string listing the kind and size of each
    /// object, followed by the free tail of the space.
    pub fn dump(&self) -> String {
        let mut spans = self.iter().map(|object| {
            format!("{}[{}]", object.kind(), object.size())
        }).collect::<Vec<String>>();
        if self.remaining_bytes() > 0 { spans.push(format!("FREE[{}]", self.remaining_bytes())) }
        spans.join(", ")
    }

    /// For debugging: generate a string listing _only_ the kind of each
    /// object.
    pub fn dump_kinds(&self) -> String {
        self.iter().map(|object| object.kind().name()).collect::<Vec<&str>>().join(", ")
    }
}

impl<'heap> fmt::Debug for Space<'heap> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Space(bottom={:?}, used={}/{}", self.bottom, self.used_bytes(), self.capacity())?;
        if f.alternate() {
            write!(f, ", {}", self.dump())?;
        }
        write!(f, ")")
    }
}


pub struct SpaceIterator<'a> {
    space: &'a Space<'a>,
    current: *mut u8,
}

impl<'a> Iterator for SpaceIterator<'a> {
    type Item = GcRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.space.top { return None }
        let object = unsafe { GcRef::from_ptr(self.current) }?;
        let next = object.end();
        // a header whose end doesn't move forward inside the space would
        // loop forever (or run off the end).
        debug_assert!(next > self.current && next <= self.space.top, "corrupt header at {:?}", self.current);
        self.current = next;
        Some(object)
    }
}
