use core::{fmt, ptr};
use core::marker::PhantomData;

use crate::{div_ceil, floor_to};

/// A contiguous region of bytes that a [`Space`](struct.Space.html) can
/// carve objects out of.
///
/// The region is either borrowed from the caller (`new`), so the collector
/// can run inside memory it doesn't own, or allocated here
/// (`with_capacity`) and given back on drop.
pub struct Memory<'heap> {
    start: *mut u8,
    len: usize,
    // words allocated by `with_capacity`, freed on drop
    owned: Option<*mut [u64]>,
    _marker: PhantomData<&'heap mut [u8]>,
}

impl<'heap> Memory<'heap> {
    /// Borrow a mutable byte-slice for the lifetime of the heap.
    pub fn new(m: &'heap mut [u8]) -> Memory<'heap> {
        Memory { start: m.as_mut_ptr(), len: m.len(), owned: None, _marker: PhantomData }
    }

    /// Allocate a zeroed, word-aligned region of at least `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Memory<'static> {
        let words = div_ceil(bytes, 8);
        let raw = Box::into_raw(vec![0u64; words].into_boxed_slice());
        Memory { start: raw as *mut u64 as *mut u8, len: words * 8, owned: Some(raw), _marker: PhantomData }
    }

    /// Trim the front and back of this region so it starts on an `align`
    /// boundary and its length is a multiple of `align`.
    pub fn aligned(mut self, align: usize) -> Memory<'heap> {
        let skip = self.start.align_offset(align).min(self.len);
        self.start = self.start.wrapping_add(skip);
        self.len = floor_to(self.len - skip, align);
        self
    }

    /// Zero out the whole region.
    pub fn clear(&mut self) {
        unsafe { ptr::write_bytes(self.start, 0, self.len) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn start(&self) -> *mut u8 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> *mut u8 {
        self.start.wrapping_add(self.len)
    }
}

impl<'heap> Drop for Memory<'heap> {
    fn drop(&mut self) {
        if let Some(raw) = self.owned.take() {
            drop(unsafe { Box::from_raw(raw) });
        }
    }
}

impl<'heap> fmt::Debug for Memory<'heap> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Memory({:?}, {}{})", self.start, self.len, if self.owned.is_some() { ", owned" } else { "" })
    }
}


#[cfg(test)]
mod tests {
    use super::Memory;

    #[test]
    fn borrowed() {
        let mut data: [u8; 64] = [0xff; 64];
        let start = data.as_ptr();
        let mut m = Memory::new(&mut data);
        assert_eq!(m.len(), 64);
        assert_eq!(m.start() as *const u8, start);
        m.clear();
        drop(m);
        assert!(data.iter().all(|b| *b == 0));
    }

    #[test]
    fn owned_is_aligned_and_rounded() {
        let m = Memory::with_capacity(100);
        assert_eq!(m.len(), 104);
        assert_eq!(m.start() as usize % 8, 0);
        assert_eq!(m.end() as usize - m.start() as usize, 104);
    }

    #[test]
    fn aligned_trims_both_ends() {
        let mut data: [u64; 8] = [0; 8];
        let bytes = unsafe { core::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut u8, 64) };
        let m = Memory::new(&mut bytes[3..62]).aligned(8);
        assert_eq!(m.start() as usize % 8, 0);
        assert_eq!(m.len(), 48);
    }
}
