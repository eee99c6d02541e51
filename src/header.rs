use core::{fmt, mem};
use core::ptr::NonNull;

use crate::kind::Kind;

/// The prefix of every object in a semi-space.
///
/// Objects are packed with no gaps, so `end` is both the size of this
/// object (`end - self`) and the address of the next one. That's what lets
/// the collector walk a space without any separate object table.
#[repr(C)]
pub struct GcHeader {
    // raw bits of a `Kind`; zeroed memory reads as `Kind::Uninitialized`.
    kind: u32,
    forwarding: Option<GcRef>,
    end: *mut u8,
}

pub const HEADER_SIZE: usize = mem::size_of::<GcHeader>();

assert_eq_size!(Option<GcRef>, *mut u8);


/// A pointer to an object header in the active space.
///
/// This is only valid until the next collection, unless the object is
/// reachable from the registered roots when that collection runs. In that
/// case the collector moves the object, and the new address has to be read
/// back from the root (or from whichever object field referenced it).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcRef(NonNull<GcHeader>);

impl GcRef {
    /// Wrap a raw address. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `p` must be null, or point at an initialized, word-aligned header.
    pub unsafe fn from_ptr(p: *mut u8) -> Option<GcRef> {
        NonNull::new(p as *mut GcHeader).map(GcRef)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr() as *mut u8
    }

    #[inline]
    fn header(&self) -> &GcHeader {
        unsafe { self.0.as_ref() }
    }

    #[inline]
    fn header_mut(&mut self) -> &mut GcHeader {
        unsafe { self.0.as_mut() }
    }

    pub fn kind(self) -> Kind {
        Kind::from_bits(self.header().kind).unwrap_or(Kind::Uninitialized)
    }

    pub(crate) fn set_kind(mut self, kind: Kind) {
        self.header_mut().kind = kind as u32;
    }

    /// Where this object was copied to, if it has been moved by a
    /// collection that's still in progress (or, for tests, just finished).
    pub fn forwarding(self) -> Option<GcRef> {
        self.header().forwarding
    }

    pub(crate) fn set_forwarding(mut self, to: Option<GcRef>) {
        self.header_mut().forwarding = to;
    }

    #[inline]
    pub fn end(self) -> *mut u8 {
        self.header().end
    }

    pub(crate) fn set_end(mut self, end: *mut u8) {
        self.header_mut().end = end;
    }

    /// Total bytes occupied by this object, header included.
    #[inline]
    pub fn size(self) -> usize {
        (self.end() as usize) - (self.as_ptr() as usize)
    }

    #[inline]
    pub fn payload_size(self) -> usize {
        self.size() - HEADER_SIZE
    }

    /// The kind-specific payload that immediately follows the header.
    #[inline]
    pub fn payload<T>(self) -> *mut T {
        debug_assert!(mem::size_of::<T>() <= self.payload_size());
        self.as_ptr().wrapping_add(HEADER_SIZE) as *mut T
    }
}

impl fmt::Debug for GcRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.as_ptr())
    }
}


#[cfg(test)]
mod tests {
    use core::mem;
    use super::{GcRef, HEADER_SIZE};
    use crate::Kind;

    #[test]
    fn header_fields() {
        let mut data: [u64; 8] = [0; 8];
        let start = data.as_mut_ptr() as *mut u8;
        let r = unsafe { GcRef::from_ptr(start) }.unwrap();
        assert_eq!(r.kind(), Kind::Uninitialized);
        assert_eq!(r.forwarding(), None);

        r.set_kind(Kind::Record);
        r.set_end(start.wrapping_add(HEADER_SIZE + 16));
        assert_eq!(r.kind(), Kind::Record);
        assert_eq!(r.size(), HEADER_SIZE + 16);
        assert_eq!(r.payload_size(), 16);
        assert_eq!(r.payload::<u64>() as usize, start as usize + HEADER_SIZE);
        assert_eq!(HEADER_SIZE, 3 * mem::size_of::<usize>());
    }

    #[test]
    fn null_is_none() {
        assert!(unsafe { GcRef::from_ptr(core::ptr::null_mut()) }.is_none());
    }
}
