use core::{mem, ptr, slice, str};

use crate::collector::Collector;
use crate::error::Result;
use crate::header::{GcRef, HEADER_SIZE};
use crate::kind::Kind;
use crate::trace::{Relocate, Trace};
use crate::{ceil_to, WORD_SIZE};

/// String storage: a byte length followed by that many bytes of UTF-8.
#[repr(C)]
pub struct StringData {
    len: usize,
}

// strings hold bytes, never references.
impl Trace for StringData {
    const KIND: Kind = Kind::String;

    fn trace(_object: GcRef, _relocate: &mut Relocate) {}
}

fn bytes_ptr(object: GcRef) -> *mut u8 {
    object.payload::<StringData>().wrapping_add(1) as *mut u8
}

/// Bytes a copy of `s` occupies in the heap, header included.
pub fn size_of(s: &str) -> usize {
    ceil_to(HEADER_SIZE + mem::size_of::<StringData>() + s.len(), WORD_SIZE)
}

pub fn create(gc: &mut Collector, s: &str) -> Result<GcRef> {
    let object = gc.allocate(Kind::String, mem::size_of::<StringData>() + s.len())?;
    unsafe {
        ptr::write(object.payload::<StringData>(), StringData { len: s.len() });
        ptr::copy_nonoverlapping(s.as_ptr(), bytes_ptr(object), s.len());
    }
    Ok(object)
}

/// Length in bytes.
pub fn len(object: GcRef) -> usize {
    debug_assert_eq!(object.kind(), Kind::String);
    unsafe { (*object.payload::<StringData>()).len }
}

// callers must not hold on to this past the next allocation.
fn bytes<'a>(object: GcRef) -> &'a [u8] {
    unsafe { slice::from_raw_parts(bytes_ptr(object), len(object)) }
}

pub fn eq_str(object: GcRef, s: &str) -> bool {
    bytes(object) == s.as_bytes()
}

pub fn equals(a: GcRef, b: GcRef) -> bool {
    a == b || bytes(a) == bytes(b)
}

fn contents<'a>(object: GcRef) -> &'a str {
    // only `create` writes these bytes, and it copies them from a `&str`.
    str::from_utf8(bytes(object)).unwrap_or_default()
}

/// Borrow the contents. The borrow holds the collector, so nothing can
/// allocate (and move the string) until it's released:
///
/// ```compile_fail
/// use twospace::{string, Collector};
///
/// let mut gc = Collector::with_capacity(1024);
/// let alpha = string::create(&mut gc, "alpha").unwrap();
/// let text = string::as_str(&gc, alpha);
/// gc.collect();
/// assert_eq!(text, "alpha");
/// ```
pub fn as_str<'gc>(_gc: &'gc Collector, object: GcRef) -> &'gc str {
    contents(object)
}

pub fn to_string(object: GcRef) -> String {
    contents(object).to_owned()
}
