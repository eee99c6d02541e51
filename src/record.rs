//! Internal slot records: a length followed by that many values.
//!
//! The runtime uses these for anything that's just "a list of values":
//! environments, pending task queues, argument lists.

use core::{mem, ptr};

use crate::collector::Collector;
use crate::error::Result;
use crate::header::{GcRef, HEADER_SIZE};
use crate::kind::Kind;
use crate::trace::{Relocate, Trace};
use crate::value::Value;
use crate::{array_size, checked_ceil_to, WORD_SIZE};

#[repr(C)]
pub struct RecordData {
    len: usize,
    // followed by `len` values
}

impl Trace for RecordData {
    const KIND: Kind = Kind::Record;

    fn trace(object: GcRef, relocate: &mut Relocate) {
        for i in 0..len(object) {
            unsafe { (*slot(object, i)).relocate(relocate) }
        }
    }
}

// `usize::MAX` when it overflows, which `allocate` reports as out of memory.
fn payload_size(len: usize) -> usize {
    array_size(mem::size_of::<RecordData>(), len, mem::size_of::<Value>()).unwrap_or(usize::MAX)
}

/// Bytes a record of `len` slots occupies, header included. Saturates at
/// `usize::MAX` for lengths no heap could hold.
pub fn size_of(len: usize) -> usize {
    HEADER_SIZE.checked_add(payload_size(len))
        .and_then(|n| checked_ceil_to(n, WORD_SIZE))
        .unwrap_or(usize::MAX)
}

#[inline]
fn slot(object: GcRef, n: usize) -> *mut Value {
    let first = object.payload::<RecordData>().wrapping_add(1) as *mut Value;
    first.wrapping_add(n)
}

/// A record of `len` slots, all `undefined`.
pub fn create(gc: &mut Collector, len: usize) -> Result<GcRef> {
    let object = gc.allocate(Kind::Record, payload_size(len))?;
    unsafe { ptr::write(object.payload::<RecordData>(), RecordData { len }) };
    for i in 0..len {
        unsafe { ptr::write(slot(object, i), Value::Undefined) };
    }
    Ok(object)
}

/// A record holding a copy of `values`.
pub fn from_values(gc: &mut Collector, values: &[Value]) -> Result<GcRef> {
    let mut keep = values.to_vec();
    let object = gc.allocate_keeping(Kind::Record, payload_size(keep.len()), &mut keep)?;
    unsafe { ptr::write(object.payload::<RecordData>(), RecordData { len: keep.len() }) };
    for (i, v) in keep.iter().enumerate() {
        unsafe { ptr::write(slot(object, i), *v) };
    }
    Ok(object)
}

pub fn len(object: GcRef) -> usize {
    debug_assert_eq!(object.kind(), Kind::Record);
    unsafe { (*object.payload::<RecordData>()).len }
}

pub fn get(object: GcRef, n: usize) -> Option<Value> {
    if n >= len(object) { return None }
    Some(unsafe { *slot(object, n) })
}

/// Returns false if `n` is out of range.
pub fn set(object: GcRef, n: usize, value: Value) -> bool {
    if n >= len(object) { return false }
    unsafe { *slot(object, n) = value };
    true
}

pub fn values(object: GcRef) -> Vec<Value> {
    (0..len(object)).map(|i| unsafe { *slot(object, i) }).collect()
}
