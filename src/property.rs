//! Property descriptors: one per own property of an object, chained
//! together in a singly linked list hanging off the object.

use core::{mem, ptr};

use crate::collector::Collector;
use crate::error::Result;
use crate::header::GcRef;
use crate::kind::Kind;
use crate::string;
use crate::trace::{Relocate, Trace};
use crate::value::Value;

// https://www.ecma-international.org/ecma-262/5.1/#sec-8.6.1
pub const WRITABLE: usize = 1 << 0;
pub const ENUMERABLE: usize = 1 << 1;
pub const CONFIGURABLE: usize = 1 << 2;
pub const DEFAULT_FLAGS: usize = WRITABLE | ENUMERABLE | CONFIGURABLE;

#[repr(C)]
pub struct PropertyData {
    key: GcRef,
    value: Value,
    next: Option<GcRef>,
    flags: usize,
}

impl Trace for PropertyData {
    const KIND: Kind = Kind::Property;

    fn trace(object: GcRef, relocate: &mut Relocate) {
        let data = data(object);
        unsafe {
            (*data).key = relocate((*data).key);
            (*data).value.relocate(relocate);
            (*data).next = (*data).next.map(|next| relocate(next));
        }
    }
}

#[inline]
fn data(object: GcRef) -> *mut PropertyData {
    debug_assert_eq!(object.kind(), Kind::Property);
    object.payload::<PropertyData>()
}

pub const PAYLOAD_SIZE: usize = mem::size_of::<PropertyData>();

/// A new descriptor. `key` must be a string.
pub fn create(gc: &mut Collector, key: GcRef, value: Value, next: Option<GcRef>, flags: usize) -> Result<GcRef> {
    let mut keep = [ Value::Heap(key), value, next.map(Value::Heap).unwrap_or(Value::Null) ];
    let object = gc.allocate_keeping(Kind::Property, PAYLOAD_SIZE, &mut keep)?;
    init(object, keep[0].pointer().unwrap_or(key), keep[1], keep[2].pointer(), flags);
    Ok(object)
}

/// Fill in a freshly allocated descriptor.
pub(crate) fn init(object: GcRef, key: GcRef, value: Value, next: Option<GcRef>, flags: usize) {
    debug_assert_eq!(key.kind(), Kind::String);
    unsafe { ptr::write(data(object), PropertyData { key, value, next, flags }) };
}

pub fn key(object: GcRef) -> GcRef {
    unsafe { (*data(object)).key }
}

pub fn value(object: GcRef) -> Value {
    unsafe { (*data(object)).value }
}

/// Overwrite the value. Returns false (and leaves it alone) if the
/// property isn't writable.
pub fn set_value(object: GcRef, value: Value) -> bool {
    if flags(object) & WRITABLE == 0 { return false }
    unsafe { (*data(object)).value = value };
    true
}

pub fn next(object: GcRef) -> Option<GcRef> {
    unsafe { (*data(object)).next }
}

pub(crate) fn set_next(object: GcRef, next: Option<GcRef>) {
    unsafe { (*data(object)).next = next };
}

pub fn flags(object: GcRef) -> usize {
    unsafe { (*data(object)).flags }
}

pub fn has_key(object: GcRef, name: &str) -> bool {
    string::eq_str(key(object), name)
}


/// Walks a chain of descriptors.
pub struct PropertyIterator {
    current: Option<GcRef>,
}

impl PropertyIterator {
    pub fn new(first: Option<GcRef>) -> PropertyIterator {
        PropertyIterator { current: first }
    }
}

impl Iterator for PropertyIterator {
    type Item = GcRef;

    fn next(&mut self) -> Option<Self::Item> {
        let rv = self.current;
        self.current = rv.and_then(next);
        rv
    }
}
