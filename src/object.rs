//! Plain objects: a prototype and a chain of own properties.

use core::{mem, ptr};

use crate::collector::Collector;
use crate::error::Result;
use crate::header::GcRef;
use crate::kind::Kind;
use crate::property::{self, PropertyIterator};
use crate::string;
use crate::trace::{Relocate, Trace};
use crate::value::Value;

#[repr(C)]
pub struct ObjectData {
    prototype: Value,
    // most recently defined first
    properties: Option<GcRef>,
}

impl Trace for ObjectData {
    const KIND: Kind = Kind::Object;

    fn trace(object: GcRef, relocate: &mut Relocate) {
        let data = data(object);
        unsafe {
            (*data).prototype.relocate(relocate);
            (*data).properties = (*data).properties.map(|first| relocate(first));
        }
    }
}

#[inline]
fn data(object: GcRef) -> *mut ObjectData {
    debug_assert_eq!(object.kind(), Kind::Object);
    object.payload::<ObjectData>()
}

/// A new object with no properties. `prototype` is another object, or
/// `null`.
pub fn create(gc: &mut Collector, prototype: Value) -> Result<GcRef> {
    let mut keep = [ prototype ];
    let object = gc.allocate_keeping(Kind::Object, mem::size_of::<ObjectData>(), &mut keep)?;
    unsafe { ptr::write(data(object), ObjectData { prototype: keep[0], properties: None }) };
    Ok(object)
}

pub fn prototype(object: GcRef) -> Value {
    unsafe { (*data(object)).prototype }
}

/// Own property descriptors, most recently defined first.
pub fn properties(object: GcRef) -> PropertyIterator {
    PropertyIterator::new(unsafe { (*data(object)).properties })
}

pub fn find_own(object: GcRef, name: &str) -> Option<GcRef> {
    properties(object).find(|p| property::has_key(*p, name))
}

/// Look up a property on the object or its prototype chain.
pub fn get(object: GcRef, name: &str) -> Option<Value> {
    let mut current = Some(object);
    while let Some(o) = current {
        if let Some(p) = find_own(o, name) { return Some(property::value(p)) }
        current = prototype(o).pointer().filter(|p| p.kind() == Kind::Object);
    }
    None
}

/// Set an own property, defining it if it doesn't exist yet. Assigning to
/// a read-only property is silently ignored. Returns the descriptor.
///
/// This may collect, so `object`, `key` and `value` are only good for the
/// duration of the call; read the object back from wherever it's rooted.
pub fn set(gc: &mut Collector, object: GcRef, key: GcRef, value: Value) -> Result<GcRef> {
    if let Some(p) = properties(object).find(|p| string::equals(property::key(*p), key)) {
        property::set_value(p, value);
        return Ok(p);
    }

    let mut keep = [ Value::Heap(object), Value::Heap(key), value ];
    let p = gc.allocate_keeping(Kind::Property, property::PAYLOAD_SIZE, &mut keep)?;
    let object = keep[0].pointer().unwrap_or(object);
    let key = keep[1].pointer().unwrap_or(key);
    property::init(p, key, keep[2], None, property::DEFAULT_FLAGS);
    property::set_next(p, unsafe { (*data(object)).properties });
    unsafe { (*data(object)).properties = Some(p) };
    Ok(p)
}

/// `set`, with a key that isn't allocated yet.
pub fn set_str(gc: &mut Collector, object: GcRef, name: &str, value: Value) -> Result<GcRef> {
    if let Some(p) = find_own(object, name) {
        property::set_value(p, value);
        return Ok(p);
    }

    let mut keep = [ Value::Heap(object), value ];
    let key = gc.keeping(&mut keep, |gc| string::create(gc, name))?;
    set(gc, keep[0].pointer().unwrap_or(object), key, keep[1])
}

/// Own property names, most recently defined first.
pub fn keys(object: GcRef) -> Vec<String> {
    properties(object).map(|p| string::to_string(property::key(p))).collect()
}


#[cfg(test)]
mod tests {
    use crate::{object, Collector, Value};

    #[test]
    fn properties_and_prototypes() {
        let mut gc = Collector::with_capacity(2048);
        let proto = object::create(&mut gc, Value::NULL).unwrap();
        gc.set_roots(vec![ proto ]);
        object::set_str(&mut gc, proto, "inherited", Value::ONE).unwrap();

        let proto = gc.root(0).unwrap();
        let o = object::create(&mut gc, Value::Heap(proto)).unwrap();
        gc.set_roots(vec![ o ]);
        object::set_str(&mut gc, o, "own", Value::TRUE).unwrap();
        let o = gc.root(0).unwrap();
        object::set_str(&mut gc, o, "own", Value::FALSE).unwrap();
        let o = gc.root(0).unwrap();

        assert_eq!(object::keys(o), vec![ "own" ]);
        assert_eq!(object::get(o, "own"), Some(Value::FALSE));
        assert_eq!(object::get(o, "inherited"), Some(Value::ONE));
        assert_eq!(object::get(o, "missing"), None);
        assert!(object::find_own(o, "inherited").is_none());
    }

    #[test]
    fn set_survives_a_collection() {
        // fill the space with garbage, so defining a property has to collect.
        let mut gc = Collector::with_capacity(256);
        let o = object::create(&mut gc, Value::NULL).unwrap();
        gc.set_roots(vec![ o ]);
        while gc.stats().remaining_bytes >= o.size() {
            let _ = object::create(&mut gc, Value::NULL).unwrap();
        }

        object::set_str(&mut gc, o, "x", Value::number(3.0)).unwrap();
        assert_eq!(gc.stats().collections, 1);
        let o = gc.root(0).unwrap();
        assert_eq!(object::get(o, "x"), Some(Value::number(3.0)));
        assert_eq!(gc.active().dump_kinds(), "Object, String, Property");
    }
}
