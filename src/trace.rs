use core::fmt;

use crate::error::{GcError, Result};
use crate::header::GcRef;
use crate::kind::Kind;
use crate::{function, object, property, record, string};

/// The callback handed to a trace routine: give it a reference, get back
/// the address the object lives at now.
pub type Relocate<'a> = dyn FnMut(GcRef) -> GcRef + 'a;

pub type TraceFn = fn(GcRef, &mut Relocate);

/// Every heap kind implements this, so the collector can find (and rewrite)
/// the references an object holds.
pub trait Trace {
    const KIND: Kind;

    /// Call `relocate` on every outgoing reference of `object` exactly
    /// once, and store the result back into the field it came from.
    ///
    /// Missing a field leaves a dangling pointer after the next collection.
    fn trace(object: GcRef, relocate: &mut Relocate);
}


/// Trace routines, indexed by kind.
pub struct TraceTable {
    routines: [Option<TraceFn>; Kind::COUNT],
}

impl Default for TraceTable {
    fn default() -> TraceTable {
        TraceTable::builtin()
    }
}

impl TraceTable {
    /// A table with nothing registered.
    pub fn new() -> TraceTable {
        TraceTable { routines: [None; Kind::COUNT] }
    }

    /// A table with every built-in heap kind registered.
    pub fn builtin() -> TraceTable {
        let mut table = TraceTable::new();
        table.insert::<object::ObjectData>();
        table.insert::<property::PropertyData>();
        table.insert::<string::StringData>();
        table.insert::<function::FunctionData>();
        table.insert::<record::RecordData>();
        table
    }

    fn insert<T: Trace>(&mut self) {
        self.routines[T::KIND.index()] = Some(T::trace as TraceFn);
    }

    pub fn register<T: Trace>(&mut self) -> Result<()> {
        self.register_fn(T::KIND, T::trace)
    }

    /// Register the trace routine for a heap kind. Each kind gets exactly
    /// one, and primitives get none.
    pub fn register_fn(&mut self, kind: Kind, routine: TraceFn) -> Result<()> {
        if !kind.is_heap() { return Err(GcError::NotHeapKind(kind)) }
        let slot = &mut self.routines[kind.index()];
        if slot.is_some() { return Err(GcError::DuplicateTrace(kind)) }
        *slot = Some(routine);
        Ok(())
    }

    pub fn get(&self, kind: Kind) -> Option<TraceFn> {
        self.routines[kind.index()]
    }

    #[inline]
    pub fn is_registered(&self, kind: Kind) -> bool {
        self.get(kind).is_some()
    }

    /// Run the routine for `object`'s kind. Returns false if there isn't
    /// one.
    pub fn trace(&self, object: GcRef, relocate: &mut Relocate) -> bool {
        match self.get(object.kind()) {
            Some(routine) => {
                routine(object, relocate);
                true
            },
            None => false,
        }
    }
}

impl fmt::Debug for TraceTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TraceTable({})", Kind::ALL.iter().filter(|k| self.is_registered(**k)).map(|k| {
            k.name()
        }).collect::<Vec<&str>>().join(", "))
    }
}


#[cfg(test)]
mod tests {
    use super::{Relocate, TraceTable};
    use crate::{GcError, GcRef, Kind};
    use crate::string::StringData;

    fn nothing(_object: GcRef, _relocate: &mut Relocate) {}

    #[test]
    fn builtin_covers_every_heap_kind() {
        let table = TraceTable::builtin();
        for kind in Kind::ALL.iter() {
            assert_eq!(table.is_registered(*kind), kind.is_heap());
        }
        assert_eq!(format!("{:?}", table), "TraceTable(Object, Property, String, Function, Record)");
    }

    #[test]
    fn rejects_primitives_and_duplicates() {
        let mut table = TraceTable::new();
        assert_eq!(format!("{:?}", table), "TraceTable()");
        assert_eq!(table.register_fn(Kind::Number, nothing), Err(GcError::NotHeapKind(Kind::Number)));
        assert_eq!(table.register::<StringData>(), Ok(()));
        assert_eq!(table.register::<StringData>(), Err(GcError::DuplicateTrace(Kind::String)));
        assert_eq!(table.register_fn(Kind::String, nothing), Err(GcError::DuplicateTrace(Kind::String)));
        assert!(table.is_registered(Kind::String));
        assert!(!table.is_registered(Kind::Object));
    }
}
