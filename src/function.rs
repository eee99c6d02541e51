//! Function records: which native body to run, the environment it closes
//! over, and its parameter names.

use core::{mem, ptr};

use crate::collector::Collector;
use crate::error::Result;
use crate::header::GcRef;
use crate::kind::Kind;
use crate::trace::{Relocate, Trace};
use crate::value::Value;
use crate::array_size;

#[repr(C)]
pub struct FunctionData {
    // index into the runtime's table of native bodies
    native: usize,
    env: Value,
    param_count: usize,
    // followed by `param_count` parameter names
}

impl Trace for FunctionData {
    const KIND: Kind = Kind::Function;

    fn trace(object: GcRef, relocate: &mut Relocate) {
        unsafe { (*data(object)).env.relocate(relocate) };
        for i in 0..param_count(object) {
            unsafe { (*param_ptr(object, i)).relocate(relocate) };
        }
    }
}

#[inline]
fn data(object: GcRef) -> *mut FunctionData {
    debug_assert_eq!(object.kind(), Kind::Function);
    object.payload::<FunctionData>()
}

fn param_ptr(object: GcRef, n: usize) -> *mut Value {
    (data(object).wrapping_add(1) as *mut Value).wrapping_add(n)
}

/// A function whose body is native body number `native`, closing over
/// `env` (usually a record, or `undefined` at the top level).
pub fn create(gc: &mut Collector, native: usize, params: &[Value], env: Value) -> Result<GcRef> {
    let mut keep = params.to_vec();
    keep.push(env);
    let payload = array_size(mem::size_of::<FunctionData>(), params.len(), mem::size_of::<Value>())
        .unwrap_or(usize::MAX);
    let object = gc.allocate_keeping(Kind::Function, payload, &mut keep)?;

    let env = keep[params.len()];
    unsafe { ptr::write(data(object), FunctionData { native, env, param_count: params.len() }) };
    for (i, name) in keep[..params.len()].iter().enumerate() {
        unsafe { ptr::write(param_ptr(object, i), *name) };
    }
    Ok(object)
}

pub fn native(object: GcRef) -> usize {
    unsafe { (*data(object)).native }
}

pub fn env(object: GcRef) -> Value {
    unsafe { (*data(object)).env }
}

pub fn set_env(object: GcRef, env: Value) {
    unsafe { (*data(object)).env = env };
}

pub fn param_count(object: GcRef) -> usize {
    unsafe { (*data(object)).param_count }
}

pub fn param(object: GcRef, n: usize) -> Option<Value> {
    if n >= param_count(object) { return None }
    Some(unsafe { *param_ptr(object, n) })
}


#[cfg(test)]
mod tests {
    use crate::{function, record, string, Collector, Value};

    #[test]
    fn create_and_collect() {
        let mut gc = Collector::with_capacity(1024);
        let one = string::create(&mut gc, "one").unwrap();
        let two = string::create(&mut gc, "two").unwrap();
        let env = record::from_values(&mut gc, &[ Value::number(7.0), Value::TRUE ]).unwrap();
        let f = function::create(&mut gc, 3, &[ Value::Heap(one), Value::Heap(two) ], Value::Heap(env)).unwrap();
        let _garbage = string::create(&mut gc, "garbage").unwrap();

        gc.set_roots(vec![ f ]);
        let report = gc.collect();
        assert_eq!(report.objects_moved, 4);

        let f = gc.root(0).unwrap();
        assert_eq!(function::native(f), 3);
        assert_eq!(function::param_count(f), 2);
        let names = (0..2).map(|i| string::to_string(function::param(f, i).unwrap().pointer().unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec![ "one", "two" ]);
        assert_eq!(function::param(f, 2), None);
        let env = function::env(f).pointer().unwrap();
        assert_eq!(record::values(env), vec![ Value::number(7.0), Value::TRUE ]);
        assert_eq!(gc.active().dump_kinds(), "Function, Record, String, String");
    }
}
