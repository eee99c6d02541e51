use crate::header::GcRef;
use crate::kind::Kind;

/// A runtime value: either an inline primitive, or a reference to an
/// object in the active space.
///
/// The well-known singletons (`undefined`, `null`, `true`, `false`, `NaN`,
/// `Infinity`, `0`, `1`) are all inline, so they're never allocated,
/// relocated, or collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    NaN,
    Heap(GcRef),
}

const_assert!(core::mem::size_of::<Value>() <= 16);

impl Default for Value {
    fn default() -> Value {
        Value::Undefined
    }
}

impl Value {
    pub const UNDEFINED: Value = Value::Undefined;
    pub const NULL: Value = Value::Null;
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);
    pub const NAN: Value = Value::NaN;
    pub const INFINITY: Value = Value::Number(f64::INFINITY);
    pub const ZERO: Value = Value::Number(0.0);
    pub const ONE: Value = Value::Number(1.0);

    /// `NaN` has its own kind, so it never shows up as a `Number`.
    pub fn number(n: f64) -> Value {
        if n.is_nan() { Value::NaN } else { Value::Number(n) }
    }

    pub fn boolean(b: bool) -> Value {
        if b { Value::TRUE } else { Value::FALSE }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Number(n) if n.is_nan() => Kind::NaN,
            Value::Number(_) => Kind::Number,
            Value::NaN => Kind::NaN,
            Value::Heap(r) => r.kind(),
        }
    }

    /// The numeric payload, for `Number` and `NaN`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::NaN => Some(f64::NAN),
            _ => None,
        }
    }

    pub fn pointer(&self) -> Option<GcRef> {
        match self {
            Value::Heap(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !self.kind().is_heap()
    }

    pub fn is_undefined(&self) -> bool {
        *self == Value::Undefined
    }

    /// True for `Value::NaN`, and for a `Number` built directly out of a
    /// NaN.
    pub fn is_nan(&self) -> bool {
        self.kind() == Kind::NaN
    }

    // https://www.ecma-international.org/ecma-262/5.1/#sec-9.2
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null | Value::NaN => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Heap(r) => !(r.kind() == Kind::String && crate::string::len(*r) == 0),
        }
    }

    // https://www.ecma-international.org/ecma-262/5.1/#sec-9.3
    // heap values need the evaluator's help (valueOf, string parsing), so
    // they report `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Undefined | Value::NaN => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::Heap(_) => None,
        }
    }

    /// For trace routines: if this value points into the heap, relocate it
    /// and rewrite it in place.
    #[inline]
    pub fn relocate(&mut self, relocate: &mut crate::trace::Relocate) {
        if let Value::Heap(r) = self {
            *r = relocate(*r);
        }
    }
}

impl From<GcRef> for Value {
    fn from(r: GcRef) -> Value {
        Value::Heap(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::number(n)
    }
}
