use core::fmt;

/// The type tag of a value. Primitive kinds live inline in a
/// [`Value`](enum.Value.html) and never touch the heap; heap kinds are
/// stored in the `kind` field of every object header.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    // zeroed memory, so an uninitialized header is recognizable.
    Uninitialized = 0,

    Undefined = 1,
    Null = 2,
    Number = 3,
    Boolean = 4,
    NaN = 5,

    Object = 6,
    Property = 7,
    String = 8,
    Function = 9,
    Record = 10,
}

impl Kind {
    pub const COUNT: usize = 11;

    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Uninitialized, Kind::Undefined, Kind::Null, Kind::Number, Kind::Boolean, Kind::NaN,
        Kind::Object, Kind::Property, Kind::String, Kind::Function, Kind::Record,
    ];

    pub fn from_bits(n: u32) -> Option<Kind> {
        Kind::ALL.get(n as usize).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Does this kind live in a semi-space (and so need a trace routine)?
    pub fn is_heap(self) -> bool {
        match self {
            Kind::Object | Kind::Property | Kind::String | Kind::Function | Kind::Record => true,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Uninitialized => "Uninitialized",
            Kind::Undefined => "Undefined",
            Kind::Null => "Null",
            Kind::Number => "Number",
            Kind::Boolean => "Boolean",
            Kind::NaN => "NaN",
            Kind::Object => "Object",
            Kind::Property => "Property",
            Kind::String => "String",
            Kind::Function => "Function",
            Kind::Record => "Record",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
