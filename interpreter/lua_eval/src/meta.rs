//! Metatables: per-type registry, event names, and raw metamethod lookup.
//!
//! Tables carry their metatable per instance; every other type shares one
//! optional metatable per tag. Event keys are built once at engine
//! construction so metamethod lookups never re-allocate the `"__add"`
//! strings.

use crate::value::{Heap, Table, TypeTag, Value};

/// Metamethod events, in the order their pre-built keys are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metamethod {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Idiv,
    Pow,
    Unm,
    BAnd,
    BOr,
    BXor,
    BNot,
    Shl,
    Shr,
    Concat,
    Len,
    Eq,
    Lt,
    Le,
    Index,
    NewIndex,
    Call,
    Tostring,
    Metatable,
}

impl Metamethod {
    const ALL: [Metamethod; 24] = [
        Metamethod::Add,
        Metamethod::Sub,
        Metamethod::Mul,
        Metamethod::Div,
        Metamethod::Mod,
        Metamethod::Idiv,
        Metamethod::Pow,
        Metamethod::Unm,
        Metamethod::BAnd,
        Metamethod::BOr,
        Metamethod::BXor,
        Metamethod::BNot,
        Metamethod::Shl,
        Metamethod::Shr,
        Metamethod::Concat,
        Metamethod::Len,
        Metamethod::Eq,
        Metamethod::Lt,
        Metamethod::Le,
        Metamethod::Index,
        Metamethod::NewIndex,
        Metamethod::Call,
        Metamethod::Tostring,
        Metamethod::Metatable,
    ];

    /// The event name this metamethod is stored under.
    pub fn event(self) -> &'static str {
        match self {
            Metamethod::Add => "__add",
            Metamethod::Sub => "__sub",
            Metamethod::Mul => "__mul",
            Metamethod::Div => "__div",
            Metamethod::Mod => "__mod",
            Metamethod::Idiv => "__idiv",
            Metamethod::Pow => "__pow",
            Metamethod::Unm => "__unm",
            Metamethod::BAnd => "__band",
            Metamethod::BOr => "__bor",
            Metamethod::BXor => "__bxor",
            Metamethod::BNot => "__bnot",
            Metamethod::Shl => "__shl",
            Metamethod::Shr => "__shr",
            Metamethod::Concat => "__concat",
            Metamethod::Len => "__len",
            Metamethod::Eq => "__eq",
            Metamethod::Lt => "__lt",
            Metamethod::Le => "__le",
            Metamethod::Index => "__index",
            Metamethod::NewIndex => "__newindex",
            Metamethod::Call => "__call",
            Metamethod::Tostring => "__tostring",
            Metamethod::Metatable => "__metatable",
        }
    }
}

/// Pre-built string keys for every metamethod event.
pub(crate) struct EventKeys {
    keys: Vec<Value>,
}

impl EventKeys {
    pub(crate) fn new() -> Self {
        EventKeys {
            keys: Metamethod::ALL
                .iter()
                .map(|mm| Value::string(mm.event()))
                .collect(),
        }
    }

    #[inline]
    pub(crate) fn key(&self, mm: Metamethod) -> &Value {
        &self.keys[mm as usize]
    }
}

/// The shared metatables of the non-table types.
///
/// Only the string metatable starts out existing (empty); the rest are
/// absent until an embedder installs them.
pub(crate) struct TypeMetatables {
    nil_mt: Option<Heap<Table>>,
    boolean: Option<Heap<Table>>,
    number: Option<Heap<Table>>,
    string: Option<Heap<Table>>,
    function: Option<Heap<Table>>,
    thread: Option<Heap<Table>>,
    userdata: Option<Heap<Table>>,
}

impl TypeMetatables {
    pub(crate) fn new() -> Self {
        TypeMetatables {
            nil_mt: None,
            boolean: None,
            number: None,
            string: Some(Heap::new(Table::new())),
            function: None,
            thread: None,
            userdata: None,
        }
    }

    /// The type-wide metatable for a tag. Tables are per-instance and
    /// have no entry here.
    pub(crate) fn for_tag(&self, tag: TypeTag) -> Option<Heap<Table>> {
        match tag {
            TypeTag::Nil => self.nil_mt.clone(),
            TypeTag::Boolean => self.boolean.clone(),
            TypeTag::Number => self.number.clone(),
            TypeTag::String => self.string.clone(),
            TypeTag::Function => self.function.clone(),
            TypeTag::Thread => self.thread.clone(),
            TypeTag::Userdata => self.userdata.clone(),
            TypeTag::Table => None,
        }
    }
}
