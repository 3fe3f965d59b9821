use std::fmt;

use itertools::Itertools;
use smol_str::SmolStr;

/// A single argument value of an instruction or condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    /// A reference to an event parameter, like `X0_4`.
    Param(SmolStr),
    /// A value shown under a symbolic name, like an enum member.
    Display { display: SmolStr, value: Box<Arg> },
    /// Expression text passed through verbatim.
    Expr(String),
}

impl Arg {
    pub fn param(name: &str) -> Self {
        Arg::Param(SmolStr::new(name))
    }

    pub fn display(display: &str, value: Arg) -> Self {
        Arg::Display {
            display: SmolStr::new(display),
            value: Box::new(value),
        }
    }

    pub fn expr(code: impl Into<String>) -> Self {
        Arg::Expr(code.into())
    }

    /// The underlying primitive value, looking through display names.
    pub fn value(&self) -> &Arg {
        match self {
            Arg::Display { value, .. } => value.value(),
            _ => self,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.value() {
            Arg::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(value.into())
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(n) => write!(f, "{}", n),
            Arg::Float(n) => write!(f, "{}", n),
            Arg::Param(name) => write!(f, "{}", name),
            Arg::Display { display, .. } => write!(f, "{}", display),
            Arg::Expr(code) => write!(f, "{}", code),
        }
    }
}

/// Ceremony layer bitmask appended to an instruction's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Layers {
    pub mask: u32,
}

impl Layers {
    pub fn new(mask: u32) -> Self {
        Self { mask }
    }

    pub fn from_layers(layers: &[u32]) -> Self {
        Self {
            mask: layers
                .iter()
                .filter(|layer| **layer < 32)
                .fold(0, |mask, layer| mask | (1 << layer)),
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = u32> + '_ {
        (0..32).filter(|bit| self.mask & (1 << bit) != 0)
    }
}

impl fmt::Display for Layers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$LAYERS({})", self.layers().join(", "))
    }
}

/// A command id like `3[00]`: bank 3, index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId {
    pub bank: i64,
    pub index: i64,
}

impl InstrId {
    pub fn new(bank: i64, index: i64) -> Self {
        Self { bank, index }
    }

    /// Name used when the instruction catalog has no entry for this id.
    pub fn fallback_name(&self) -> SmolStr {
        SmolStr::new(format!("Unknown{}{:02}", self.bank, self.index))
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{:02}]", self.bank, self.index)
    }
}

/// Joins arguments, with the layer mask last when present.
pub fn arg_string(args: &[Arg], layers: Option<&Layers>) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .chain(layers.map(|layers| layers.to_string()))
        .join(", ")
}
