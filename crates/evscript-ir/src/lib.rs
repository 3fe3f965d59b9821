//! `evscript-ir` provides the intermediate representation shared by the event script compiler,
//! decompiler and formatter.
//!
//! An [`EventFunction`] holds a body of [`Intermediate`] statements. Control statements carry a
//! [`Cond`] tree, and any node can carry [`Decoration`]s (comments and blank lines) that survive
//! rewrites.
//!
//! ## Example
//!
//! ```rust
//! use evscript_ir::{Arg, Cond, EndType, EventFunction, EventId, Intermediate, RestBehavior};
//!
//! let flag = Cond::cmd("EventFlag", vec![Arg::Int(100)]);
//! let func = EventFunction::new(EventId::Num(100), RestBehavior::Default).with_body(vec![
//!     Intermediate::wait(flag),
//!     Intermediate::end(EndType::End, Cond::always()),
//! ]);
//!
//! assert_eq!(
//!     func.to_string(),
//!     "Event(100, Default, function() { WaitFor(EventFlag(100)); EndEvent(); });"
//! );
//! ```
mod arg;
mod catalog;
mod cond;
mod decoration;
mod error;
mod function;
mod intermediate;
mod line_mapping;
pub mod passes;
mod reserved;

pub use arg::{Arg, InstrId, Layers, arg_string};
pub use catalog::{ArgDoc, ClassDoc, Emedf, EnumDoc, InstrDoc, InstructionCatalog};
pub use cond::{
    ALWAYS, CmdCond, CompareCond, CompareLhs, ComparisonType, Cond, CondKind, CondRef, ErrorCond,
    OpCond, WalkOrder,
};
pub use decoration::{Decoration, DecorationKind, split_decorations};
pub use error::{CompileError, IrError};
pub use function::{EventFunction, EventId, RestBehavior};
pub use intermediate::{
    Body, CondAssign, CondAssignOp, ControlArg, ControlType, End, EndType, FillSkip, Goto,
    GotoTarget, IfElse, Instr, Intermediate, IntermediateKind, JsStatement, Label, LoopHeader,
    LoopStatement, MAX_LABEL_ID, ReserveSkip, Wait, label_id, rewrite_body, walk_body,
};
pub use line_mapping::{LineMapping, printed_line_for, source_line_for};
pub use reserved::{BuiltIn, BuiltinArg, RESERVED_WORDS, is_reserved_word, reserved_word};
