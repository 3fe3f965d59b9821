use std::fmt;

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use crate::{EventFunction, EventId, Intermediate};

#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
pub enum IrError {
    #[error("Unresolved label {label}")]
    #[diagnostic(code(IrError::UnresolvedLabel))]
    UnresolvedLabel { label: SmolStr },
    #[error("Unresolved jump to internal node {node}")]
    #[diagnostic(code(IrError::UnresolvedNode))]
    UnresolvedNode { node: usize },
    #[error("Cannot resolve skip of {lines} lines: {reason}")]
    #[diagnostic(code(IrError::UnresolvedSkip))]
    UnresolvedSkip { lines: u32, reason: &'static str },
    #[error("Condition variable {name} is never assigned")]
    #[diagnostic(code(IrError::UnresolvedCondition))]
    UnresolvedCondition { name: SmolStr },
    #[error("Jump {statement} must target a label in a resolved tree")]
    #[diagnostic(code(IrError::TransientGoto))]
    TransientGoto { statement: String },
    #[error("No built-in command corresponding to {cond}")]
    #[diagnostic(
        code(IrError::NoBuiltinCommand),
        help("flatten the condition into condition group slots before emitting it")
    )]
    NoBuiltinCommand { cond: String },
    #[error("{statement} has no control argument")]
    #[diagnostic(code(IrError::NoControlArg))]
    NoControlArg { statement: String },
}

/// A positioned error report for a single event, suitable for editor diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    /// 1-indexed source line, or 0 when no position is known.
    pub line: u32,
    pub message: String,
    pub event: Option<EventId>,
}

impl CompileError {
    pub fn new(line: u32, message: impl Into<String>, event: Option<EventId>) -> Self {
        Self {
            line,
            message: message.into(),
            event,
        }
    }

    /// Positions the error at the statement's source line, falling back to the
    /// function declaration.
    pub fn from_intermediate(
        im: Option<&Intermediate>,
        message: impl Into<String>,
        func: &EventFunction,
    ) -> Self {
        let line = im
            .and_then(|im| im.line_mapping.as_ref())
            .or(func.line_mapping.as_ref())
            .map(|mapping| mapping.source_line)
            .unwrap_or(0);

        Self::new(line, message, Some(func.id.clone()))
    }

    pub fn from_ir_error(im: Option<&Intermediate>, err: &IrError, func: &EventFunction) -> Self {
        Self::from_intermediate(im, err.to_string(), func)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.event {
            Some(event) => write!(f, "Event {} line {}: {}", event, self.line, self.message),
            None => write!(f, "line {}: {}", self.line, self.message),
        }
    }
}
