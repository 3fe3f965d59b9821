use std::{fmt, str::FromStr};

use itertools::Itertools;
use smol_str::SmolStr;

use crate::{
    arg::{Arg, arg_string},
    decoration::Decoration,
    error::IrError,
};

pub const ALWAYS: &str = "Always";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl ComparisonType {
    /// The comparison that holds exactly when this one does not.
    pub fn opposite(self) -> Self {
        match self {
            ComparisonType::Equal => ComparisonType::NotEqual,
            ComparisonType::NotEqual => ComparisonType::Equal,
            ComparisonType::Greater => ComparisonType::LessOrEqual,
            ComparisonType::LessOrEqual => ComparisonType::Greater,
            ComparisonType::Less => ComparisonType::GreaterOrEqual,
            ComparisonType::GreaterOrEqual => ComparisonType::Less,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonType::Equal => "==",
            ComparisonType::NotEqual => "!=",
            ComparisonType::Greater => ">",
            ComparisonType::Less => "<",
            ComparisonType::GreaterOrEqual => ">=",
            ComparisonType::LessOrEqual => "<=",
        }
    }
}

impl FromStr for ComparisonType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(ComparisonType::Equal),
            "!=" => Ok(ComparisonType::NotEqual),
            ">" => Ok(ComparisonType::Greater),
            "<" => Ok(ComparisonType::Less),
            ">=" => Ok(ComparisonType::GreaterOrEqual),
            "<=" => Ok(ComparisonType::LessOrEqual),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named builtin condition command with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdCond {
    pub name: SmolStr,
    pub args: Vec<Arg>,
}

impl fmt::Display for CmdCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, arg_string(&self.args, None))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareLhs {
    Value(Arg),
    Cmd(CmdCond),
}

impl fmt::Display for CompareLhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareLhs::Value(arg) => write!(f, "{}", arg),
            CompareLhs::Cmd(cmd) => write!(f, "{}", cmd),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareCond {
    pub ty: ComparisonType,
    pub lhs: CompareLhs,
    pub rhs: Arg,
}

/// A read of a condition group slot, or of a named condition variable.
#[derive(Debug, Clone, PartialEq)]
pub struct CondRef {
    pub group: i32,
    pub compiled: bool,
    pub name: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpCond {
    pub and: bool,
    pub ops: Vec<Cond>,
}

impl OpCond {
    pub fn separator(&self) -> &'static str {
        if self.and { " && " } else { " || " }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCond {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CondKind {
    Compare(CompareCond),
    Cmd(CmdCond),
    Ref(CondRef),
    Op(OpCond),
    Error(ErrorCond),
}

/// A boolean condition read by a control statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub kind: CondKind,
    pub negate: bool,
    pub decorations: Vec<Decoration>,
}

/// Child order for [`Cond::walk`] and [`Cond::rewrite`].
///
/// Children of a combination are always handled before the combination
/// itself; post-order visits them last to first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkOrder {
    #[default]
    PreOrder,
    PostOrder,
}

impl From<CondKind> for Cond {
    fn from(kind: CondKind) -> Self {
        Self {
            kind,
            negate: false,
            decorations: Vec::new(),
        }
    }
}

impl Cond {
    /// The sentinel for an unconditional statement.
    pub fn always() -> Self {
        Self::cmd(ALWAYS, Vec::new())
    }

    pub fn cmd(name: &str, args: Vec<Arg>) -> Self {
        CondKind::Cmd(CmdCond {
            name: SmolStr::new(name),
            args,
        })
        .into()
    }

    pub fn compare(ty: ComparisonType, lhs: CompareLhs, rhs: Arg) -> Self {
        CondKind::Compare(CompareCond { ty, lhs, rhs }).into()
    }

    pub fn group(group: i32) -> Self {
        CondKind::Ref(CondRef {
            group,
            compiled: false,
            name: None,
        })
        .into()
    }

    pub fn compiled_group(group: i32) -> Self {
        CondKind::Ref(CondRef {
            group,
            compiled: true,
            name: None,
        })
        .into()
    }

    pub fn var(name: &str) -> Self {
        CondKind::Ref(CondRef {
            group: 0,
            compiled: false,
            name: Some(SmolStr::new(name)),
        })
        .into()
    }

    pub fn and(ops: Vec<Cond>) -> Self {
        CondKind::Op(OpCond { and: true, ops }).into()
    }

    pub fn or(ops: Vec<Cond>) -> Self {
        CondKind::Op(OpCond { and: false, ops }).into()
    }

    pub fn error(message: Option<&str>) -> Self {
        CondKind::Error(ErrorCond {
            message: message.map(str::to_string),
        })
        .into()
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn with_decorations(mut self, decorations: Vec<Decoration>) -> Self {
        self.decorations = decorations;
        self
    }

    #[inline(always)]
    pub fn is_always(&self) -> bool {
        matches!(&self.kind, CondKind::Cmd(cmd) if cmd.name == ALWAYS && cmd.args.is_empty())
    }

    #[inline(always)]
    pub fn is_op(&self) -> bool {
        matches!(self.kind, CondKind::Op(_))
    }

    fn prefix(&self) -> &'static str {
        if self.negate { "!" } else { "" }
    }

    /// The builtin command whose documentation and argument schema back this
    /// condition.
    ///
    /// Combinations and error placeholders have none; reaching this for them
    /// means a flattening pass did not run.
    pub fn doc_name(&self) -> Result<&str, IrError> {
        match &self.kind {
            CondKind::Compare(CompareCond {
                lhs: CompareLhs::Cmd(cmd),
                ..
            }) => Ok(cmd.name.as_str()),
            CondKind::Compare(_) => Ok("Op"),
            CondKind::Cmd(cmd) => Ok(cmd.name.as_str()),
            CondKind::Ref(cond_ref) if cond_ref.compiled => Ok("CompiledConditionGroup"),
            CondKind::Ref(_) => Ok("ConditionGroup"),
            CondKind::Op(_) | CondKind::Error(_) => Err(IrError::NoBuiltinCommand {
                cond: self.to_string(),
            }),
        }
    }

    /// Text of the condition with one enclosing pair of parentheses removed, as
    /// used in argument position like `if (...)`.
    pub fn plain_string(&self) -> String {
        let s = self.to_string();
        if s.len() >= 3 && s.starts_with('(') && s.ends_with(')') {
            s[1..s.len() - 1].to_string()
        } else {
            s
        }
    }

    pub fn walk<'a, F>(&'a self, visitor: &mut F, order: WalkOrder)
    where
        F: FnMut(&'a Cond),
    {
        if let CondKind::Op(op) = &self.kind {
            match order {
                WalkOrder::PreOrder => {
                    for cond in op.ops.iter() {
                        cond.walk(visitor, order);
                    }
                }
                WalkOrder::PostOrder => {
                    for cond in op.ops.iter().rev() {
                        cond.walk(visitor, order);
                    }
                }
            }
        }
        visitor(self);
    }

    /// Rewrites the tree in place. A visitor returning `Some` replaces the node
    /// it was given; `None` keeps it, including any in-place edits.
    pub fn rewrite<F>(&mut self, visitor: &mut F, order: WalkOrder)
    where
        F: FnMut(&mut Cond) -> Option<Cond>,
    {
        if let CondKind::Op(op) = &mut self.kind {
            match order {
                WalkOrder::PreOrder => {
                    for cond in op.ops.iter_mut() {
                        cond.rewrite(visitor, order);
                    }
                }
                WalkOrder::PostOrder => {
                    for cond in op.ops.iter_mut().rev() {
                        cond.rewrite(visitor, order);
                    }
                }
            }
        }

        if let Some(replacement) = visitor(self) {
            *self = replacement;
        }
    }

    /// Removes every decoration in the tree, children first.
    pub fn drain_decorations(&mut self) -> Vec<Decoration> {
        let mut drained = Vec::new();
        self.rewrite(
            &mut |cond| {
                drained.append(&mut cond.decorations);
                None
            },
            WalkOrder::PreOrder,
        );
        drained
    }

    pub fn decorations_recursive(&self) -> Vec<&Decoration> {
        let mut decorations = Vec::new();
        self.walk(
            &mut |cond| decorations.extend(cond.decorations.iter()),
            WalkOrder::PreOrder,
        );
        decorations
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CondKind::Compare(compare) => {
                let ty = if self.negate {
                    compare.ty.opposite()
                } else {
                    compare.ty
                };
                write!(f, "{} {} {}", compare.lhs, ty, compare.rhs)
            }
            CondKind::Cmd(cmd) => write!(f, "{}{}", self.prefix(), cmd),
            CondKind::Ref(cond_ref) => {
                write!(f, "{}", self.prefix())?;
                match &cond_ref.name {
                    Some(name) => write!(f, "{}", name)?,
                    None => write!(f, "cond[{}]", cond_ref.group)?,
                }
                if cond_ref.compiled {
                    write!(f, ".Passed")?;
                }
                Ok(())
            }
            CondKind::Op(op) => write!(
                f,
                "{}({})",
                self.prefix(),
                op.ops.iter().join(op.separator())
            ),
            CondKind::Error(err) => match &err.message {
                Some(message) => write!(f, "{}ERROR(\"{}\")", self.prefix(), message),
                None => write!(f, "{}ERROR()", self.prefix()),
            },
        }
    }
}
