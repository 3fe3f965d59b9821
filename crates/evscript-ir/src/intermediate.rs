use std::fmt;

use smol_str::SmolStr;

use crate::{
    arg::{Arg, InstrId, Layers, arg_string},
    cond::Cond,
    decoration::Decoration,
    error::IrError,
    line_mapping::LineMapping,
};

pub type Body = Vec<Intermediate>;

/// Highest label number with a dedicated label instruction (`L0`..`L20`).
pub const MAX_LABEL_ID: u32 = 20;

/// Maps a label name like `L7` to its numeric id.
pub fn label_id(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('L')?;
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|id| *id <= MAX_LABEL_ID)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    /// The command id from a decompiled source, when known.
    pub id: Option<InstrId>,
    pub name: SmolStr,
    pub args: Vec<Arg>,
    pub layers: Option<Layers>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub num: u32,
}

impl Label {
    pub fn name(&self) -> SmolStr {
        SmolStr::new(format!("L{}", self.num))
    }
}

/// An opaque script statement passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct JsStatement {
    pub code: String,
    pub declared: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopStatement {
    /// Header like `for (let i = 0; i < 10; i++)`.
    pub code: String,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopHeader {
    pub code: String,
    pub to_node: Option<usize>,
}

/// Marks where a jump to a `#`-prefixed label lands.
#[derive(Debug, Clone, PartialEq)]
pub struct FillSkip {
    pub label: SmolStr,
}

/// Stands in for a skip distance that is filled in by the matching [`FillSkip`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveSkip {
    pub target: SmolStr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndType {
    #[default]
    End,
    Restart,
}

impl EndType {
    pub fn code(self) -> i64 {
        match self {
            EndType::End => 0,
            EndType::Restart => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct End {
    pub ty: EndType,
    pub cond: Cond,
}

impl End {
    pub fn name(&self) -> &'static str {
        match (self.cond.is_always(), self.ty) {
            (true, EndType::End) => "EndEvent",
            (true, EndType::Restart) => "RestartEvent",
            (false, EndType::End) => "EndIf",
            (false, EndType::Restart) => "RestartIf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondAssignOp {
    Assign,
    AssignOr,
    AssignAnd,
}

impl CondAssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CondAssignOp::Assign => "=",
            CondAssignOp::AssignOr => "|=",
            CondAssignOp::AssignAnd => "&=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondAssign {
    pub to_cond: i32,
    pub to_var: Option<SmolStr>,
    pub op: CondAssignOp,
    pub cond: Cond,
}

impl CondAssign {
    pub fn target(&self) -> String {
        self.to_var
            .as_ref()
            .map(|var| var.to_string())
            .unwrap_or_else(|| format!("cond[{}]", self.to_cond))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GotoTarget {
    Label(SmolStr),
    /// Jump to the node with this [`Intermediate::id`]; resolved to a label later.
    Node(usize),
    /// Raw skip distance in instructions; resolved to a label later.
    SkipLines(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goto {
    pub target: GotoTarget,
    pub cond: Cond,
}

impl Goto {
    /// The call head up to the condition argument, like `GotoIf(L1`.
    pub fn head(&self) -> String {
        let conditional = !self.cond.is_always();
        let suffix = if conditional { "If" } else { "" };
        match &self.target {
            GotoTarget::Label(label) => format!("Goto{}({}", suffix, label),
            GotoTarget::Node(node) => format!("Goto{}Internal({}", suffix, node),
            GotoTarget::SkipLines(lines) => format!("SkipLines{}({}", suffix, lines),
        }
    }

    pub fn label(&self) -> Option<&SmolStr> {
        match &self.target {
            GotoTarget::Label(label) => Some(label),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    pub cond: Cond,
    pub true_body: Body,
    pub false_body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wait {
    pub cond: Cond,
    pub special: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntermediateKind {
    NoOp,
    Instr(Instr),
    Label(Label),
    JsStatement(JsStatement),
    LoopStatement(LoopStatement),
    LoopHeader(LoopHeader),
    LoopFooter,
    FillSkip(FillSkip),
    ReserveSkip(ReserveSkip),
    End(End),
    CondAssign(CondAssign),
    Goto(Goto),
    IfElse(IfElse),
    Wait(Wait),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    Cond,
    Skip,
    End,
    Goto,
    Wait,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlArg {
    Int(i64),
    ReserveSkip(SmolStr),
}

/// One statement of an event body.
#[derive(Debug, Clone, PartialEq)]
pub struct Intermediate {
    pub kind: IntermediateKind,
    /// Node index used as an internal jump target before labels are assigned.
    pub id: Option<usize>,
    /// Synthetic labels printed as `name:` before the statement.
    pub labels: Vec<SmolStr>,
    pub decorations: Vec<Decoration>,
    pub line_mapping: Option<LineMapping>,
    /// Preferred base name when a label has to be synthesized for this node.
    pub label_hint: Option<SmolStr>,
}

impl From<IntermediateKind> for Intermediate {
    fn from(kind: IntermediateKind) -> Self {
        Self::new(kind)
    }
}

impl Intermediate {
    pub fn new(kind: IntermediateKind) -> Self {
        Self {
            kind,
            id: None,
            labels: Vec::new(),
            decorations: Vec::new(),
            line_mapping: None,
            label_hint: None,
        }
    }

    pub fn noop() -> Self {
        Self::new(IntermediateKind::NoOp)
    }

    pub fn instr(name: &str, args: Vec<Arg>) -> Self {
        Self::new(IntermediateKind::Instr(Instr {
            id: None,
            name: SmolStr::new(name),
            args,
            layers: None,
        }))
    }

    pub fn label(num: u32) -> Self {
        Self::new(IntermediateKind::Label(Label { num }))
    }

    pub fn js(code: impl Into<String>, declared: Vec<SmolStr>) -> Self {
        Self::new(IntermediateKind::JsStatement(JsStatement {
            code: code.into(),
            declared,
        }))
    }

    pub fn loop_statement(code: impl Into<String>, body: Body) -> Self {
        Self::new(IntermediateKind::LoopStatement(LoopStatement {
            code: code.into(),
            body,
        }))
    }

    pub fn end(ty: EndType, cond: Cond) -> Self {
        Self::new(IntermediateKind::End(End { ty, cond }))
    }

    pub fn cond_assign(to_cond: i32, op: CondAssignOp, cond: Cond) -> Self {
        Self::new(IntermediateKind::CondAssign(CondAssign {
            to_cond,
            to_var: None,
            op,
            cond,
        }))
    }

    pub fn var_assign(to_var: &str, op: CondAssignOp, cond: Cond) -> Self {
        Self::new(IntermediateKind::CondAssign(CondAssign {
            to_cond: 0,
            to_var: Some(SmolStr::new(to_var)),
            op,
            cond,
        }))
    }

    pub fn goto(target: GotoTarget, cond: Cond) -> Self {
        Self::new(IntermediateKind::Goto(Goto { target, cond }))
    }

    pub fn if_else(cond: Cond, true_body: Body, false_body: Body) -> Self {
        Self::new(IntermediateKind::IfElse(IfElse {
            cond,
            true_body,
            false_body,
        }))
    }

    pub fn wait(cond: Cond) -> Self {
        Self::new(IntermediateKind::Wait(Wait {
            cond,
            special: false,
        }))
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| SmolStr::new(l)).collect();
        self
    }

    pub fn with_decorations(mut self, decorations: Vec<Decoration>) -> Self {
        self.decorations = decorations;
        self
    }

    pub fn with_line_mapping(mut self, mapping: LineMapping) -> Self {
        self.line_mapping = Some(mapping);
        self
    }

    pub fn with_label_hint(mut self, hint: &str) -> Self {
        self.label_hint = Some(SmolStr::new(hint));
        self
    }

    #[inline(always)]
    pub fn is_noop(&self) -> bool {
        matches!(self.kind, IntermediateKind::NoOp)
    }

    #[inline(always)]
    pub fn is_label(&self) -> bool {
        matches!(self.kind, IntermediateKind::Label(_))
    }

    /// Statements that only exist while passing script code through compilation.
    pub fn is_meta(&self) -> bool {
        matches!(
            self.kind,
            IntermediateKind::JsStatement(_)
                | IntermediateKind::LoopHeader(_)
                | IntermediateKind::LoopFooter
        )
    }

    /// Statements that compile to exactly one instruction. Labels count, since
    /// `L0`..`L20` are emitted as label commands.
    pub fn is_instruction(&self) -> bool {
        matches!(
            self.kind,
            IntermediateKind::Instr(_)
                | IntermediateKind::Label(_)
                | IntermediateKind::End(_)
                | IntermediateKind::CondAssign(_)
                | IntermediateKind::Goto(_)
                | IntermediateKind::Wait(_)
        )
    }

    pub fn cond(&self) -> Option<&Cond> {
        match &self.kind {
            IntermediateKind::End(End { cond, .. })
            | IntermediateKind::CondAssign(CondAssign { cond, .. })
            | IntermediateKind::Goto(Goto { cond, .. })
            | IntermediateKind::IfElse(IfElse { cond, .. })
            | IntermediateKind::Wait(Wait { cond, .. }) => Some(cond),
            _ => None,
        }
    }

    pub fn cond_mut(&mut self) -> Option<&mut Cond> {
        match &mut self.kind {
            IntermediateKind::End(End { cond, .. })
            | IntermediateKind::CondAssign(CondAssign { cond, .. })
            | IntermediateKind::Goto(Goto { cond, .. })
            | IntermediateKind::IfElse(IfElse { cond, .. })
            | IntermediateKind::Wait(Wait { cond, .. }) => Some(cond),
            _ => None,
        }
    }

    /// Nested bodies in execution order.
    pub fn bodies(&self) -> Vec<&Body> {
        match &self.kind {
            IntermediateKind::LoopStatement(l) => vec![&l.body],
            IntermediateKind::IfElse(i) => vec![&i.true_body, &i.false_body],
            _ => Vec::new(),
        }
    }

    pub fn bodies_mut(&mut self) -> Vec<&mut Body> {
        match &mut self.kind {
            IntermediateKind::LoopStatement(l) => vec![&mut l.body],
            IntermediateKind::IfElse(i) => vec![&mut i.true_body, &mut i.false_body],
            _ => Vec::new(),
        }
    }

    pub fn control_type(&self) -> Result<ControlType, IrError> {
        match &self.kind {
            IntermediateKind::End(_) => Ok(ControlType::End),
            IntermediateKind::CondAssign(_) | IntermediateKind::Wait(_) => Ok(ControlType::Cond),
            IntermediateKind::Goto(goto) => match &goto.target {
                GotoTarget::Label(label) if !label.starts_with('#') => Ok(ControlType::Goto),
                _ => Ok(ControlType::Skip),
            },
            _ => Err(IrError::NoControlArg {
                statement: self.to_string(),
            }),
        }
    }

    /// The numeric or placeholder argument the control statement compiles with.
    pub fn control_arg(&self) -> Result<ControlArg, IrError> {
        match &self.kind {
            IntermediateKind::End(end) => Ok(ControlArg::Int(end.ty.code())),
            IntermediateKind::CondAssign(assign) => Ok(ControlArg::Int(assign.to_cond.into())),
            IntermediateKind::Wait(_) => Ok(ControlArg::Int(0)),
            IntermediateKind::Goto(goto) => match &goto.target {
                GotoTarget::SkipLines(lines) => Ok(ControlArg::Int((*lines).into())),
                GotoTarget::Node(node) => Err(IrError::UnresolvedNode { node: *node }),
                GotoTarget::Label(label) => {
                    if let Some(id) = label_id(label) {
                        Ok(ControlArg::Int(id.into()))
                    } else if label.starts_with('#') {
                        Ok(ControlArg::ReserveSkip(label.clone()))
                    } else {
                        Err(IrError::UnresolvedLabel {
                            label: label.clone(),
                        })
                    }
                }
            },
            _ => Err(IrError::NoControlArg {
                statement: self.to_string(),
            }),
        }
    }

    /// Visits nested statements before the statement containing them.
    pub fn walk<'a, F>(&'a self, visitor: &mut F)
    where
        F: FnMut(&'a Intermediate),
    {
        for body in self.bodies() {
            walk_body(body, visitor);
        }
        visitor(self);
    }

    /// Rewrites nested statements, then this one. A visitor returning `Some`
    /// replaces the statement in its parent's slot.
    pub fn rewrite<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(&mut Intermediate) -> Option<Intermediate>,
    {
        for body in self.bodies_mut() {
            rewrite_body(body, visitor);
        }
        if let Some(replacement) = visitor(self) {
            *self = replacement;
        }
    }

    /// Moves this statement's decorations onto `other`, together with its line
    /// mapping and label hint.
    ///
    /// With `move_conds`, decorations inside this statement's condition are
    /// hoisted onto `other`, and decorations marked as belonging to a condition
    /// are pushed down into `other`'s condition when it has one.
    pub fn move_decorations_to(&mut self, other: &mut Intermediate, move_conds: bool) {
        if move_conds {
            if let Some(cond) = self.cond_mut() {
                let mut hoisted = cond.drain_decorations();
                other.decorations.append(&mut hoisted);
            }
            if let Some(other_cond) = other.cond_mut() {
                let (for_cond, rest): (Vec<_>, Vec<_>) =
                    self.decorations.drain(..).partition(|dec| dec.for_cond);
                other_cond.decorations.extend(for_cond);
                self.decorations = rest;
            }
        }
        other.decorations.append(&mut self.decorations);
        other.line_mapping = self.line_mapping;
        other.label_hint = self.label_hint.clone();
    }

    pub fn decorations_recursive(&self) -> Vec<&Decoration> {
        let mut decorations = Vec::new();
        self.walk(&mut |im| {
            decorations.extend(im.decorations.iter());
            if let Some(cond) = im.cond() {
                decorations.extend(cond.decorations_recursive());
            }
        });
        decorations
    }
}

pub fn walk_body<'a, F>(body: &'a [Intermediate], visitor: &mut F)
where
    F: FnMut(&'a Intermediate),
{
    for im in body {
        im.walk(visitor);
    }
}

pub fn rewrite_body<F>(body: &mut [Intermediate], visitor: &mut F)
where
    F: FnMut(&mut Intermediate) -> Option<Intermediate>,
{
    for im in body.iter_mut() {
        im.rewrite(visitor);
    }
}

impl fmt::Display for Intermediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IntermediateKind::NoOp => write!(f, "NoOp();"),
            IntermediateKind::Instr(instr) => write!(
                f,
                "{}({});",
                instr.name,
                arg_string(&instr.args, instr.layers.as_ref())
            ),
            IntermediateKind::Label(label) => write!(f, "{}:", label.name()),
            IntermediateKind::JsStatement(js) => write!(f, "{}", js.code),
            IntermediateKind::LoopStatement(LoopStatement { code, .. })
            | IntermediateKind::LoopHeader(LoopHeader { code, .. }) => write!(f, "{} {{", code),
            IntermediateKind::LoopFooter => write!(f, "}}"),
            IntermediateKind::FillSkip(fill) => write!(f, "_FillSkip(\"{}\");", fill.label),
            IntermediateKind::ReserveSkip(reserve) => {
                write!(f, "_ReserveSkip(\"{}\");", reserve.target)
            }
            IntermediateKind::End(end) => {
                if end.cond.is_always() {
                    write!(f, "{}();", end.name())
                } else {
                    write!(f, "{}({});", end.name(), end.cond.plain_string())
                }
            }
            IntermediateKind::CondAssign(assign) => write!(
                f,
                "{} {} {};",
                assign.target(),
                assign.op.as_str(),
                assign.cond.plain_string()
            ),
            IntermediateKind::Goto(goto) => {
                if goto.cond.is_always() {
                    write!(f, "{});", goto.head())
                } else {
                    write!(f, "{}, {});", goto.head(), goto.cond.plain_string())
                }
            }
            IntermediateKind::IfElse(if_else) => {
                write!(f, "if ({}) {{", if_else.cond.plain_string())
            }
            IntermediateKind::Wait(wait) => write!(f, "WaitFor({});", wait.cond.plain_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::cond::{CompareLhs, ComparisonType};

    fn flag(id: i64) -> Cond {
        Cond::cmd("EventFlag", vec![Arg::Int(id)])
    }

    #[rstest]
    #[case::noop(Intermediate::noop(), "NoOp();")]
    #[case::instr(
        Intermediate::instr("SetEventFlag", vec![Arg::Int(100), Arg::param("ON")]),
        "SetEventFlag(100, ON);"
    )]
    #[case::label(Intermediate::label(3), "L3:")]
    #[case::js(Intermediate::js("const x = 1;", vec![SmolStr::new("x")]), "const x = 1;")]
    #[case::loop_(Intermediate::loop_statement("for (let i = 0; i < 3; i++)", vec![]), "for (let i = 0; i < 3; i++) {")]
    #[case::end_event(Intermediate::end(EndType::End, Cond::always()), "EndEvent();")]
    #[case::restart_event(Intermediate::end(EndType::Restart, Cond::always()), "RestartEvent();")]
    #[case::end_if(Intermediate::end(EndType::End, flag(5)), "EndIf(EventFlag(5));")]
    #[case::restart_if(
        Intermediate::end(EndType::Restart, Cond::and(vec![flag(1), flag(2)])),
        "RestartIf(EventFlag(1) && EventFlag(2));"
    )]
    #[case::assign(Intermediate::cond_assign(-1, CondAssignOp::AssignOr, flag(3)), "cond[-1] |= EventFlag(3);")]
    #[case::var_assign(Intermediate::var_assign("area", CondAssignOp::Assign, flag(3)), "area = EventFlag(3);")]
    #[case::goto(Intermediate::goto(GotoTarget::Label(SmolStr::new("L2")), Cond::always()), "Goto(L2);")]
    #[case::goto_if(Intermediate::goto(GotoTarget::Label(SmolStr::new("L2")), flag(1)), "GotoIf(L2, EventFlag(1));")]
    #[case::goto_internal(Intermediate::goto(GotoTarget::Node(7), Cond::always()), "GotoInternal(7);")]
    #[case::goto_if_internal(Intermediate::goto(GotoTarget::Node(7), flag(1)), "GotoIfInternal(7, EventFlag(1));")]
    #[case::skip(Intermediate::goto(GotoTarget::SkipLines(2), Cond::always()), "SkipLines(2);")]
    #[case::skip_if(Intermediate::goto(GotoTarget::SkipLines(2), flag(1).negated()), "SkipLinesIf(2, !EventFlag(1));")]
    #[case::if_else(Intermediate::if_else(Cond::and(vec![flag(1), flag(2)]), vec![], vec![]), "if (EventFlag(1) && EventFlag(2)) {")]
    #[case::wait(
        Intermediate::wait(Cond::compare(ComparisonType::Greater, CompareLhs::Value(Arg::param("X0_4")), Arg::Int(0))),
        "WaitFor(X0_4 > 0);"
    )]
    #[case::fill(Intermediate::new(IntermediateKind::FillSkip(FillSkip { label: SmolStr::new("#a") })), "_FillSkip(\"#a\");")]
    #[case::reserve(Intermediate::new(IntermediateKind::ReserveSkip(ReserveSkip { target: SmolStr::new("#a") })), "_ReserveSkip(\"#a\");")]
    #[case::footer(Intermediate::new(IntermediateKind::LoopFooter), "}")]
    fn test_display(#[case] im: Intermediate, #[case] expected: &str) {
        assert_eq!(im.to_string(), expected);
    }

    #[test]
    fn test_instr_with_layers() {
        let mut im = Intermediate::instr("SetEventFlag", vec![Arg::Int(1)]);
        if let IntermediateKind::Instr(instr) = &mut im.kind {
            instr.layers = Some(Layers::from_layers(&[2]));
        }
        assert_eq!(im.to_string(), "SetEventFlag(1, $LAYERS(2));");
    }

    #[rstest]
    #[case::instr(Intermediate::instr("A", vec![]), true)]
    #[case::label(Intermediate::label(0), true)]
    #[case::wait(Intermediate::wait(flag(1)), true)]
    #[case::noop(Intermediate::noop(), false)]
    #[case::if_else(Intermediate::if_else(flag(1), vec![], vec![]), false)]
    #[case::js(Intermediate::js("let x = 1;", vec![]), false)]
    fn test_is_instruction(#[case] im: Intermediate, #[case] expected: bool) {
        assert_eq!(im.is_instruction(), expected);
    }

    #[rstest]
    #[case("L0", Some(0))]
    #[case("L20", Some(20))]
    #[case("L21", None)]
    #[case("L01", None)]
    #[case("L", None)]
    #[case("label", None)]
    fn test_label_id(#[case] name: &str, #[case] expected: Option<u32>) {
        assert_eq!(label_id(name), expected);
    }

    #[rstest]
    #[case(Intermediate::goto(GotoTarget::Label(SmolStr::new("L4")), Cond::always()), Ok(ControlArg::Int(4)))]
    #[case(Intermediate::goto(GotoTarget::Label(SmolStr::new("#skip")), Cond::always()), Ok(ControlArg::ReserveSkip(SmolStr::new("#skip"))))]
    #[case(Intermediate::goto(GotoTarget::SkipLines(3), Cond::always()), Ok(ControlArg::Int(3)))]
    #[case(Intermediate::goto(GotoTarget::Label(SmolStr::new("loop")), Cond::always()), Err(IrError::UnresolvedLabel { label: SmolStr::new("loop") }))]
    #[case(Intermediate::goto(GotoTarget::Node(2), Cond::always()), Err(IrError::UnresolvedNode { node: 2 }))]
    #[case(Intermediate::end(EndType::Restart, Cond::always()), Ok(ControlArg::Int(1)))]
    #[case(Intermediate::cond_assign(-3, CondAssignOp::Assign, Cond::always()), Ok(ControlArg::Int(-3)))]
    #[case(Intermediate::wait(flag(1)), Ok(ControlArg::Int(0)))]
    fn test_control_arg(#[case] im: Intermediate, #[case] expected: Result<ControlArg, IrError>) {
        assert_eq!(im.control_arg(), expected);
    }

    #[test]
    fn test_control_type() {
        let skip = Intermediate::goto(GotoTarget::Label(SmolStr::new("#a")), Cond::always());
        let goto = Intermediate::goto(GotoTarget::Label(SmolStr::new("L1")), Cond::always());
        assert_eq!(skip.control_type(), Ok(ControlType::Skip));
        assert_eq!(goto.control_type(), Ok(ControlType::Goto));
        assert!(
            Intermediate::if_else(flag(1), vec![], vec![])
                .control_type()
                .is_err()
        );
        assert!(Intermediate::if_else(flag(1), vec![], vec![]).control_arg().is_err());
    }

    #[test]
    fn test_walk_visits_children_first() {
        let im = Intermediate::if_else(
            flag(1),
            vec![Intermediate::instr("A", vec![])],
            vec![Intermediate::loop_statement(
                "while (true)",
                vec![Intermediate::instr("B", vec![])],
            )],
        );
        let mut visited = Vec::new();
        im.walk(&mut |im: &Intermediate| visited.push(im.to_string()));

        assert_eq!(
            visited,
            vec!["A();", "B();", "while (true) {", "if (EventFlag(1)) {"]
        );
    }

    #[test]
    fn test_rewrite_replaces_in_slot() {
        let mut body = vec![
            Intermediate::instr("A", vec![]),
            Intermediate::if_else(flag(1), vec![Intermediate::instr("A", vec![])], vec![]),
        ];

        rewrite_body(&mut body, &mut |im| match &im.kind {
            IntermediateKind::Instr(instr) if instr.name == "A" => {
                Some(Intermediate::instr("B", vec![]))
            }
            _ => None,
        });

        assert_eq!(body[0].to_string(), "B();");
        match &body[1].kind {
            IntermediateKind::IfElse(if_else) => {
                assert_eq!(if_else.true_body[0].to_string(), "B();")
            }
            _ => panic!("expected if/else"),
        }
    }

    #[test]
    fn test_move_decorations_to() {
        let mut from = Intermediate::goto(
            GotoTarget::Label(SmolStr::new("L0")),
            flag(1).with_decorations(vec![Decoration::pre_comment("// cond")]),
        )
        .with_decorations(vec![
            Decoration::pre_comment("// kept"),
            Decoration::post_comment("// for cond").with_for_cond(true),
        ])
        .with_line_mapping(LineMapping::single(4))
        .with_label_hint("start");
        let mut to = Intermediate::wait(flag(2));

        from.move_decorations_to(&mut to, true);

        assert!(from.decorations_recursive().is_empty());
        let comments = to
            .decorations
            .iter()
            .map(|d| d.comment.as_str())
            .collect::<Vec<_>>();
        assert_eq!(comments, vec!["// cond", "// kept"]);
        assert_eq!(to.cond().map(|c| c.decorations.len()), Some(1));
        assert_eq!(to.line_mapping, Some(LineMapping::single(4)));
        assert_eq!(to.label_hint.as_deref(), Some("start"));
    }

    #[test]
    fn test_move_decorations_without_conds() {
        let mut from = Intermediate::wait(
            flag(1).with_decorations(vec![Decoration::pre_comment("// cond")]),
        )
        .with_decorations(vec![Decoration::post_comment("// x").with_for_cond(true)]);
        let mut to = Intermediate::noop().with_line_mapping(LineMapping::single(9));

        from.move_decorations_to(&mut to, false);

        assert_eq!(to.decorations.len(), 1);
        assert_eq!(from.decorations_recursive().len(), 1);
        assert_eq!(to.line_mapping, None);
    }
}
