use std::mem;

use evscript_ir::{Cond, CondKind, Decoration, Intermediate, IntermediateKind, split_decorations};

use crate::config::FormatterConfig;

#[inline(always)]
fn width(s: &str) -> usize {
    s.chars().count()
}

/// Line budget and indent unit used while laying out one statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    pub column_limit: usize,
    pub indent: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&FormatterConfig::default())
    }
}

impl From<&FormatterConfig> for LayoutOptions {
    fn from(config: &FormatterConfig) -> Self {
        Self {
            column_limit: config.column_limit,
            indent: config.indent_unit(),
        }
    }
}

/// Comment lines and line suffixes collected while a statement is laid out.
///
/// Prefix lines are flushed before the next line that starts, and the suffix is
/// flushed at the next line that ends.
#[derive(Clone, Debug, Default)]
pub struct TreeDecorator {
    prefixes: Vec<String>,
    suffix: String,
}

impl TreeDecorator {
    pub fn add(&mut self, decorations: &[Decoration]) {
        let (prefixes, suffix) = split_decorations(decorations);
        self.prefixes.extend(prefixes);
        self.suffix.push_str(&suffix);
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.suffix.is_empty()
    }

    fn flush_prefixes(&mut self, sp: &str, out: &mut String) {
        for prefix in self.prefixes.drain(..) {
            if !prefix.is_empty() {
                out.push_str(sp);
                out.push_str(&prefix);
            }
            out.push('\n');
        }
    }

    /// A complete line at indent `sp`.
    pub fn wrap_line(&mut self, text: &str, sp: &str) -> String {
        let mut out = String::new();
        self.flush_prefixes(sp, &mut out);
        out.push_str(sp);
        out.push_str(text);
        out.push_str(&mem::take(&mut self.suffix));
        out.push('\n');
        out
    }

    /// A line at indent `sp` that is ended by the caller.
    pub fn wrap_line_start(&mut self, text: &str, sp: &str) -> String {
        let mut out = String::new();
        self.flush_prefixes(sp, &mut out);
        out.push_str(sp);
        out.push_str(text);
        out
    }

    /// The rest of a line started by the caller.
    pub fn wrap_line_end(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.suffix.len() + 1);
        out.push_str(text);
        out.push_str(&mem::take(&mut self.suffix));
        out.push('\n');
        out
    }
}

/// Fragment tree for one statement, used to decide where it wraps.
///
/// Its width is computed once at construction and never includes decorations.
#[derive(Clone, Debug, PartialEq)]
pub struct StringTree {
    start: String,
    children: Vec<StringTree>,
    separator: String,
    end: String,
    decorations: Vec<Decoration>,
    width: usize,
}

impl StringTree {
    pub fn new(
        start: impl Into<String>,
        children: Vec<StringTree>,
        separator: impl Into<String>,
        end: impl Into<String>,
        decorations: Vec<Decoration>,
    ) -> Self {
        let start = start.into();
        let separator = separator.into();
        let end = end.into();
        let width = width(&start)
            + width(&end)
            + children.iter().map(|child| child.width).sum::<usize>()
            + width(&separator) * children.len().saturating_sub(1);

        Self {
            start,
            children,
            separator,
            end,
            decorations,
            width,
        }
    }

    pub fn leaf(text: impl Into<String>, decorations: Vec<Decoration>) -> Self {
        Self::new(text, Vec::new(), "", "", decorations)
    }

    /// `start` stays on the enclosing line and `mid` may move to its own line.
    pub fn isolated_start(
        start: impl Into<String>,
        mid: StringTree,
        end: impl Into<String>,
    ) -> Self {
        Self::new("", vec![Self::leaf(start, Vec::new()), mid], "", end, Vec::new())
    }

    /// `start` and `end` stay attached to whatever `mid` renders as.
    pub fn combined_start(
        start: impl Into<String>,
        mid: StringTree,
        end: impl Into<String>,
    ) -> Self {
        Self::new(start, vec![mid], "", end, Vec::new())
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Flattened text without decorations.
    pub fn one_line(&self) -> String {
        let mut out = String::with_capacity(self.width);
        self.render_one_line(&mut out, &mut TreeDecorator::default());
        out
    }

    fn render_one_line(&self, out: &mut String, decorator: &mut TreeDecorator) {
        decorator.add(&self.decorations);
        out.push_str(&self.start);
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.separator);
            }
            child.render_one_line(out, decorator);
        }
        out.push_str(&self.end);
    }

    /// Renders the tree starting at `column` on a line indented by `sp`, with
    /// `trailing` more characters following it on its last line.
    ///
    /// The result has no leading indent and no final newline.
    pub fn render(
        &self,
        sp: &str,
        column: usize,
        trailing: usize,
        options: &LayoutOptions,
        decorator: &mut TreeDecorator,
    ) -> String {
        let fits = column + self.width + trailing <= options.column_limit;

        match self.children.as_slice() {
            [child] if !fits => {
                decorator.add(&self.decorations);
                let inner = child.render(
                    sp,
                    column + width(&self.start),
                    trailing + width(&self.end),
                    options,
                    decorator,
                );
                format!("{}{}{}", self.start, inner, self.end)
            }
            [first, middle @ .., last] if !fits => {
                decorator.add(&self.decorations);
                let inner_sp = format!("{}{}", sp, options.indent);
                let separator = self.separator.trim_start();
                let inner_column = width(&inner_sp) + width(separator);

                let first = first.render(sp, column + width(&self.start), 0, options, decorator);
                let first_line = format!("{}{}", self.start, first);
                let mut out = decorator.wrap_line_end(first_line.trim_end());

                for child in middle {
                    let text = child.render(&inner_sp, inner_column, 0, options, decorator);
                    let line = format!("{}{}", separator, text);
                    out.push_str(&decorator.wrap_line(&line, &inner_sp));
                }

                let text = last.render(
                    &inner_sp,
                    inner_column,
                    width(&self.end) + trailing,
                    options,
                    decorator,
                );
                let line = format!("{}{}{}", separator, text, self.end);
                out.push_str(&decorator.wrap_line_start(&line, &inner_sp));
                out
            }
            _ => {
                let mut out = String::with_capacity(self.width);
                self.render_one_line(&mut out, decorator);
                out
            }
        }
    }

    /// Renders a complete statement at indent `sp`, with its comment lines and a
    /// final newline.
    pub fn render_line(
        &self,
        sp: &str,
        prefix: &str,
        suffix: &str,
        options: &LayoutOptions,
    ) -> String {
        let mut decorator = TreeDecorator::default();
        let text = self.render(sp, width(sp) + width(prefix), 0, options, &mut decorator);
        decorator.wrap_line(&format!("{}{}{}", prefix, text, suffix), sp)
    }
}

pub trait ToStringTree {
    fn to_string_tree(&self) -> StringTree;
}

/// Layout of a condition. With `strip_parens`, a non-negated combination drops
/// its enclosing parentheses, as in argument position.
pub fn cond_tree(cond: &Cond, strip_parens: bool) -> StringTree {
    match &cond.kind {
        CondKind::Op(op) => {
            let children = op.ops.iter().map(|op| cond_tree(op, false)).collect();
            let (start, end) = if strip_parens && !cond.negate && !op.ops.is_empty() {
                ("", "")
            } else if cond.negate {
                ("!(", ")")
            } else {
                ("(", ")")
            };
            StringTree::new(start, children, op.separator(), end, cond.decorations.clone())
        }
        _ => StringTree::leaf(cond.to_string(), cond.decorations.clone()),
    }
}

impl ToStringTree for Cond {
    fn to_string_tree(&self) -> StringTree {
        cond_tree(self, false)
    }
}

impl ToStringTree for Intermediate {
    fn to_string_tree(&self) -> StringTree {
        match &self.kind {
            IntermediateKind::End(end) if end.cond.is_always() => {
                StringTree::leaf(self.to_string(), end.cond.decorations.clone())
            }
            IntermediateKind::End(end) => StringTree::isolated_start(
                format!("{}(", end.name()),
                cond_tree(&end.cond, true),
                ");",
            ),
            IntermediateKind::CondAssign(assign) => StringTree::combined_start(
                format!("{} {} ", assign.target(), assign.op.as_str()),
                cond_tree(&assign.cond, true),
                ";",
            ),
            IntermediateKind::Goto(goto) if goto.cond.is_always() => {
                StringTree::leaf(self.to_string(), goto.cond.decorations.clone())
            }
            IntermediateKind::Goto(goto) => StringTree::isolated_start(
                format!("{}, ", goto.head()),
                cond_tree(&goto.cond, true),
                ");",
            ),
            IntermediateKind::IfElse(if_else) => {
                StringTree::combined_start("if (", cond_tree(&if_else.cond, true), ") {")
            }
            IntermediateKind::Wait(wait) => {
                StringTree::isolated_start("WaitFor(", cond_tree(&wait.cond, true), ");")
            }
            _ => StringTree::leaf(self.to_string(), Vec::new()),
        }
    }
}
