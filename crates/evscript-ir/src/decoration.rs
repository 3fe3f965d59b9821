use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// A comment on its own line before the statement.
    PreComment,
    /// A comment appended after the statement on the same line.
    PostComment,
    /// A blank line before the statement.
    PreBlank,
}

/// A non-functional annotation attached to a statement or condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub position: usize,
    pub line: u32,
    pub comment: String,
    /// Set when the decoration originally belonged to a condition, so it can be
    /// pushed back down when statements are merged during repacking.
    pub for_cond: bool,
}

impl Decoration {
    pub fn new(kind: DecorationKind, comment: impl Into<String>) -> Self {
        Self {
            kind,
            position: 0,
            line: 0,
            comment: comment.into(),
            for_cond: false,
        }
    }

    pub fn pre_comment(comment: impl Into<String>) -> Self {
        Self::new(DecorationKind::PreComment, comment)
    }

    pub fn post_comment(comment: impl Into<String>) -> Self {
        Self::new(DecorationKind::PostComment, comment)
    }

    pub fn blank() -> Self {
        Self::new(DecorationKind::PreBlank, "")
    }

    pub fn at(mut self, line: u32, position: usize) -> Self {
        self.line = line;
        self.position = position;
        self
    }

    pub fn with_for_cond(mut self, for_cond: bool) -> Self {
        self.for_cond = for_cond;
        self
    }

    #[inline(always)]
    pub fn is_prefix(&self) -> bool {
        matches!(self.kind, DecorationKind::PreComment | DecorationKind::PreBlank)
    }

    #[inline(always)]
    pub fn is_suffix(&self) -> bool {
        matches!(self.kind, DecorationKind::PostComment)
    }

    /// The text this decoration contributes to a rendered line: the comment for
    /// a pre-comment, an empty line for a blank, and a space-led comment for a
    /// post-comment.
    pub fn text(&self) -> String {
        match self.kind {
            DecorationKind::PreComment => self.comment.clone(),
            DecorationKind::PreBlank => String::new(),
            DecorationKind::PostComment => format!(" {}", self.comment),
        }
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DecorationKind::PreComment => "PRE_COMMENT",
            DecorationKind::PostComment => "POST_COMMENT",
            DecorationKind::PreBlank => "PRE_BLANK",
        };
        write!(f, "{}[{}]", kind, self.comment)
    }
}

/// Splits decorations into standalone prefix lines and a concatenated line suffix.
pub fn split_decorations(decorations: &[Decoration]) -> (Vec<String>, String) {
    decorations
        .iter()
        .fold((Vec::new(), String::new()), |(mut prefixes, mut suffix), dec| {
            if dec.is_prefix() {
                prefixes.push(dec.text());
            } else {
                suffix.push_str(&dec.text());
            }
            (prefixes, suffix)
        })
}
