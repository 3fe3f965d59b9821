use std::{fmt, str::FromStr};

use itertools::Itertools;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{
    decoration::Decoration,
    intermediate::{Body, Intermediate, rewrite_body, walk_body},
    line_mapping::LineMapping,
};

/// An event id, or the source text standing in for it before it is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    Num(i64),
    Placeholder(String),
}

impl EventId {
    pub fn as_num(&self) -> Option<i64> {
        match self {
            EventId::Num(id) => Some(*id),
            EventId::Placeholder(_) => None,
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        EventId::Num(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Num(id) => write!(f, "{}", id),
            EventId::Placeholder(code) => write!(f, "{}", code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RestBehavior {
    #[default]
    Default,
    Restart,
    End,
}

impl fmt::Display for RestBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestBehavior::Default => "Default",
            RestBehavior::Restart => "Restart",
            RestBehavior::End => "End",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RestBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Default" => Ok(RestBehavior::Default),
            "Restart" => Ok(RestBehavior::Restart),
            "End" => Ok(RestBehavior::End),
            _ => Err(format!("Unknown rest behavior {}", s)),
        }
    }
}

/// A top-level `Event(id, restBehavior, function(params) { ... })` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventFunction {
    pub id: EventId,
    pub rest_behavior: RestBehavior,
    /// Declared with `$Event`, enabling structured control flow in the body.
    pub fancy: bool,
    pub params: Vec<SmolStr>,
    pub body: Body,
    pub name: Option<SmolStr>,
    /// Text printed verbatim before the declaration, such as a doc comment.
    pub header: Option<String>,
    pub header_line: Option<LineMapping>,
    /// Decorations printed before the closing `});`.
    pub end_comments: Vec<Decoration>,
    pub line_mapping: Option<LineMapping>,
    /// Condition group names recovered from a previous compile, by group index.
    pub cond_hints: FxHashMap<i32, SmolStr>,
}

impl Default for EventId {
    fn default() -> Self {
        EventId::Num(0)
    }
}

impl EventFunction {
    pub fn new(id: EventId, rest_behavior: RestBehavior) -> Self {
        Self {
            id,
            rest_behavior,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.params = params.iter().map(|p| SmolStr::new(p)).collect();
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_fancy(mut self, fancy: bool) -> Self {
        self.fancy = fancy;
        self
    }

    pub fn keyword(&self) -> &'static str {
        if self.fancy { "$Event" } else { "Event" }
    }

    pub fn walk<'a, F>(&'a self, visitor: &mut F)
    where
        F: FnMut(&'a Intermediate),
    {
        walk_body(&self.body, visitor);
    }

    pub fn rewrite<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(&mut Intermediate) -> Option<Intermediate>,
    {
        rewrite_body(&mut self.body, visitor);
    }

    /// Every decoration in the function, including those on conditions and the
    /// closing comments.
    pub fn decorations(&self) -> Vec<&Decoration> {
        let mut decorations = Vec::new();
        for im in &self.body {
            decorations.extend(im.decorations_recursive());
        }
        decorations.extend(self.end_comments.iter());
        decorations
    }
}

impl Intermediate {
    /// Moves this statement's decorations to the function's closing comments,
    /// for statements removed from the end of a body.
    pub fn move_decorations_to_function(&mut self, func: &mut EventFunction) {
        func.end_comments.append(&mut self.decorations);
    }
}

impl fmt::Display for EventFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, function({}) {{ {} }});",
            self.keyword(),
            self.id,
            self.rest_behavior,
            self.params.iter().join(","),
            self.body.iter().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arg, Cond, EndType};

    #[test]
    fn test_display_one_line() {
        let func = EventFunction::new(EventId::Num(100), RestBehavior::Default)
            .with_body(vec![Intermediate::end(EndType::End, Cond::always())]);

        assert_eq!(
            func.to_string(),
            "Event(100, Default, function() { EndEvent(); });"
        );
    }

    #[test]
    fn test_display_fancy_with_params() {
        let id = EventId::Placeholder("base + 5".into());
        let func = EventFunction::new(id, RestBehavior::Restart)
            .with_fancy(true)
            .with_params(&["X0_4", "X4_4"])
            .with_body(vec![Intermediate::instr("A", vec![Arg::param("X0_4")])]);

        assert_eq!(
            func.to_string(),
            "$Event(base + 5, Restart, function(X0_4,X4_4) { A(X0_4); });"
        );
    }

    #[test]
    fn test_rest_behavior_round_trip() {
        for rest in [RestBehavior::Default, RestBehavior::Restart, RestBehavior::End] {
            assert_eq!(rest.to_string().parse::<RestBehavior>(), Ok(rest));
        }
        assert!("Sometimes".parse::<RestBehavior>().is_err());
    }

    #[test]
    fn test_move_decorations_to_function() {
        let mut func = EventFunction::new(EventId::Num(1), RestBehavior::Default);
        let mut im = Intermediate::noop().with_decorations(vec![Decoration::pre_comment("// end")]);

        im.move_decorations_to_function(&mut func);

        assert!(im.decorations.is_empty());
        assert_eq!(func.decorations().len(), 1);
    }
}
