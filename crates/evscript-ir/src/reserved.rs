use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Argument shapes of reserved words that are not plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinArg {
    Cond,
    Label,
    Layers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuiltIn {
    pub args: Option<&'static [BuiltinArg]>,
    pub doc: Option<&'static str>,
    /// Highlighted as control flow by editors that opt into it.
    pub highlight: bool,
    /// Always followed by `(` and used as a statement.
    pub control_statement: bool,
}

/// Keywords that user code may not redefine, with editor documentation.
pub static RESERVED_WORDS: LazyLock<FxHashMap<&'static str, BuiltIn>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();

    map.insert(
        "EndEvent",
        BuiltIn {
            doc: Some("Stops execution in the event and turns its flag on."),
            control_statement: true,
            ..Default::default()
        },
    );
    map.insert(
        "RestartEvent",
        BuiltIn {
            doc: Some(
                "Stops execution in the event, turns its flags on, and continues from the top on the next frame.",
            ),
            control_statement: true,
            ..Default::default()
        },
    );
    map.insert(
        "EndIf",
        BuiltIn {
            args: Some(&[BuiltinArg::Cond]),
            doc: Some("If the condition is true, stops execution in the event and turns its flag on."),
            highlight: true,
            control_statement: true,
        },
    );
    map.insert(
        "RestartIf",
        BuiltIn {
            args: Some(&[BuiltinArg::Cond]),
            doc: Some(
                "If the condition is true, stops execution in the event, turns its flags on, and continues from the top on the next frame.",
            ),
            highlight: true,
            control_statement: true,
        },
    );
    map.insert(
        "Goto",
        BuiltIn {
            args: Some(&[BuiltinArg::Label]),
            doc: Some("Unconditionally goes to the next instance of the given label."),
            highlight: true,
            control_statement: true,
        },
    );
    map.insert(
        "GotoIf",
        BuiltIn {
            args: Some(&[BuiltinArg::Label, BuiltinArg::Cond]),
            doc: Some("Goes to the next instance of the given label if the condition is true."),
            highlight: true,
            control_statement: true,
        },
    );
    map.insert(
        "WaitFor",
        BuiltIn {
            args: Some(&[BuiltinArg::Cond]),
            doc: Some(
                "Waits for the condition to become true. After this, all condition variables are reset.",
            ),
            highlight: true,
            control_statement: true,
        },
    );
    map.insert(
        "NoOp",
        BuiltIn {
            args: Some(&[]),
            doc: Some("Does nothing. Not an instruction. Exists only as a target for labels."),
            control_statement: true,
            ..Default::default()
        },
    );
    map.insert("Event", BuiltIn::default());
    map.insert("$Event", BuiltIn::default());
    map.insert(
        "$LAYERS",
        BuiltIn {
            args: Some(&[BuiltinArg::Layers]),
            doc: Some(
                "Added to the end of an instruction argument list to make it only run in certain ceremony layers.",
            ),
            ..Default::default()
        },
    );

    map
});

pub fn reserved_word(name: &str) -> Option<&'static BuiltIn> {
    RESERVED_WORDS.get(name)
}

#[inline(always)]
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains_key(name)
}
