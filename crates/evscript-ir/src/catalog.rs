use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use smol_str::SmolStr;

use crate::{
    arg::{Arg, InstrId, Layers},
    intermediate::Instr,
};

/// Read-only instruction metadata keyed by command id.
pub trait InstructionCatalog {
    fn instruction(&self, id: InstrId) -> Option<&InstrDoc>;

    fn enum_doc(&self, name: &str) -> Option<&EnumDoc>;

    /// Shows an enum-typed value under its member name when the catalog knows it.
    fn display_arg(&self, doc: &ArgDoc, value: Arg) -> Arg {
        let display = doc
            .enum_name
            .as_deref()
            .and_then(|name| self.enum_doc(name))
            .zip(value.as_int())
            .and_then(|(enum_doc, n)| enum_doc.display_value(n));

        match display {
            Some(display) => Arg::Display {
                display: SmolStr::new(display),
                value: Box::new(value),
            },
            None => value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Emedf {
    #[serde(rename = "main_classes", default)]
    pub classes: Vec<ClassDoc>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
    #[serde(skip)]
    instr_index: FxHashMap<InstrId, (usize, usize)>,
    #[serde(skip)]
    enum_index: FxHashMap<String, usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDoc {
    pub name: String,
    pub index: i64,
    #[serde(rename = "instrs", default)]
    pub instructions: Vec<InstrDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrDoc {
    pub name: String,
    pub index: i64,
    #[serde(rename = "args", default)]
    pub arguments: Vec<ArgDoc>,
}

impl InstrDoc {
    /// The schema for the argument at `position`, repeating a trailing vararg.
    pub fn argument(&self, position: usize) -> Option<&ArgDoc> {
        self.arguments.get(position).or_else(|| {
            self.arguments
                .last()
                .filter(|last| last.vararg && position >= self.arguments.len())
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: i64,
    #[serde(default)]
    pub enum_name: Option<String>,
    #[serde(default)]
    pub default: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub increment: f64,
    #[serde(default)]
    pub format_string: Option<String>,
    #[serde(default)]
    pub vararg: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumDoc {
    pub name: String,
    /// Member names keyed by the integer value as text.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl EnumDoc {
    pub fn display_value(&self, value: i64) -> Option<String> {
        self.values
            .get(&value.to_string())
            .map(|member| format!("{}.{}", self.name.replace(' ', ""), member.replace(' ', "")))
    }
}

impl Emedf {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let mut emedf: Emedf = serde_json::from_str(json)?;
        emedf.build_index();
        Ok(emedf)
    }

    fn build_index(&mut self) {
        self.instr_index = self
            .classes
            .iter()
            .enumerate()
            .flat_map(|(class_pos, class)| {
                class
                    .instructions
                    .iter()
                    .enumerate()
                    .map(move |(instr_pos, instr)| {
                        (InstrId::new(class.index, instr.index), (class_pos, instr_pos))
                    })
            })
            .collect();
        self.enum_index = self
            .enums
            .iter()
            .enumerate()
            .map(|(pos, doc)| (doc.name.clone(), pos))
            .collect();
    }
}

impl InstructionCatalog for Emedf {
    fn instruction(&self, id: InstrId) -> Option<&InstrDoc> {
        self.instr_index
            .get(&id)
            .and_then(|(class_pos, instr_pos)| {
                self.classes.get(*class_pos)?.instructions.get(*instr_pos)
            })
    }

    fn enum_doc(&self, name: &str) -> Option<&EnumDoc> {
        self.enum_index.get(name).and_then(|pos| self.enums.get(*pos))
    }
}

impl Instr {
    /// Builds an instruction node from raw decompiled values.
    ///
    /// Unknown ids fall back to a name derived from the id, and arguments without
    /// a schema are kept as they are.
    pub fn from_catalog<C>(catalog: &C, id: InstrId, args: Vec<Arg>, layers: Option<Layers>) -> Self
    where
        C: InstructionCatalog + ?Sized,
    {
        match catalog.instruction(id) {
            Some(doc) => {
                let args = args
                    .into_iter()
                    .enumerate()
                    .map(|(position, value)| match doc.argument(position) {
                        Some(arg_doc) => catalog.display_arg(arg_doc, value),
                        None => value,
                    })
                    .collect();

                Instr {
                    id: Some(id),
                    name: SmolStr::new(&doc.name),
                    args,
                    layers,
                }
            }
            None => {
                tracing::debug!(%id, "instruction not found in catalog");
                Instr {
                    id: Some(id),
                    name: id.fallback_name(),
                    args,
                    layers,
                }
            }
        }
    }
}
