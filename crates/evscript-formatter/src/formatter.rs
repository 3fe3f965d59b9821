use std::fmt::{self, Write};

use evscript_ir::{
    Decoration, EventFunction, Intermediate, IntermediateKind, LineMapping, passes,
    source_line_for, split_decorations,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::{
    config::FormatterConfig,
    error::FormatError,
    layout::{LayoutOptions, ToStringTree},
    writer::LineTrackingWriter,
};

/// Formatted text together with the line mappings stamped while printing it,
/// in the order they were emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub mappings: Vec<LineMapping>,
}

impl Rendered {
    pub fn source_line_for(&self, printed_line: u32) -> Option<u32> {
        source_line_for(&self.mappings, printed_line)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    pub fn new(config: Option<FormatterConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn format_function(&self, func: &EventFunction) -> Result<Rendered, FormatError> {
        self.format_functions(std::slice::from_ref(func))
    }

    /// Formats consecutive event functions separated by blank lines.
    pub fn format_functions(&self, funcs: &[EventFunction]) -> Result<Rendered, FormatError> {
        let mut text = String::new();
        let mappings = self.format_functions_to(funcs, &mut text)?;
        Ok(Rendered { text, mappings })
    }

    /// Streams the formatted functions into `out`, returning the line mappings.
    pub fn format_functions_to<W: fmt::Write>(
        &self,
        funcs: &[EventFunction],
        out: W,
    ) -> Result<Vec<LineMapping>, FormatError> {
        let mut printer = Printer::new(&self.config, out);

        for (i, func) in funcs.iter().enumerate() {
            if i > 0 {
                printer.writer.write_char('\n')?;
            }
            printer.print_function(func)?;
        }

        Ok(printer.mappings)
    }
}

struct Printer<'a, W> {
    config: &'a FormatterConfig,
    options: LayoutOptions,
    writer: LineTrackingWriter<W>,
    mappings: Vec<LineMapping>,
    used_labels: FxHashSet<String>,
    disambiguate_labels: bool,
}

impl<'a, W: fmt::Write> Printer<'a, W> {
    fn new(config: &'a FormatterConfig, out: W) -> Self {
        Self {
            config,
            options: LayoutOptions::from(config),
            writer: LineTrackingWriter::new(out),
            mappings: Vec::new(),
            used_labels: FxHashSet::default(),
            disambiguate_labels: false,
        }
    }

    fn print_function(&mut self, func: &EventFunction) -> Result<(), FormatError> {
        if self.config.verify_references {
            passes::verify_references(func)?;
        }

        self.used_labels.clear();
        self.disambiguate_labels = self.config.label_disambiguation.applies_to(&func.id);

        if let Some(header) = &func.header {
            let mapping = self.record_mapping(func.header_line.as_ref());
            self.writer.write_str(header)?;
            if !header.ends_with('\n') {
                self.writer.write_char('\n')?;
            }
            self.post_mapping(mapping);
        }

        let mapping = self.record_mapping(func.line_mapping.as_ref());
        writeln!(
            self.writer,
            "{}({}, {}, function({}) {{",
            func.keyword(),
            func.id,
            func.rest_behavior,
            func.params.join(", ")
        )?;

        self.print_body(&func.body, 1, "")?;

        let indent = self.options.indent.clone();
        let suffix = self.print_decorations(&func.end_comments, &indent)?;
        writeln!(self.writer, "}});{}", suffix)?;
        self.post_mapping(mapping);

        debug!(event = %func.id, lines = self.writer.line(), "formatted event");
        Ok(())
    }

    fn print_body(
        &mut self,
        body: &[Intermediate],
        indent: usize,
        prefix: &str,
    ) -> Result<(), FormatError> {
        let sp = self.options.indent.repeat(indent);
        let mut prefix = prefix;
        let mut prev_label = false;

        for (pos, im) in body.iter().enumerate() {
            let suffix = self.print_decorations(&im.decorations, &sp)?;
            for label in &im.labels {
                let label = self.declare_label(label);
                writeln!(self.writer, "{}:", label)?;
            }
            let mapping = self.record_mapping(im.line_mapping.as_ref());

            match &im.kind {
                IntermediateKind::NoOp
                    if im.labels.is_empty() && !prev_label && suffix.is_empty() =>
                {
                    trace!("skipped NoOp without label");
                }
                IntermediateKind::Label(label) => {
                    let name = self.declare_label(&label.name());
                    writeln!(self.writer, "{}:{}", name, suffix)?;
                    if pos + 1 == body.len() {
                        writeln!(self.writer, "{}NoOp();", sp)?;
                    }
                }
                _ => {
                    let line = im
                        .to_string_tree()
                        .render_line(&sp, prefix, &suffix, &self.options);
                    self.writer.write_str(&line)?;
                    self.post_mapping(mapping);

                    match &im.kind {
                        IntermediateKind::IfElse(if_else) => {
                            self.print_body(&if_else.true_body, indent + 1, "")?;
                            match if_else.false_body.as_slice() {
                                [] => writeln!(self.writer, "{}}}", sp)?,
                                [else_if]
                                    if matches!(else_if.kind, IntermediateKind::IfElse(_))
                                        && else_if.labels.is_empty() =>
                                {
                                    self.print_body(&if_else.false_body, indent, "} else ")?
                                }
                                false_body => {
                                    writeln!(self.writer, "{}}} else {{", sp)?;
                                    self.print_body(false_body, indent + 1, "")?;
                                    writeln!(self.writer, "{}}}", sp)?;
                                }
                            }
                        }
                        IntermediateKind::LoopStatement(loop_statement) => {
                            self.print_body(&loop_statement.body, indent + 1, "")?;
                            writeln!(self.writer, "{}}}", sp)?;
                        }
                        _ => {}
                    }
                }
            }

            prev_label = im.is_label();
            prefix = "";
        }

        Ok(())
    }

    /// Writes the standalone comment and blank lines, returning the line suffix.
    fn print_decorations(
        &mut self,
        decorations: &[Decoration],
        sp: &str,
    ) -> Result<String, FormatError> {
        let (prefixes, suffix) = split_decorations(decorations);
        for line in prefixes {
            if line.is_empty() {
                self.writer.write_char('\n')?;
            } else {
                writeln!(self.writer, "{}{}", sp, line)?;
            }
        }
        Ok(suffix)
    }

    fn declare_label(&mut self, label: &str) -> String {
        if !self.disambiguate_labels {
            return label.to_string();
        }

        let mut name = label.to_string();
        while self.used_labels.contains(&name) {
            name.push('_');
        }
        if name != label {
            debug!(label, renamed = %name, "disambiguated label");
        }
        self.used_labels.insert(name.clone());
        name
    }

    fn record_mapping(&mut self, mapping: Option<&LineMapping>) -> Option<usize> {
        let mut mapping = *mapping?;
        self.writer.record_mapping(&mut mapping);
        self.mappings.push(mapping);
        Some(self.mappings.len() - 1)
    }

    fn post_mapping(&mut self, index: Option<usize>) {
        if let Some(mapping) = index.and_then(|i| self.mappings.get_mut(i)) {
            self.writer.post_mapping(mapping);
        }
    }
}
