//! `evscript-formatter` prints event script IR back to source text.
//!
//! Each statement is laid out as a [`StringTree`] so long conditions wrap at the configured column
//! limit, and every statement with a source line mapping gets its printed line range stamped on
//! the way out.
//!
//! ## Example
//!
//! ```rust
//! use evscript_formatter::Formatter;
//! use evscript_ir::{
//!     Cond, EndType, EventFunction, EventId, Intermediate, LineMapping, RestBehavior,
//! };
//!
//! let func = EventFunction::new(EventId::Num(100), RestBehavior::Default).with_body(vec![
//!     Intermediate::end(EndType::End, Cond::always()).with_line_mapping(LineMapping::single(2)),
//! ]);
//!
//! let rendered = Formatter::default().format_function(&func).unwrap();
//!
//! assert_eq!(rendered.text, "Event(100, Default, function() {\n    EndEvent();\n});\n");
//! assert_eq!(rendered.mappings[0].printed_line, 2);
//! ```
mod config;
mod error;
mod formatter;
mod layout;
mod writer;

pub use config::{DEFAULT_DISAMBIGUATED_EVENTS, FormatterConfig, LabelDisambiguation};
pub use error::FormatError;
pub use formatter::{Formatter, Rendered};
pub use layout::{LayoutOptions, StringTree, ToStringTree, TreeDecorator, cond_tree};
pub use writer::LineTrackingWriter;
