use evscript_ir::EventId;
use serde::Deserialize;

use crate::error::FormatError;

/// Events whose label declarations need renaming to avoid redeclaration
/// errors in scoped blocks.
pub const DEFAULT_DISAMBIGUATED_EVENTS: [i64; 3] = [11052860, 1600, 1601];

/// When repeated label declarations within one event get `_` suffixes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelDisambiguation {
    Never,
    Always,
    Events(Vec<i64>),
}

impl Default for LabelDisambiguation {
    fn default() -> Self {
        LabelDisambiguation::Events(DEFAULT_DISAMBIGUATED_EVENTS.to_vec())
    }
}

impl LabelDisambiguation {
    pub fn applies_to(&self, id: &EventId) -> bool {
        match self {
            LabelDisambiguation::Never => false,
            LabelDisambiguation::Always => true,
            LabelDisambiguation::Events(events) => {
                id.as_num().is_some_and(|id| events.contains(&id))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub indent_width: usize,
    /// Widest line, indent included, before a statement is wrapped.
    pub column_limit: usize,
    pub label_disambiguation: LabelDisambiguation,
    /// Reject functions with unresolved jumps or condition variables before printing.
    pub verify_references: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            column_limit: 100,
            label_disambiguation: LabelDisambiguation::default(),
            verify_references: false,
        }
    }
}

impl FormatterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, FormatError> {
        Ok(toml::from_str(s)?)
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_default() {
        let config = FormatterConfig::default();
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.column_limit, 100);
        assert_eq!(config.indent_unit(), "    ");
        assert!(!config.verify_references);
    }

    #[test]
    fn test_from_toml_str_fills_defaults() {
        let config = FormatterConfig::from_toml_str("column_limit = 80\n").unwrap();
        assert_eq!(config.column_limit, 80);
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.label_disambiguation, LabelDisambiguation::default());
    }

    #[test]
    fn test_from_toml_str_label_disambiguation() {
        let config = FormatterConfig::from_toml_str(
            "verify_references = true\nlabel_disambiguation = { events = [7, 8] }\n",
        )
        .unwrap();
        assert!(config.verify_references);
        assert_eq!(config.label_disambiguation, LabelDisambiguation::Events(vec![7, 8]));

        let config = FormatterConfig::from_toml_str("label_disambiguation = \"always\"\n").unwrap();
        assert_eq!(config.label_disambiguation, LabelDisambiguation::Always);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(matches!(
            FormatterConfig::from_toml_str("indent_width = \"wide\""),
            Err(FormatError::Config(_))
        ));
    }

    #[rstest]
    #[case::listed(LabelDisambiguation::default(), EventId::Num(1600), true)]
    #[case::unlisted(LabelDisambiguation::default(), EventId::Num(1602), false)]
    #[case::placeholder(LabelDisambiguation::default(), EventId::Placeholder("base + 1".into()), false)]
    #[case::always(LabelDisambiguation::Always, EventId::Placeholder("base".into()), true)]
    #[case::never(LabelDisambiguation::Never, EventId::Num(11052860), false)]
    fn test_applies_to(
        #[case] mode: LabelDisambiguation,
        #[case] id: EventId,
        #[case] expected: bool,
    ) {
        assert_eq!(mode.applies_to(&id), expected);
    }
}
