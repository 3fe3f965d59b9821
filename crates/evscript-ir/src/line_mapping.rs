use std::{cmp::Ordering, fmt};

/// Correlates a source line range with the lines it was printed on.
///
/// All lines are 1-indexed. Printed lines are zero until a renderer stamps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineMapping {
    pub source_line: u32,
    pub source_end_line: u32,
    pub printed_line: u32,
    pub printed_end_line: u32,
}

impl LineMapping {
    pub fn new(source_line: u32, source_end_line: u32) -> Self {
        Self {
            source_line,
            source_end_line: source_end_line.max(source_line),
            printed_line: 0,
            printed_end_line: 0,
        }
    }

    pub fn single(source_line: u32) -> Self {
        Self::new(source_line, source_line)
    }

    pub fn contains_source_line(&self, line: u32) -> bool {
        self.source_line <= line && line <= self.source_end_line
    }

    pub fn contains_printed_line(&self, line: u32) -> bool {
        self.printed_line <= line && line <= self.printed_end_line
    }
}

impl PartialOrd for LineMapping {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineMapping {
    fn cmp(&self, other: &Self) -> Ordering {
        self.printed_line
            .cmp(&other.printed_line)
            .then(self.printed_end_line.cmp(&other.printed_end_line))
            .then(self.source_line.cmp(&other.source_line))
            .then(self.source_end_line.cmp(&other.source_end_line))
    }
}

impl fmt::Display for LineMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineMapping{{output={}, source={}:{}}}",
            self.printed_line, self.source_line, self.source_end_line
        )
    }
}

/// Finds the mapping whose printed range contains `printed_line`.
pub fn source_line_for(mappings: &[LineMapping], printed_line: u32) -> Option<u32> {
    mappings
        .iter()
        .filter(|m| m.contains_printed_line(printed_line))
        .max_by_key(|m| m.printed_line)
        .map(|m| m.source_line)
}

/// Finds the first printed line for the statement covering `source_line`.
pub fn printed_line_for(mappings: &[LineMapping], source_line: u32) -> Option<u32> {
    mappings
        .iter()
        .filter(|m| m.contains_source_line(source_line))
        .min_by_key(|m| m.source_end_line - m.source_line)
        .map(|m| m.printed_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(source: u32, source_end: u32, line: u32, end: u32) -> LineMapping {
        LineMapping {
            source_line: source,
            source_end_line: source_end,
            printed_line: line,
            printed_end_line: end,
        }
    }

    #[test]
    fn test_new_clamps_end_line() {
        let mapping = LineMapping::new(10, 3);
        assert_eq!(mapping.source_end_line, 10);
    }

    #[test]
    fn test_ordering_by_printed_line() {
        let mut mappings = vec![printed(1, 1, 5, 5), printed(9, 9, 2, 3)];
        mappings.sort();
        assert_eq!(mappings[0].source_line, 9);
    }

    #[test]
    fn test_lookups() {
        let mappings = vec![printed(1, 1, 2, 2), printed(3, 6, 3, 5), printed(4, 4, 4, 4)];

        assert_eq!(source_line_for(&mappings, 4), Some(4));
        assert_eq!(source_line_for(&mappings, 5), Some(3));
        assert_eq!(source_line_for(&mappings, 9), None);
        assert_eq!(printed_line_for(&mappings, 4), Some(4));
        assert_eq!(printed_line_for(&mappings, 5), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            printed(3, 4, 7, 8).to_string(),
            "LineMapping{output=7, source=3:4}"
        );
    }
}
