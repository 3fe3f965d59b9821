use std::fmt;

use evscript_ir::LineMapping;

/// Text sink that counts the newlines written through it.
#[derive(Debug, Default)]
pub struct LineTrackingWriter<W> {
    inner: W,
    line: u32,
}

impl<W: fmt::Write> LineTrackingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, line: 0 }
    }

    /// Newlines written so far, which is the 0-based index of the current line.
    #[inline(always)]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Stamps the 1-indexed line the next output starts on.
    pub fn record_mapping(&self, mapping: &mut LineMapping) {
        mapping.printed_line = self.line + 1;
        mapping.printed_end_line = mapping.printed_line;
    }

    /// Stamps the last line written so far as the end of the mapping.
    pub fn post_mapping(&self, mapping: &mut LineMapping) {
        mapping.printed_end_line = self.line.max(mapping.printed_line);
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: fmt::Write> fmt::Write for LineTrackingWriter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.line += s.bytes().filter(|b| *b == b'\n').count() as u32;
        self.inner.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;

    #[test]
    fn test_counts_lines() {
        let mut writer = LineTrackingWriter::new(String::new());
        write!(writer, "a\nb").unwrap();
        assert_eq!(writer.line(), 1);
        writeln!(writer, "c\n").unwrap();
        assert_eq!(writer.line(), 3);
        assert_eq!(writer.into_inner(), "a\nbc\n\n");
    }

    #[test]
    fn test_mapping_spans_written_lines() {
        let mut writer = LineTrackingWriter::new(String::new());
        writeln!(writer, "Event(0, Default, function() {{").unwrap();

        let mut mapping = LineMapping::new(10, 12);
        writer.record_mapping(&mut mapping);
        writeln!(writer, "    WaitFor(\n        EventFlag(1));").unwrap();
        writer.post_mapping(&mut mapping);

        assert_eq!(mapping.printed_line, 2);
        assert_eq!(mapping.printed_end_line, 3);
        assert_eq!(mapping.source_line, 10);
    }

    #[test]
    fn test_post_mapping_without_output() {
        let writer = LineTrackingWriter::new(String::new());
        let mut mapping = LineMapping::single(1);
        writer.record_mapping(&mut mapping);
        writer.post_mapping(&mut mapping);
        assert_eq!((mapping.printed_line, mapping.printed_end_line), (1, 1));
    }
}
