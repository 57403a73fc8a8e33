//! Line splitting for registry documents.

/// Splits a registry document into lines.
///
/// The published document uses `\r\n` terminators; cells may contain bare
/// `\n`, so those are only treated as terminators when the document has no
/// `\r\n` at all. A leading byte-order mark is dropped.
pub fn split_lines(raw: &str) -> Vec<&str> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.contains("\r\n") {
        raw.split("\r\n").collect()
    } else {
        raw.split('\n').collect()
    }
}

/// Splits one line into its header label and the per-record cells.
pub fn split_header(line: &str) -> (&str, Vec<&str>) {
    let mut fields = line.split('\t');
    let header = fields.next().unwrap_or_default();
    (header, fields.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_terminators_keep_inner_newlines() {
        let lines = split_lines("A\tx\ny\r\nB\tz\r\n");
        assert_eq!(lines, vec!["A\tx\ny", "B\tz", ""]);
    }

    #[test]
    fn test_lf_only_documents() {
        let lines = split_lines("\u{feff}A\t1\nB\t2");
        assert_eq!(lines, vec!["A\t1", "B\t2"]);
    }

    #[test]
    fn test_split_header() {
        assert_eq!(split_header("BBAN length\t23\t20"), ("BBAN length", vec!["23", "20"]));
        assert_eq!(split_header(""), ("", vec![]));
    }
}
