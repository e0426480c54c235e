// Shared tabular-text plumbing for the counter and lane tables.
//
// Both tables arrive as loosely formatted delimited text: an optional UTF-8
// BOM, `#` comment lines, blank lines, and a delimiter that may be a comma,
// semicolon or tab. This module normalizes that into a header row plus raw
// records and leaves column interpretation to the callers.

use std::io::Read;

use tracing::{debug, warn};

/// A delimited table split into a normalized header row and data records.
#[derive(Debug)]
pub(crate) struct RawTable {
    /// Header cells, quote-stripped, trimmed and lower-cased.
    pub headers: Vec<String>,
    pub records: Vec<csv::StringRecord>,
}

impl RawTable {
    /// Index of the first synonym (in the given order) present in the header.
    ///
    /// When a header name appears more than once the last occurrence wins.
    pub fn column(&self, synonyms: &[&str]) -> Option<usize> {
        synonyms
            .iter()
            .find_map(|name| self.headers.iter().rposition(|h| h == name))
    }
}

/// Pick the delimiter from a sample line: tab, then semicolon, then comma.
pub(crate) fn sniff_delimiter(line: &str) -> u8 {
    if line.contains('\t') {
        b'\t'
    } else if line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Trim a cell and drop one leading and one trailing quote character.
pub(crate) fn strip_quotes(cell: &str) -> &str {
    let s = cell.trim();
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    let s = s.strip_suffix(['"', '\'']).unwrap_or(s);
    s.trim()
}

/// Read a delimited table. Returns `None` when the input cannot be read or
/// holds no header line; malformed records are skipped with a warning.
pub(crate) fn read_table<R: Read>(mut rdr: R, label: &str) -> Option<RawTable> {
    let mut text = String::new();
    if let Err(e) = rdr.read_to_string(&mut text) {
        warn!("failed to read {label} table: {e}");
        return None;
    }

    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let Some(first) = lines.first() else {
        debug!("{label} table is empty");
        return None;
    };
    let delimiter = sniff_delimiter(first);

    // Each line is its own record: an unbalanced quote must not run on into
    // the following rows.
    let headers = match parse_line(first, delimiter) {
        Ok(Some(h)) => h
            .iter()
            .map(|cell| strip_quotes(cell).to_lowercase())
            .collect(),
        Ok(None) => return None,
        Err(e) => {
            warn!("unreadable {label} header row: {e}");
            return None;
        }
    };

    let mut records = Vec::new();
    for line in &lines[1..] {
        match parse_line(line, delimiter) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("skipping malformed {label} row: {e}"),
        }
    }

    Some(RawTable { headers, records })
}

fn parse_line(line: &str, delimiter: u8) -> Result<Option<csv::StringRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let record = reader.records().next().transpose();
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_tab_before_semicolon_before_comma() {
        assert_eq!(sniff_delimiter("a\tb;c,d"), b'\t');
        assert_eq!(sniff_delimiter("a;b,c"), b';');
        assert_eq!(sniff_delimiter("a,b"), b',');
        assert_eq!(sniff_delimiter("abc"), b',');
    }

    #[test]
    fn strip_quotes_handles_both_quote_kinds() {
        assert_eq!(strip_quotes("  \"Aamon\" "), "Aamon");
        assert_eq!(strip_quotes("'Fanny'"), "Fanny");
        assert_eq!(strip_quotes("Chang'e"), "Chang'e");
        assert_eq!(strip_quotes(""), "");
    }

    #[test]
    fn read_table_skips_bom_comments_and_blank_lines() {
        let text = "\u{feff}# exported 2024\n\nHero;Lane\n# note\nAamon;Jungle\n\n";
        let table = read_table(text.as_bytes(), "test").unwrap();
        assert_eq!(table.headers, vec!["hero", "lane"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].get(0), Some("Aamon"));
        assert_eq!(table.records[0].get(1), Some("Jungle"));
    }

    #[test]
    fn read_table_empty_input_is_none() {
        assert!(read_table("".as_bytes(), "test").is_none());
        assert!(read_table("# only a comment\n".as_bytes(), "test").is_none());
    }

    #[test]
    fn column_prefers_synonym_order() {
        let table = read_table("enemy,hero,my_hero\n".as_bytes(), "test").unwrap();
        assert_eq!(table.column(&["my_hero", "hero"]), Some(2));
        assert_eq!(table.column(&["hero"]), Some(1));
        assert_eq!(table.column(&["score"]), None);
    }

    #[test]
    fn unbalanced_quote_only_affects_its_own_line() {
        let text = "hero,lane\n\"Aamon,Jungle\nFanny,Jungle\nKhufra,Roam\n";
        let table = read_table(text.as_bytes(), "test").unwrap();
        let heroes: Vec<_> = table.records.iter().filter_map(|r| r.get(0)).collect();
        assert!(heroes.ends_with(&["Fanny", "Khufra"]));
        assert_eq!(table.records.last().and_then(|r| r.get(1)), Some("Roam"));
    }
}
