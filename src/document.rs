use std::path::Path;

use encoding_rs::Encoding;
use scraper::Html;

use crate::error::Result;

/// Collapse markup to one logical line: every line trimmed, then concatenated.
/// Non-breaking spaces become ordinary spaces so cell text parses cleanly.
pub fn normalize(markup: &str) -> String {
    markup
        .lines()
        .map(str::trim)
        .collect::<String>()
        .replace('\u{a0}', " ")
}

/// Read a stored page (UTF-8) and parse it into a document tree.
pub fn load(path: &Path) -> Result<Html> {
    load_with(path, encoding_rs::UTF_8)
}

pub fn load_with(path: &Path, encoding: &'static Encoding) -> Result<Html> {
    let bytes = std::fs::read(path)?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(Html::parse_document(&normalize(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;
    use std::io::Write;

    #[test]
    fn lines_are_trimmed_and_joined() {
        let raw = "<table>\n   <tr>\n\t<td> 12 </td>\n  </tr>\n</table>\n";
        assert_eq!(normalize(raw), "<table><tr><td> 12 </td></tr></table>");
    }

    #[test]
    fn nbsp_becomes_space() {
        assert_eq!(normalize("Sam\u{a0}Houston State"), "Sam Houston State");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load(Path::new("does/not/exist.txt")).is_err());
    }

    #[test]
    fn loads_stored_page() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(f, "<!--ID: 0xabc-->").unwrap();
        writeln!(f, "<html><body>\n  <h1>Ball\u{a0}State</h1>\n</body></html>").unwrap();

        let doc = load(f.path()).unwrap();
        let h1 = Selector::parse("h1").unwrap();
        let text: String = doc.select(&h1).next().unwrap().text().collect();
        assert_eq!(text, "Ball State");
    }
}
