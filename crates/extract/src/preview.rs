use crate::consts::PREVIEW_LINES;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// The first few lines of a file, decoded as (lossy) UTF-8.
///
/// Classification and every text-based extractor only ever look at this,
/// so a multi-megabyte recording costs no more to identify than a tiny one:
/// lines past the window are never decoded.
#[derive(Debug, Clone)]
pub struct Preview {
    lines: Vec<String>,
}
impl Preview {
    pub fn new(content: &[u8]) -> Self {
        let content = content.strip_prefix(BOM).unwrap_or(content);
        let lines = content
            .split_inclusive(|byte| *byte == b'\n')
            .take(PREVIEW_LINES)
            .map(|line| {
                let line = line.strip_suffix(b"\n").unwrap_or(line);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect();
        Self { lines }
    }

    /// `true` when there is nothing but whitespace to look at.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// First line that isn't blank.
    pub fn first_line(&self) -> Option<&str> {
        self.lines().find(|line| !line.trim().is_empty())
    }

    /// The preview joined back together, starting at the first non-blank
    /// line.
    pub(crate) fn text(&self) -> String {
        let start = self.lines.iter().position(|line| !line.trim().is_empty()).unwrap_or(self.lines.len());
        self.lines[start..].join("\n")
    }
}
