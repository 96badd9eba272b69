use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelTableError {
    #[error("labels file contains no labels")]
    Empty,
    #[error("bad label line {line}: {text:?}")]
    BadLine { line: usize, text: String },
    #[error("label index {index} out of range for {count} labels")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("duplicate label index {index}")]
    DuplicateIndex { index: usize },
}

/// Fixed mapping from model output index to raw label string.
///
/// Parsed from the bundle's labels file at load time and immutable for the
/// process lifetime. Two on-disk formats load: the bundle's native
/// `'label' => index` lines, and plain one-label-per-line text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse the labels file contents.
    ///
    /// Blank lines, `===` separator lines, and encoder metadata entries
    /// (`'starting_index' => ...`) are skipped.
    pub fn parse(contents: &str) -> Result<Self, LabelTableError> {
        let lines: Vec<(usize, &str)> = contents
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('='))
            .collect();

        if lines.iter().any(|(_, l)| l.contains("=>")) {
            Self::parse_indexed(&lines)
        } else {
            let labels: Vec<String> = lines.iter().map(|(_, l)| l.to_string()).collect();
            if labels.is_empty() {
                return Err(LabelTableError::Empty);
            }
            Ok(Self::new(labels))
        }
    }

    fn parse_indexed(lines: &[(usize, &str)]) -> Result<Self, LabelTableError> {
        let mut entries: Vec<(usize, String)> = Vec::new();
        for (line_no, line) in lines {
            let Some((lhs, rhs)) = line.split_once("=>") else {
                return Err(LabelTableError::BadLine {
                    line: *line_no,
                    text: line.to_string(),
                });
            };
            let label = lhs.trim().trim_matches('\'').trim_matches('"');
            if label == "starting_index" {
                continue;
            }
            let index: usize =
                rhs.trim()
                    .parse()
                    .map_err(|_| LabelTableError::BadLine {
                        line: *line_no,
                        text: line.to_string(),
                    })?;
            entries.push((index, label.to_string()));
        }

        if entries.is_empty() {
            return Err(LabelTableError::Empty);
        }

        let count = entries.len();
        let mut labels: Vec<Option<String>> = vec![None; count];
        for (index, label) in entries {
            if index >= count {
                return Err(LabelTableError::IndexOutOfRange { index, count });
            }
            if labels[index].is_some() {
                return Err(LabelTableError::DuplicateIndex { index });
            }
            labels[index] = Some(label);
        }

        // Every slot is filled: count entries, all indices < count, no dups.
        Ok(Self::new(labels.into_iter().flatten().collect()))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
