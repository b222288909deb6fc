use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step from a parent value to a child value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Field-access path from a document root, e.g. `items[2].ref`.
///
/// Paths are accumulated as segments during traversal and only rendered to text when
/// an occurrence is built or a mutation is sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Returns a new path with `key` appended
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Key(key.into()));
        path
    }

    /// Returns a new path with `index` appended
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Index(index));
        path
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

/// Keys that can be written bare; everything else uses the quoted `["..."]` form
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if is_identifier(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => {
                    let quoted = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                    write!(f, "[{}]", quoted)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = anyhow::Error;

    /// Parses the form produced by `Display`: `a.b`, `a[0]` and `a["not.an.identifier"]`
    fn from_str(s: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut chars = s.chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                '[' => {
                    chars.next();
                    if chars.peek() == Some(&'"') {
                        let mut literal = String::new();
                        literal.push(chars.next().unwrap_or('"'));
                        let mut escaped = false;
                        loop {
                            let Some(c) = chars.next() else {
                                return Err(anyhow!("Unterminated quoted key in path: {}", s));
                            };
                            literal.push(c);
                            match c {
                                '\\' if !escaped => escaped = true,
                                '"' if !escaped => break,
                                _ => escaped = false,
                            }
                        }
                        let key: String = serde_json::from_str(&literal)
                            .map_err(|e| anyhow!("Invalid quoted key in path {}: {}", s, e))?;
                        segments.push(PathSegment::Key(key));
                    } else {
                        if segments.is_empty() {
                            return Err(anyhow!("Path cannot start with an index: {}", s));
                        }
                        let mut digits = String::new();
                        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                            digits.push(*d);
                            chars.next();
                        }
                        let index = digits
                            .parse::<usize>()
                            .map_err(|_| anyhow!("Invalid index in path: {}", s))?;
                        segments.push(PathSegment::Index(index));
                    }
                    if chars.next() != Some(']') {
                        return Err(anyhow!("Missing ']' in path: {}", s));
                    }
                }
                '.' => {
                    if segments.is_empty() {
                        return Err(anyhow!("Path cannot start with '.': {}", s));
                    }
                    chars.next();
                    segments.push(PathSegment::Key(bare_key(&mut chars, s)?));
                }
                ']' => return Err(anyhow!("Unbalanced ']' in path: {}", s)),
                _ => {
                    if !segments.is_empty() {
                        return Err(anyhow!("Unexpected character '{}' in path: {}", c, s));
                    }
                    segments.push(PathSegment::Key(bare_key(&mut chars, s)?));
                }
            }
        }

        Ok(Self(segments))
    }
}

fn bare_key(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, path: &str) -> Result<String> {
    let mut key = String::new();
    while let Some(&c) = chars.peek() {
        match c {
            '.' | '[' => break,
            ']' => return Err(anyhow!("Unbalanced ']' in path: {}", path)),
            _ => {
                key.push(c);
                chars.next();
            }
        }
    }
    if key.is_empty() {
        return Err(anyhow!("Empty key in path: {}", path));
    }
    Ok(key)
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
