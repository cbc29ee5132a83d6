use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Dotted attribute path such as `parent.status.name`.
///
/// Paths are the left-hand side of every predicate. They are built with
/// [`attr()`] and extended with [`Attr::attr`]; comparison methods live
/// alongside [`Expr`](crate::ast::Expr).
///
/// # Examples
///
/// ```
/// use ftrack_query::attr;
///
/// let path = attr("parent").attr("status.name");
/// assert_eq!(path.to_string(), "parent.status.name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attr {
    segments: Vec<String>,
}

/// Start a new attribute path. Dots split the text into segments.
pub fn attr(path: &str) -> Attr {
    Attr {
        segments: split_segments(path),
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Attr {
    /// Append one or more segments.
    pub fn attr(mut self, path: &str) -> Attr {
        self.segments.extend(split_segments(path));
        self
    }

    /// Narrow a relation to a concrete entity type: `parent[Project]`.
    pub fn cast(mut self, entity_type: &str) -> Attr {
        match self.segments.last_mut() {
            Some(last) => {
                last.push('[');
                last.push_str(entity_type);
                last.push(']');
            }
            None => self.segments.push(format!("[{}]", entity_type)),
        }
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the referenced entity's identifier (`parent` → `parent.id`).
    pub(crate) fn id_path(&self) -> Attr {
        self.clone().attr("id")
    }

    /// Sort this attribute ascending.
    pub fn asc(self) -> SortKey {
        SortKey::new(self, SortDirection::Ascending)
    }

    pub fn ascending(self) -> SortKey {
        self.asc()
    }

    /// Sort this attribute descending.
    pub fn desc(self) -> SortKey {
        SortKey::new(self, SortDirection::Descending)
    }

    pub fn descending(self) -> SortKey {
        self.desc()
    }

    /// Sort key spelled by the final segment, if it is a direction keyword.
    ///
    /// `attr("name.desc")` is `name` sorted descending; any other path
    /// returns `None`.
    pub fn sort_key(&self) -> Option<SortKey> {
        let (last, parent) = self.segments.split_last()?;
        let direction = SortDirection::from_keyword(last)?;
        if parent.is_empty() {
            return None;
        }
        Some(SortKey::new(
            Attr {
                segments: parent.to_vec(),
            },
            direction,
        ))
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for Attr {
    fn from(path: &str) -> Self {
        attr(path)
    }
}

/// Sort direction of an `order by` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Accepts `asc`, `ascending`, `desc` and `descending`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One `order by` key: an attribute and its direction.
///
/// Displays as the explicit direction string (`name descending`), which is
/// also what [`FromStr`] accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub path: Attr,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(path: Attr, direction: SortDirection) -> Self {
        SortKey { path, direction }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }

    pub fn reversed(self) -> Self {
        SortKey {
            direction: self.direction.reversed(),
            ..self
        }
    }

    /// Form used inside `order by`, where ascending is implicit.
    pub(crate) fn clause(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.path.to_string(),
            SortDirection::Descending => format!("{} descending", self.path),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction.keyword())
    }
}

static SORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<path>\S+)(?:\s+(?P<direction>\S.*?))?\s*$").expect("valid sort regex")
});

impl FromStr for SortKey {
    type Err = Error;

    /// Parses `path` or `path <direction>`.
    fn from_str(text: &str) -> Result<Self> {
        let caps = SORT_SPEC
            .captures(text)
            .ok_or_else(|| Error::UnknownSortDirection(text.to_string()))?;
        let path = attr(&caps["path"]);
        let direction = match caps.name("direction") {
            None => SortDirection::Ascending,
            Some(token) => SortDirection::from_keyword(token.as_str())
                .ok_or_else(|| Error::UnknownSortDirection(token.as_str().to_string()))?,
        };
        Ok(SortKey::new(path, direction))
    }
}
