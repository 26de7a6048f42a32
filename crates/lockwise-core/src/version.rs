//! Version parsing, comparison, and requirement matching.
//!
//! Versions are dotted strings compared segment by segment:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers
//! - Textual segments sort below numeric ones and below a missing segment,
//!   so `1.0-rc1 < 1.0 < 1.0.1`
//! - Trailing zero segments are insignificant (`1.0 == 1.0.0`)
//!
//! A [`Requirement`] is a conjunction of [`Constraint`]s such as
//! `>= 1.0, < 2`. The empty conjunction accepts every version and is written
//! `*`. The `Display` form is canonical and parses back to an equal
//! requirement.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lockwise_util::errors::LockwiseError;

/// A parsed version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Text(String),
}

impl Version {
    pub fn parse(version: &str) -> Result<Self, LockwiseError> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(LockwiseError::Version {
                message: "empty version string".to_string(),
            });
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == ',') {
            return Err(LockwiseError::Version {
                message: format!("`{trimmed}` is not a version"),
            });
        }
        Ok(Self {
            original: trimmed.to_string(),
            segments: parse_segments(trimmed),
        })
    }

    /// The version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// True if any segment is textual (`1.0-rc1`, `2.0.0-beta`).
    pub fn is_prerelease(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Text(_)))
    }

    /// Upper bound used by the pessimistic operator.
    ///
    /// `1.2` bumps to `2`, `1.2.3` bumps to `1.3`, a single segment `1`
    /// bumps to `2`. `None` when the bumped segment would overflow, in which
    /// case there is no upper bound.
    fn pessimistic_bound(&self) -> Option<Version> {
        let mut release: Vec<u64> = self
            .segments
            .iter()
            .map_while(|s| match s {
                Segment::Numeric(n) => Some(*n),
                Segment::Text(_) => None,
            })
            .collect();
        if release.is_empty() {
            release.push(0);
        }
        if release.len() > 1 {
            release.pop();
        }
        let last = release.last_mut()?;
        *last = last.checked_add(1)?;
        let original = release
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Some(Version {
            segments: release.into_iter().map(Segment::Numeric).collect(),
            original,
        })
    }
}

impl FromStr for Version {
    type Err = LockwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let ord = compare_segments(self.segments.get(i), other.segments.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(Segment::Numeric(a)), Some(Segment::Numeric(b))) => a.cmp(b),
        (Some(Segment::Text(a)), Some(Segment::Text(b))) => a.cmp(b),
        (Some(Segment::Numeric(_)), Some(Segment::Text(_))) => Ordering::Greater,
        (Some(Segment::Text(_)), Some(Segment::Numeric(_))) => Ordering::Less,
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Text(_) => Ordering::Less,
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    version
        .split(['.', '-'])
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<u64>() {
            Ok(n) => Segment::Numeric(n),
            Err(_) => Segment::Text(token.to_lowercase()),
        })
        .collect()
}

/// Comparison operator of a single constraint.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Op {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    /// `~> 1.2` allows `>= 1.2, < 2`.
    Pessimistic,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Pessimistic => "~>",
        }
    }

    /// Split a leading operator off `s`. Longest symbols are tried first.
    fn split(s: &str) -> (Op, &str) {
        const TABLE: [(&str, Op); 7] = [
            ("~>", Op::Pessimistic),
            (">=", Op::Ge),
            ("<=", Op::Le),
            ("!=", Op::NotEq),
            (">", Op::Gt),
            ("<", Op::Lt),
            ("=", Op::Eq),
        ];
        for (symbol, op) in TABLE {
            if let Some(rest) = s.strip_prefix(symbol) {
                return (op, rest);
            }
        }
        (Op::Eq, s)
    }
}

/// One `op version` term of a requirement.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Constraint {
    pub op: Op,
    pub version: Version,
}

impl Constraint {
    pub fn matches(&self, version: &Version) -> bool {
        let cmp = version.cmp(&self.version);
        match self.op {
            Op::Eq => cmp == Ordering::Equal,
            Op::NotEq => cmp != Ordering::Equal,
            Op::Gt => cmp == Ordering::Greater,
            Op::Ge => cmp != Ordering::Less,
            Op::Lt => cmp == Ordering::Less,
            Op::Le => cmp != Ordering::Greater,
            Op::Pessimistic => {
                cmp != Ordering::Less
                    && self
                        .version
                        .pessimistic_bound()
                        .map_or(true, |bound| *version < bound)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.version)
    }
}

/// A predicate over versions: every constraint must hold.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Requirement {
    constraints: Vec<Constraint>,
}

impl Requirement {
    /// The requirement every version satisfies, pre-releases included.
    pub fn any() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Parse `>= 1.0, < 2`, `~> 1.4`, `1.2.3`, `*` or the empty string.
    pub fn parse(spec: &str) -> Result<Self, LockwiseError> {
        let s = spec.trim();
        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }

        let mut constraints = Vec::new();
        for term in s.split(',') {
            let term = term.trim();
            let (op, rest) = Op::split(term);
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(LockwiseError::Version {
                    message: format!("missing version in requirement `{s}`"),
                });
            }
            let version = Version::parse(rest).map_err(|_| LockwiseError::Version {
                message: format!("invalid term `{term}` in requirement `{s}`"),
            })?;
            constraints.push(Constraint { op, version });
        }
        Ok(Self { constraints })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// True if this requirement accepts every version.
    pub fn is_any(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.constraints.iter().all(|c| c.matches(version))
    }
}

impl Default for Requirement {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for Requirement {
    type Err = LockwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("*");
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
