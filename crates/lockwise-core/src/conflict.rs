//! Conflict trace collected while the resolver backtracks.

use std::fmt;

/// Conflicts beyond this count are tallied but not stored.
const MAX_RECORDED: usize = 64;

/// A report of the conflicts encountered during a search.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    /// Conflicts seen after the report filled up.
    pub dropped: usize,
}

/// One dead end the search ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// `name (requirement)` of the dependency that could not be satisfied.
    pub dependency: String,
    /// The manifest that declared it, or `None` for a top-level dependency.
    pub required_by: Option<String>,
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// The name was already assigned to a version the requirement rejects.
    Mismatch { resolved: String },
    /// The source offered nothing that satisfies the requirement.
    NoCandidates,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: Conflict) {
        if self.conflicts.len() < MAX_RECORDED {
            self.conflicts.push(conflict);
        } else {
            self.dropped += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Total number of conflicts seen, including dropped ones.
    pub fn len(&self) -> usize {
        self.conflicts.len() + self.dropped
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        if self.dropped > 0 {
            writeln!(f, "  ... and {} more", self.dropped)?;
        }
        Ok(())
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = self.required_by.as_deref().unwrap_or("the specification");
        match &self.kind {
            ConflictKind::Mismatch { resolved } => write!(
                f,
                "{} required by {} but {} was already chosen",
                self.dependency, origin, resolved
            ),
            ConflictKind::NoCandidates => write!(
                f,
                "{} required by {} has no matching candidates",
                self.dependency, origin
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> Conflict {
        Conflict {
            dependency: "c (< 2)".to_string(),
            required_by: Some("d (1.0)".to_string()),
            kind: ConflictKind::Mismatch {
                resolved: "c (2.0)".to_string(),
            },
        }
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No version conflicts.");
    }

    #[test]
    fn report_with_conflicts() {
        let mut report = ConflictReport::new();
        report.add(mismatch());
        report.add(Conflict {
            dependency: "e (>= 3)".to_string(),
            required_by: None,
            kind: ConflictKind::NoCandidates,
        });
        assert_eq!(report.len(), 2);
        let s = report.to_string();
        assert!(s.contains("c (< 2) required by d (1.0) but c (2.0) was already chosen"));
        assert!(s.contains("e (>= 3) required by the specification has no matching candidates"));
    }

    #[test]
    fn report_caps_stored_conflicts() {
        let mut report = ConflictReport::new();
        for _ in 0..(MAX_RECORDED + 5) {
            report.add(mismatch());
        }
        assert_eq!(report.conflicts.len(), MAX_RECORDED);
        assert_eq!(report.dropped, 5);
        assert_eq!(report.len(), MAX_RECORDED + 5);
        assert!(report.to_string().contains("... and 5 more"));
    }
}
