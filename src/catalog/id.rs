//! Control identifier normalization and ordering
//!
//! Raw OSCAL sources identify controls in lowercase with a separator-based
//! enhancement suffix (`ac-2.1`). The rest of the pipeline compares ids by
//! exact string equality, so everything funnels through [`normalize`], which
//! is total and idempotent: normalizing an already-canonical id is a no-op.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Normalize a raw control identifier to canonical form
///
/// Canonical form is uppercase with a parenthetical enhancement suffix:
/// `ac-2.1` → `AC-2(1)`, `AC-2_1` → `AC-2(1)`, `AC-2(1)` → `AC-2(1)`.
///
/// Identifiers that do not parse as control ids are uppercased and trimmed
/// but otherwise passed through, keeping the function total.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    match ControlId::parse(trimmed) {
        Some(id) => id.to_string(),
        None => trimmed.to_uppercase(),
    }
}

/// A parsed NIST 800-53 control identifier
///
/// Splits `AC-2(1)` into family `AC`, number `2`, enhancement `1`. Base
/// controls have no enhancement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId {
    /// Control family (e.g., "AC", "IA", "SC")
    pub family: String,

    /// Control number
    pub number: u32,

    /// Enhancement number, if this is an enhancement
    pub enhancement: Option<u32>,
}

impl ControlId {
    /// Parse a control id in raw or canonical form
    ///
    /// Accepts `ac-2`, `AC-2(1)`, `ac-2.1`, and `ac-2_1`. Returns `None`
    /// for strings that are not control-shaped.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        let dash = s.find('-')?;
        let family = &s[..dash];
        if family.is_empty() || !family.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let rest = &s[dash + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let number: u32 = digits.parse().ok()?;

        let suffix = &rest[digits.len()..];
        let enhancement = match suffix.chars().next() {
            None => None,
            // "AC-2(1)" | "ac-2.1" | "ac-2_1"
            Some('(') | Some('.') | Some('_') => {
                let enh: String = suffix[1..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                let consumed = 1 + enh.len() + usize::from(suffix.starts_with('('));
                if enh.is_empty() || suffix.len() != consumed {
                    return None;
                }
                if suffix.starts_with('(') && !suffix.ends_with(')') {
                    return None;
                }
                Some(enh.parse().ok()?)
            }
            Some(_) => return None,
        };

        Some(Self {
            family: family.to_uppercase(),
            number,
            enhancement,
        })
    }

    /// The base control id without the enhancement suffix (e.g., "AC-2")
    pub fn base_id(&self) -> String {
        format!("{}-{}", self.family, self.number)
    }

    /// Whether this id names an enhancement
    pub fn is_enhancement(&self) -> bool {
        self.enhancement.is_some()
    }

    /// Ordering key: family, then numeric control number, then base before
    /// enhancements, enhancements ascending
    fn sort_key(&self) -> (&str, u32, Option<u32>) {
        (&self.family, self.number, self.enhancement)
    }
}

impl Ord for ControlId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for ControlId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.enhancement {
            Some(enh) => write!(f, "{}-{}({})", self.family, self.number, enh),
            None => write!(f, "{}-{}", self.family, self.number),
        }
    }
}

/// Extract the family code from a normalized control id
///
/// The family is the leading alphabetic prefix, uppercased (two letters for
/// every NIST 800-53 family).
pub fn family_of(normalized_id: &str) -> String {
    normalized_id
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase()
}

/// Sort normalized control ids with the canonical tie-break rule
///
/// Ids that do not parse keep a stable lexicographic position after all
/// parsable ids of their family prefix.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (ControlId::parse(a), ControlId::parse(b)) {
        (Some(ia), Some(ib)) => ia.cmp(&ib).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercase_dot_separator() {
        assert_eq!(normalize("ac-2.1"), "AC-2(1)");
    }

    #[test]
    fn test_normalize_underscore_separator() {
        assert_eq!(normalize("ac-2_1"), "AC-2(1)");
    }

    #[test]
    fn test_normalize_base_control() {
        assert_eq!(normalize("ac-2"), "AC-2");
        assert_eq!(normalize(" si-4 "), "SI-4");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["ac-2.1", "AC-2(1)", "ac-10", "AU-6", "not-a-control-id"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_parse_base() {
        let id = ControlId::parse("AC-2").unwrap();
        assert_eq!(id.family, "AC");
        assert_eq!(id.number, 2);
        assert_eq!(id.enhancement, None);
        assert!(!id.is_enhancement());
        assert_eq!(id.base_id(), "AC-2");
    }

    #[test]
    fn test_parse_enhancement_forms() {
        for raw in ["AC-2(12)", "ac-2.12", "ac-2_12"] {
            let id = ControlId::parse(raw).unwrap();
            assert_eq!(id.family, "AC");
            assert_eq!(id.number, 2);
            assert_eq!(id.enhancement, Some(12));
            assert_eq!(id.to_string(), "AC-2(12)");
        }
    }

    #[test]
    fn test_parse_rejects_non_controls() {
        assert!(ControlId::parse("").is_none());
        assert!(ControlId::parse("AC").is_none());
        assert!(ControlId::parse("AC-").is_none());
        assert!(ControlId::parse("-2").is_none());
        assert!(ControlId::parse("AC-2(").is_none());
        assert!(ControlId::parse("AC-2(x)").is_none());
        assert!(ControlId::parse("AC-2(1)extra").is_none());
    }

    #[test]
    fn test_numeric_ordering() {
        // AC-9 sorts before AC-10; base before its enhancements
        let mut ids = vec!["AC-10", "AC-2", "AC-9", "AC-2(1)"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, vec!["AC-2", "AC-2(1)", "AC-9", "AC-10"]);
    }

    #[test]
    fn test_family_ordering_is_primary() {
        let mut ids = vec!["SC-7", "AC-17", "AU-2", "AC-2"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, vec!["AC-2", "AC-17", "AU-2", "SC-7"]);
    }

    #[test]
    fn test_family_of() {
        assert_eq!(family_of("AC-2(1)"), "AC");
        assert_eq!(family_of("SR-11"), "SR");
    }
}
