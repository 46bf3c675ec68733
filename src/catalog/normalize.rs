//! Catalog parser/normalizer
//!
//! Walks the raw nested catalog (groups → controls → enhancements → parts)
//! and produces a flat, depth-first-ordered sequence of [`Control`]s: each
//! base control immediately followed by its enhancements, enhancements
//! tagged with their parent id. Baseline flags are left unset here; the
//! transformer assigns them.

use std::collections::HashSet;

use crate::catalog::id::{family_of, normalize, ControlId};
use crate::catalog::raw::{RawCatalogDocument, RawControl, RawGroup, RawPart};
use crate::catalog::types::{BaselineApplicability, Control, Parameter};
use crate::error::{Error, Result};

/// Flatten a raw catalog document into normalized controls
///
/// Traversal order is deterministic and matches the source document's
/// structural order. A control node missing its `id` or `title` is a fatal
/// error for the whole run; malformed nested parts degrade to empty strings.
pub fn flatten(doc: &RawCatalogDocument) -> Result<Vec<Control>> {
    let mut controls = Vec::new();

    for group in &doc.catalog.groups {
        flatten_group(group, &mut controls)?;
    }
    for raw in &doc.catalog.controls {
        flatten_control(raw, None, &mut controls)?;
    }

    tracing::debug!(count = controls.len(), "flattened catalog");
    Ok(controls)
}

fn flatten_group(group: &RawGroup, out: &mut Vec<Control>) -> Result<()> {
    for raw in &group.controls {
        flatten_control(raw, None, out)?;
    }
    for nested in &group.groups {
        flatten_group(nested, out)?;
    }
    Ok(())
}

/// Emit one control and recurse into its enhancement children
///
/// Enhancement nodes are recursed into regardless of nesting depth; each
/// child's parent is its immediate containing control.
fn flatten_control(raw: &RawControl, parent: Option<&str>, out: &mut Vec<Control>) -> Result<()> {
    let raw_id = raw
        .id
        .as_deref()
        .ok_or_else(|| Error::structural("control node missing required id"))?;
    let id = normalize(raw_id);

    let title = raw
        .title
        .as_deref()
        .ok_or_else(|| Error::structural(format!("control {id} missing required title")))?
        .to_string();

    let enhancements: Vec<String> = raw
        .controls
        .iter()
        .filter_map(|c| c.id.as_deref())
        .map(normalize)
        .collect();

    out.push(Control {
        family: family_of(&id),
        title,
        statement: statement_text(raw),
        guidance: guidance_text(&raw.parts),
        baselines: BaselineApplicability::default(),
        params: extract_params(raw),
        enhancements,
        parent_control: parent.map(str::to_string),
        related_controls: related_ids(raw),
        id: id.clone(),
    });

    for child in &raw.controls {
        flatten_control(child, Some(&id), out)?;
    }

    Ok(())
}

/// Assemble the statement text for a control
///
/// A statement part with no sub-parts contributes its prose verbatim.
/// Lettered sub-parts each contribute one line prefixed with their label
/// prop, joined with newlines in document order.
fn statement_text(raw: &RawControl) -> String {
    let Some(stmt) = raw.parts.iter().find(|p| p.name.as_deref() == Some("statement")) else {
        return String::new();
    };

    if stmt.parts.is_empty() {
        return stmt.prose.clone().unwrap_or_default();
    }

    let mut lines = Vec::new();
    if let Some(prose) = stmt.prose.as_deref() {
        lines.push(prose.to_string());
    }
    for item in &stmt.parts {
        let Some(prose) = item.prose.as_deref() else {
            continue;
        };
        match item.prop("label") {
            Some(label) => lines.push(format!("{label} {prose}")),
            None => lines.push(prose.to_string()),
        }
    }
    lines.join("\n")
}

/// First prose found in a part named "guidance" anywhere in the subtree
fn guidance_text(parts: &[RawPart]) -> String {
    fn first_prose(part: &RawPart) -> Option<&str> {
        if let Some(prose) = part.prose.as_deref() {
            return Some(prose);
        }
        part.parts.iter().find_map(first_prose)
    }

    fn search(parts: &[RawPart]) -> Option<&str> {
        for part in parts {
            if part.name.as_deref() == Some("guidance") {
                if let Some(prose) = first_prose(part) {
                    return Some(prose);
                }
            }
            if let Some(found) = search(&part.parts) {
                return Some(found);
            }
        }
        None
    }

    search(parts).unwrap_or_default().to_string()
}

/// Resolve "related" links into normalized control ids
///
/// Duplicates and unresolvable fragments are dropped silently.
fn related_ids(raw: &RawControl) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut related = Vec::new();

    for link in &raw.links {
        if link.rel.as_deref() != Some("related") {
            continue;
        }
        let Some(fragment) = link.href.as_deref().and_then(|h| h.strip_prefix('#')) else {
            continue;
        };
        let id = normalize(fragment);
        if ControlId::parse(&id).is_none() {
            continue;
        }
        if seen.insert(id.clone()) {
            related.push(id);
        }
    }

    related
}

fn extract_params(raw: &RawControl) -> Vec<Parameter> {
    raw.params
        .iter()
        .filter_map(|p| {
            let id = p.id.as_deref()?;
            Some(Parameter {
                id: id.to_string(),
                label: p.label.clone(),
                values: p.values.clone(),
            })
        })
        .collect()
}
