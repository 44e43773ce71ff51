//! Requirement specifiers.
//!
//! A specifier names a package plus optional extras, version constraint and
//! environment marker: `name[extra1,extra2] >=1.0,<2.0 ; python_version >= "3.8"`.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use super::version::{Version, VersionConstraint};

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("name regex is valid")
});

static SPECIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<rest>.*)$",
    )
    .expect("specifier regex is valid")
});

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator regex is valid"));

/// One parsed requirement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementSpec {
    /// Package name as written in the manifest.
    pub name: String,
    /// Requested extras, e.g. `["socks"]` for `requests[socks]`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    /// Constraint with whitespace removed, e.g. `>=1.10,<2.0`.
    pub version_constraint: Option<String>,
    /// Environment marker after `;`, recorded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl RequirementSpec {
    /// Parse a single specifier. Comments and blank lines are the
    /// reader's business; this expects a non-empty specifier.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty requirement".to_string());
        }
        if text.starts_with('-') {
            return Err("installer options are not allowed in the manifest".to_string());
        }

        let (body, marker) = match text.split_once(';') {
            Some((body, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err("empty environment marker after ';'".to_string());
                }
                (body.trim(), Some(marker.to_string()))
            }
            None => (text, None),
        };

        let caps = SPECIFIER_REGEX
            .captures(body)
            .ok_or_else(|| "expected a package name".to_string())?;
        let name = caps["name"].to_string();

        let extras = match caps.name("extras") {
            Some(m) => parse_extras(m.as_str())?,
            None => Vec::new(),
        };

        let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");
        if rest.starts_with('@') {
            return Err("direct URL references are not supported".to_string());
        }
        let version_constraint = parse_constraint(rest)?;

        Ok(Self {
            name,
            extras,
            version_constraint,
            marker,
        })
    }

    /// Name in normalized form: lowercase with runs of `-`, `_`, `.`
    /// collapsed to a single `-`.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Parsed constraint, if any.
    pub fn constraint(&self) -> Option<VersionConstraint> {
        self.version_constraint
            .as_deref()
            .and_then(|c| VersionConstraint::parse(c).ok())
    }

    /// Whether an installed `version` satisfies this requirement.
    pub fn accepts(&self, version: &Version) -> bool {
        self.constraint().is_none_or(|c| c.matches(version))
    }
}

impl fmt::Display for RequirementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(c) = &self.version_constraint {
            write!(f, "{}", c)?;
        }
        if let Some(m) = &self.marker {
            write!(f, "; {}", m)?;
        }
        Ok(())
    }
}

/// Normalize a distribution name for comparison.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN.replace_all(name, "-").to_lowercase()
}

fn parse_extras(raw: &str) -> Result<Vec<String>, String> {
    let mut extras = Vec::new();
    for extra in raw.split(',').map(str::trim) {
        if extra.is_empty() {
            continue;
        }
        if !NAME_REGEX.is_match(extra) {
            return Err(format!("invalid extra '{}'", extra));
        }
        extras.push(extra.to_string());
    }
    Ok(extras)
}

fn parse_constraint(rest: &str) -> Result<Option<String>, String> {
    let rest = match rest.strip_prefix('(') {
        Some(inner) => inner
            .strip_suffix(')')
            .ok_or_else(|| "unbalanced parenthesis".to_string())?
            .trim(),
        None => rest,
    };
    if rest.is_empty() {
        return Ok(None);
    }

    let constraint = VersionConstraint::parse(rest)?;
    Ok(Some(constraint.to_string()))
}
