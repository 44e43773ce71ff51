//! Package versions and version constraints.
//!
//! Versions follow the usual Python packaging layout
//! (`[N!]release[{a|b|rc}N][.postN][.devN][+local]`). Only the parts that
//! matter for ordering are kept; local labels are ignored when comparing.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^
        v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_kind>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_num>\d+)?)?
        (?P<post>-(?P<post_implicit>\d+)|[-_.]?(?:post|rev|r)[-_.]?(?P<post_num>\d+)?)?
        (?P<dev>[-_.]?dev[-_.]?(?P<dev_num>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .expect("version regex is valid")
});

/// Pre-release phase, ordered alpha < beta < release candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Candidate,
}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

impl Version {
    /// Parse a version string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let caps = VERSION_REGEX.captures(s)?;

        let number = |name: &str| -> Option<u64> {
            caps.name(name).and_then(|m| m.as_str().parse().ok())
        };

        let release = caps
            .name("release")?
            .as_str()
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        let pre = caps.name("pre_kind").map(|kind| {
            let phase = match kind.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => PreRelease::Alpha,
                "b" | "beta" => PreRelease::Beta,
                _ => PreRelease::Candidate,
            };
            (phase, number("pre_num").unwrap_or(0))
        });

        let post = caps.name("post").map(|_| {
            number("post_implicit")
                .or_else(|| number("post_num"))
                .unwrap_or(0)
        });
        let dev = caps.name("dev").map(|_| number("dev_num").unwrap_or(0));

        Some(Self {
            raw: s.to_string(),
            epoch: number("epoch").unwrap_or(0),
            release,
            pre,
            post,
            dev,
        })
    }

    /// The release segments as written (e.g. `[1, 10, 0]`).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Whether this is a pre-release or development release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The version as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.release[..end]
    }

    // dev-only releases sort before every pre-release of the same version
    fn pre_key(&self) -> (u8, Option<PreRelease>, u64) {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => (0, None, 0),
            (Some((phase, n)), _, _) => (1, Some(phase), n),
            _ => (2, None, 0),
        }
    }

    fn dev_key(&self) -> (bool, u64) {
        (self.dev.is_none(), self.dev.unwrap_or(0))
    }

    /// Same epoch and release segments, ignoring pre, post and dev tags.
    fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && self.trimmed_release() == other.trimmed_release()
    }

    /// Whether `self` starts with the release segments of `prefix`,
    /// padding missing segments with zeros.
    fn matches_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, want)| self.release.get(i).copied().unwrap_or(0) == *want)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid version: {}", s))
    }
}

/// Comparison operator in a constraint clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Compatible,
    Arbitrary,
}

impl Operator {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Compatible => "~=",
            Self::Arbitrary => "===",
        }
    }

    // Longest operators first so `===` is not read as `==`.
    const ALL: [Operator; 8] = [
        Self::Arbitrary,
        Self::Equal,
        Self::NotEqual,
        Self::Compatible,
        Self::LessEqual,
        Self::GreaterEqual,
        Self::Less,
        Self::Greater,
    ];
}

/// A single `op version` clause.
#[derive(Debug, Clone)]
pub struct Clause {
    op: Operator,
    text: String,
    version: Option<Version>,
    wildcard: bool,
}

impl Clause {
    /// Parse one clause such as `>=1.10` or `==2.*`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let op = Operator::ALL
            .into_iter()
            .find(|op| s.starts_with(op.as_str()))
            .ok_or_else(|| format!("missing comparison operator in '{}'", s))?;
        let text = s[op.as_str().len()..].trim().to_string();
        if text.is_empty() {
            return Err(format!("missing version after '{}'", op.as_str()));
        }

        if op == Operator::Arbitrary {
            return Ok(Self {
                op,
                text,
                version: None,
                wildcard: false,
            });
        }

        let (body, wildcard) = match text.strip_suffix(".*") {
            Some(body) => (body, true),
            None => (text.as_str(), false),
        };
        if wildcard && !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(format!("wildcard not allowed with '{}'", op.as_str()));
        }

        let version = Version::parse(body).ok_or_else(|| format!("invalid version '{}'", body))?;
        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(format!("'~=' needs at least two release segments: '{}'", body));
        }

        Ok(Self {
            op,
            text,
            version: Some(version),
            wildcard,
        })
    }

    /// Check a candidate version against this clause.
    pub fn matches(&self, candidate: &Version) -> bool {
        let Some(version) = &self.version else {
            return candidate.as_str().eq_ignore_ascii_case(&self.text);
        };

        match self.op {
            Operator::Equal if self.wildcard => candidate.matches_prefix(version.release()),
            Operator::NotEqual if self.wildcard => !candidate.matches_prefix(version.release()),
            Operator::Equal => candidate == version,
            Operator::NotEqual => candidate != version,
            // `<V` excludes pre-releases of V unless V is one itself.
            Operator::Less => {
                candidate < version
                    && (version.is_prerelease()
                        || !(candidate.is_prerelease() && candidate.same_release(version)))
            }
            Operator::LessEqual => candidate <= version,
            // `>V` excludes post-releases of V unless V is one itself.
            Operator::Greater => {
                candidate > version
                    && (version.post.is_some()
                        || !(candidate.post.is_some() && candidate.same_release(version)))
            }
            Operator::GreaterEqual => candidate >= version,
            Operator::Compatible => {
                let prefix = &version.release()[..version.release().len() - 1];
                candidate >= version && candidate.matches_prefix(prefix)
            }
            Operator::Arbitrary => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.text)
    }
}

/// A comma-separated set of clauses; a version matches when every clause does.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    clauses: Vec<Clause>,
}

impl VersionConstraint {
    /// Parse a constraint such as `>=1.10,<2.0`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let clauses = s
            .split(',')
            .map(Clause::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    /// Check whether `candidate` satisfies every clause.
    pub fn matches(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(candidate))
    }

    /// The individual clauses.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
