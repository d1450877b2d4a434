use std::collections::BTreeMap;

use crate::error::RouteTableError;

/// Named parameters bound by a path pattern, ordered by name.
pub type RouteParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// `one_or_more` is set by the `+` modifier.
    CatchAll { name: String, one_or_more: bool },
}

/// PathPattern
///
/// A compiled route path such as `/posts/:id` or `/:pathMatch(.*)*`.
///
/// Supported segment forms:
/// * `posts`: static text, compared ASCII case-insensitively.
/// * `:id`: binds exactly one non-empty segment.
/// * `:name(.*)` with an optional `*` suffix: binds the rest of the path,
///   possibly empty. With a `+` suffix the rest must hold at least one
///   segment. Only valid as the final segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(source: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        let rest = source
            .strip_prefix('/')
            .ok_or_else(|| invalid("pattern must start with `/`"))?;

        let raw: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut segments = Vec::with_capacity(raw.len());
        for (index, part) in raw.iter().enumerate() {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }

            let Some(param) = part.strip_prefix(':') else {
                segments.push(Segment::Static(part.to_string()));
                continue;
            };

            let (name, regex) = match param.find('(') {
                Some(open) => (&param[..open], Some(&param[open..])),
                None => (param, None),
            };

            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("parameter names must be alphanumeric"));
            }

            match regex {
                None => segments.push(Segment::Param(name.to_string())),
                Some(regex) => {
                    let modifier = regex.strip_prefix("(.*)");
                    if !matches!(modifier, Some("" | "*" | "+")) {
                        return Err(invalid("only the `(.*)` wildcard is supported"));
                    }
                    if index + 1 != raw.len() {
                        return Err(invalid("wildcard must be the last segment"));
                    }
                    segments.push(Segment::CatchAll {
                        name: name.to_string(),
                        one_or_more: modifier == Some("+"),
                    });
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll { .. }))
    }

    /// True for a lone optional wildcard (`/:pathMatch(.*)*`), the only
    /// pattern guaranteed to match every path.
    pub fn matches_everything(&self) -> bool {
        matches!(
            self.segments.as_slice(),
            [Segment::CatchAll { one_or_more: false, .. }]
        )
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::CatchAll { name, .. } => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Structural key used to detect two patterns that match the same paths.
    pub(crate) fn shape(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(text) => text.to_ascii_lowercase(),
                Segment::Param(_) => ":".to_string(),
                Segment::CatchAll { one_or_more: false, .. } => "*".to_string(),
                Segment::CatchAll { one_or_more: true, .. } => "+".to_string(),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Match a normalized path (no query, no fragment). Returns the bound
    /// parameters on success.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut params = RouteParams::new();
        let mut cursor = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(text) => {
                    let part = parts.get(cursor)?;
                    if !part.eq_ignore_ascii_case(text) {
                        return None;
                    }
                    cursor += 1;
                }
                Segment::Param(name) => {
                    let part = parts.get(cursor)?;
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                    cursor += 1;
                }
                Segment::CatchAll { name, one_or_more } => {
                    let rest = parts.get(cursor..).unwrap_or_default();
                    if *one_or_more && rest.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
            }
        }

        (cursor == parts.len()).then_some(params)
    }

    /// Fill the pattern with `params`. Returns `None` when a required
    /// parameter is missing or empty.
    pub fn build(&self, params: &RouteParams) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(text) => parts.push(text.clone()),
                Segment::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    parts.push(value.clone());
                }
                Segment::CatchAll { name, one_or_more } => {
                    let value = params.get(name).map(|v| v.trim_matches('/'))?;
                    if value.is_empty() && *one_or_more {
                        return None;
                    }
                    if !value.is_empty() {
                        parts.push(value.to_string());
                    }
                }
            }
        }
        Some(format!("/{}", parts.join("/")))
    }

    /// Resolve a child path against its parent. Absolute children stand alone.
    pub fn join(parent: &str, child: &str) -> String {
        if child.starts_with('/') {
            return child.to_string();
        }
        let parent = parent.trim_end_matches('/');
        if child.is_empty() {
            if parent.is_empty() {
                return "/".to_string();
            }
            return parent.to_string();
        }
        format!("{parent}/{child}")
    }
}
