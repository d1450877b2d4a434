use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use super::{PathPattern, RouteParams, ViewId};
use crate::error::RouteTableError;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// RouteMeta
///
/// Per-route metadata. `requires_auth` is tri-state: an unset value inherits
/// from the parent entry and is falsy at the top level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: Option<bool>,
}

/// RouteEntry
///
/// Declarative description of one route, as written in the table source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub name: String,
    pub component: ViewId,
    pub meta: RouteMeta,
    pub children: Vec<RouteEntry>,
    /// Pass bound path parameters to the view as props.
    pub props: bool,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, name: impl Into<String>, component: ViewId) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            component,
            meta: RouteMeta::default(),
            children: Vec::new(),
            props: false,
        }
    }

    pub fn requires_auth(mut self, required: bool) -> Self {
        self.meta.requires_auth = Some(required);
        self
    }

    pub fn with_props(mut self) -> Self {
        self.props = true;
        self
    }

    pub fn with_children(mut self, children: Vec<RouteEntry>) -> Self {
        self.children = children;
        self
    }
}

/// Route entries of the property portal, in match order.
pub fn portal_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new(LOGIN_PATH, "Login", ViewId::Login),
        RouteEntry::new("/signup", "SignUp", ViewId::SignUp).requires_auth(false),
        RouteEntry::new("/reset-password", "resetPassword", ViewId::ResetPassword)
            .requires_auth(true),
        RouteEntry::new("/forgot-password", "ForgotPassword", ViewId::ForgotPassword)
            .requires_auth(false),
        RouteEntry::new(HOME_PATH, "HomeView", ViewId::Home).requires_auth(true),
        RouteEntry::new("/posts", "Posts", ViewId::PostList).requires_auth(true),
        RouteEntry::new("/posts/:id", "post-detail", ViewId::PostDetail)
            .requires_auth(true)
            .with_props(),
        RouteEntry::new("/add-property", "add-property", ViewId::AddProperty)
            .requires_auth(true)
            .with_props(),
        RouteEntry::new("/my-properties", "my-properties", ViewId::MyProperties)
            .requires_auth(true)
            .with_props(),
        RouteEntry::new("/edit-property/:id", "edit-property", ViewId::EditProperty)
            .requires_auth(true)
            .with_props(),
        RouteEntry::new("/profile", "Profile", ViewId::Profile)
            .requires_auth(true)
            .with_children(vec![
                RouteEntry::new("settings", "ProfileSettings", ViewId::ProfileSettings)
                    .requires_auth(true),
            ]),
        RouteEntry::new("/:pathMatch(.*)*", "not-found", ViewId::NotFound),
    ]
}

/// RouteRecord
///
/// A flattened, compiled route: nested entries become records whose pattern
/// is joined onto the parent path and whose auth flag is already merged.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub pattern: PathPattern,
    pub name: String,
    pub component: ViewId,
    pub requires_auth: bool,
    pub props: bool,
    /// Route names from the outermost ancestor down to this record.
    pub matched: Vec<String>,
}

/// Location
///
/// A navigation target split into path, query and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
    pub hash: Option<String>,
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let (rest, hash) = match raw.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_string())),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            query: query.filter(|q| !q.is_empty()),
            hash: hash.filter(|h| !h.is_empty()),
        }
    }

    pub fn full_path(&self) -> String {
        let mut full = self.path.clone();
        if let Some(query) = &self.query {
            full.push('?');
            full.push_str(query);
        }
        if let Some(hash) = &self.hash {
            full.push('#');
            full.push_str(hash);
        }
        full
    }
}

/// ResolvedRoute
///
/// Outcome of matching a location against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ResolvedRoute {
    pub name: String,
    /// Requested path without query or fragment.
    pub path: String,
    pub full_path: String,
    pub query: Option<String>,
    pub hash: Option<String>,
    #[schema(value_type = Object)]
    pub params: RouteParams,
    pub matched: Vec<String>,
    pub component: ViewId,
    pub requires_auth: bool,
    pub props: bool,
    /// Pattern of the matched record, e.g. `/posts/:id`.
    pub pattern: String,
}

impl ResolvedRoute {
    /// Props handed to the view: the bound params when the route opts in.
    pub fn view_props(&self) -> RouteParams {
        if self.props {
            self.params.clone()
        } else {
            RouteParams::new()
        }
    }
}

/// RouteTable
///
/// Ordered, validated set of route records. Matching is first-match-wins and
/// total: construction guarantees a trailing catch-all that matches every
/// path.
#[derive(Debug, Clone)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
    /// The trailing catch-all, also present as the last entry of `records`.
    fallback: RouteRecord,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        let mut records = Vec::new();
        for entry in &entries {
            flatten(entry, None, &mut records)?;
        }

        let mut names: HashSet<&str> = HashSet::new();
        let mut shapes: HashMap<String, &str> = HashMap::new();
        let last = records.len().saturating_sub(1);

        for (index, record) in records.iter().enumerate() {
            if !names.insert(record.name.as_str()) {
                return Err(RouteTableError::DuplicateName(record.name.clone()));
            }

            if let Some(existing) = shapes.insert(record.pattern.shape(), record.name.as_str()) {
                return Err(RouteTableError::AmbiguousPath {
                    name: record.name.clone(),
                    pattern: record.pattern.as_str().to_string(),
                    existing: existing.to_string(),
                });
            }

            if record.pattern.is_catch_all() && index != last {
                return Err(RouteTableError::CatchAllNotLast(record.name.clone()));
            }
        }

        let fallback = match records.last() {
            Some(record) if record.pattern.matches_everything() => record.clone(),
            Some(record) if record.pattern.is_catch_all() => {
                return Err(RouteTableError::CatchAllNotTotal(record.name.clone()));
            }
            _ => return Err(RouteTableError::MissingCatchAll),
        };

        Ok(Self { records, fallback })
    }

    /// The property portal's table.
    pub fn portal() -> Result<Self, RouteTableError> {
        Self::new(portal_routes())
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&RouteRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Match `raw` (path with optional query and fragment) against the table.
    pub fn resolve(&self, raw: &str) -> ResolvedRoute {
        let location = Location::parse(raw);

        let matched = self
            .records
            .iter()
            .find_map(|record| record.pattern.matches(&location.path).map(|params| (record, params)));

        let (record, params) = matched.unwrap_or_else(|| (&self.fallback, RouteParams::new()));

        ResolvedRoute {
            name: record.name.clone(),
            full_path: location.full_path(),
            path: location.path,
            query: location.query,
            hash: location.hash,
            params,
            matched: record.matched.clone(),
            component: record.component,
            requires_auth: record.requires_auth,
            props: record.props,
            pattern: record.pattern.as_str().to_string(),
        }
    }

    /// Reverse routing: build the path of the route called `name`.
    pub fn href(&self, name: &str, params: &RouteParams) -> Option<String> {
        self.get(name)?.pattern.build(params)
    }
}

fn flatten(
    entry: &RouteEntry,
    parent: Option<&RouteRecord>,
    out: &mut Vec<RouteRecord>,
) -> Result<(), RouteTableError> {
    let path = match parent {
        Some(parent) => PathPattern::join(parent.pattern.as_str(), &entry.path),
        None => entry.path.clone(),
    };
    let pattern = PathPattern::parse(&path)?;

    let inherited = parent.map(|p| p.requires_auth).unwrap_or(false);
    let mut matched = parent.map(|p| p.matched.clone()).unwrap_or_default();
    matched.push(entry.name.clone());

    let record = RouteRecord {
        pattern,
        name: entry.name.clone(),
        component: entry.component,
        requires_auth: entry.meta.requires_auth.unwrap_or(inherited),
        props: entry.props,
        matched,
    };

    out.push(record.clone());
    for child in &entry.children {
        flatten(child, Some(&record), out)?;
    }
    Ok(())
}
