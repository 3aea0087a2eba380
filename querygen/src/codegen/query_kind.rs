//! The five query kinds rendered per table

use std::fmt;
use std::str::FromStr;

/// A query generation target. Each kind maps to one `{kind}.sql.tmpl` template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryKind {
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl QueryKind {
    /// All kinds, in the order they appear in generated files
    pub const ALL: [QueryKind; 5] = [
        QueryKind::Get,
        QueryKind::List,
        QueryKind::Create,
        QueryKind::Update,
        QueryKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Get => "get",
            QueryKind::List => "list",
            QueryKind::Create => "create",
            QueryKind::Update => "update",
            QueryKind::Delete => "delete",
        }
    }

    /// Template file name, e.g. `get.sql.tmpl`
    pub fn template_name(&self) -> String {
        format!("{}.sql.tmpl", self.as_str())
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown query kind: {}", s))
    }
}
