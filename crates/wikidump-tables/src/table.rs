//! The fixed set of convertible tables

use std::str::FromStr;

/// A dump table with a known tuple layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Page,
    PageLinks,
    Redirect,
}

/// Name outside the table whitelist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTable(pub String);

impl std::fmt::Display for UnknownTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid table specified: {} (expected one of: page, pagelinks, redirect)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTable {}

impl Table {
    pub const ALL: [Table; 3] = [Table::Page, Table::PageLinks, Table::Redirect];

    /// Table name as it appears in dump file names and `INSERT INTO`
    pub fn name(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::PageLinks => "pagelinks",
            Self::Redirect => "redirect",
        }
    }

    /// Drop repeated tables, keeping first-seen order
    pub fn dedup(tables: &[Table]) -> Vec<Table> {
        let mut out: Vec<Table> = Vec::with_capacity(tables.len());
        for t in tables {
            if !out.contains(t) {
                out.push(*t);
            }
        }
        out
    }
}

impl FromStr for Table {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(Self::Page),
            "pagelinks" => Ok(Self::PageLinks),
            "redirect" => Ok(Self::Redirect),
            other => Err(UnknownTable(other.to_string())),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
