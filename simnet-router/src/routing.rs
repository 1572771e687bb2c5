//! LPM (Longest Prefix Match) forwarding table.
//!
//! This module provides:
//! - `Route`: A human-readable (CIDR prefix, output link) pair
//! - `ForwardingEntry`: A route converted to an integer prefix
//! - `ForwardingTable`: Entries sorted longest prefix first, with LPM lookup
//! - `Router`: Holder for the current table that can swap in a rebuilt one

use crate::addr::{Ipv4Prefix, parse_addr};
use crate::error::Result;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Link returned when no route matches a destination.
pub const DEFAULT_GATEWAY: &str = "Default Gateway";

/// A route as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// CIDR prefix, e.g. `223.1.1.0/24`.
    pub prefix: String,
    /// Output link for destinations inside the prefix.
    pub link: String,
}

impl Route {
    pub fn new(prefix: impl Into<String>, link: impl Into<String>) -> Self {
        Route {
            prefix: prefix.into(),
            link: link.into(),
        }
    }
}

impl<P: Into<String>, L: Into<String>> From<(P, L)> for Route {
    fn from((prefix, link): (P, L)) -> Self {
        Route::new(prefix, link)
    }
}

/// A route after prefix conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingEntry {
    prefix: Ipv4Prefix,
    link: String,
}

impl ForwardingEntry {
    fn from_route(route: &Route) -> Result<Self> {
        Ok(ForwardingEntry {
            prefix: route.prefix.parse()?,
            link: route.link.clone(),
        })
    }

    /// Network prefix of this entry.
    pub fn prefix(&self) -> Ipv4Prefix {
        self.prefix
    }

    /// Prefix length in bits; the table sort key.
    pub fn prefix_len(&self) -> u8 {
        self.prefix.len()
    }

    /// Leading prefix bits as a `0`/`1` string.
    pub fn binary_prefix(&self) -> String {
        self.prefix.to_binary()
    }

    /// Output link.
    pub fn link(&self) -> &str {
        &self.link
    }

    #[inline]
    fn matches(&self, addr: Ipv4Addr) -> bool {
        self.prefix.contains(addr)
    }
}

/// Forwarding table sorted by prefix length, longest first.
///
/// Entries of equal length keep the order their routes were given in, so the
/// first inserted of two equal-length overlapping routes wins a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingTable {
    entries: Vec<ForwardingEntry>,
}

impl ForwardingTable {
    /// Build a table from routes.
    ///
    /// Fails on the first malformed prefix; no partial table is returned.
    pub fn build<I>(routes: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Route>,
    {
        let mut entries = routes
            .into_iter()
            .map(|route| ForwardingEntry::from_route(&route.into()))
            .collect::<Result<Vec<_>>>()?;

        // Vec::sort_by is stable, equal lengths stay in insertion order.
        entries.sort_by(|a, b| b.prefix_len().cmp(&a.prefix_len()));

        debug!(entries = entries.len(), "Built forwarding table");
        Ok(ForwardingTable { entries })
    }

    /// Link of the longest prefix containing `addr`, if any.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<&str> {
        // Sorted longest first, so the first hit is the longest match.
        self.entries
            .iter()
            .find(|entry| entry.matches(addr))
            .map(|entry| entry.link())
    }

    /// Output link for a dotted-quad destination.
    ///
    /// Falls back to [`DEFAULT_GATEWAY`] when nothing matches. Only a
    /// malformed address is an error.
    pub fn route(&self, dest: &str) -> Result<&str> {
        let addr = parse_addr(dest)?;
        let link = self.lookup(addr).unwrap_or(DEFAULT_GATEWAY);
        trace!(%addr, link, "Routing decision");
        Ok(link)
    }

    /// Entries in lookup order.
    pub fn entries(&self) -> &[ForwardingEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForwardingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ForwardingTable {
    type Item = &'a ForwardingEntry;
    type IntoIter = std::slice::Iter<'a, ForwardingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{:<18} {:<32} (len {:>2}) -> {}",
                entry.prefix.to_string(),
                entry.binary_prefix(),
                entry.prefix_len(),
                entry.link
            )?;
        }
        Ok(())
    }
}

/// Owner of the current forwarding table.
///
/// Lookups load the current table without locking. [`Router::replace`] builds
/// a new table off to the side and swaps it in, so concurrent readers see
/// either the old or the new table, never a mix.
pub struct Router {
    table: ArcSwap<ForwardingTable>,
}

impl Router {
    /// Create a router from an initial set of routes.
    pub fn new<I>(routes: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Route>,
    {
        Ok(Self::from_table(ForwardingTable::build(routes)?))
    }

    /// Wrap an already built table.
    pub fn from_table(table: ForwardingTable) -> Self {
        Router {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Snapshot of the current table.
    pub fn table(&self) -> Arc<ForwardingTable> {
        self.table.load_full()
    }

    /// Output link for a dotted-quad destination against the current table.
    pub fn route(&self, dest: &str) -> Result<String> {
        self.table.load().route(dest).map(str::to_string)
    }

    /// Rebuild from `routes` and publish the result.
    ///
    /// On error the current table stays in place.
    pub fn replace<I>(&self, routes: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Route>,
    {
        let table = ForwardingTable::build(routes)?;
        debug!(entries = table.len(), "Replacing forwarding table");
        self.table.store(Arc::new(table));
        Ok(())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::from_table(ForwardingTable::default())
    }
}
