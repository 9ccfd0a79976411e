//! Port specification parsing and expansion
//!
//! Firewall resources list ports as strings: either a single number
//! (`"50051"`) or an inclusive range (`"1-5"`). [`expand_ports`] turns such a
//! list into a [`PortSet`], the deduplicated union of every token.
//!
//! # Empty means all ports
//!
//! A resource entry without ports applies to every port. The expander keeps
//! that as an *empty* set instead of materializing 0-65535; consumers must
//! treat an empty [`PortSet`] as "all ports" (see [`PortSet::covers`]).
//!
//! # Example
//!
//! ```
//! use fwflat::core::ports::expand_ports;
//!
//! let ports = expand_ports(&["1-5", "50051", "3"]).unwrap();
//! assert_eq!(ports.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 50051]);
//! assert_eq!(ports.len(), 6);
//!
//! let all = expand_ports::<&str>(&[]).unwrap();
//! assert!(all.is_empty());
//! assert!(all.covers(22));
//! ```

use crate::core::error::{Error, PortSpecError, Result};
use crate::validators::{parse_port_number, validate_port_range};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive range of port numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRange {
    pub start: u32,
    pub end: u32,
}

impl PortRange {
    pub fn single(port: u32) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Number of ports in the range
    pub fn port_count(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn contains(&self, port: u32) -> bool {
        (self.start..=self.end).contains(&port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = Error;

    /// Parses `"N"` or `"A-B"`; `A` must not exceed `B`.
    fn from_str(token: &str) -> Result<Self> {
        parse_token(token).map_err(|reason| Error::port_spec(token, reason))
    }
}

fn parse_token(token: &str) -> std::result::Result<PortRange, PortSpecError> {
    let Some((low, high)) = token.split_once('-') else {
        return parse_port_number(token).map(PortRange::single);
    };
    if high.contains('-') {
        return Err(PortSpecError::BadRange);
    }
    let (start, end) = validate_port_range(parse_port_number(low)?, parse_port_number(high)?)?;
    Ok(PortRange { start, end })
}

/// Deduplicated set of port numbers
///
/// Stored as sorted, disjoint, non-adjacent ranges so wide ranges stay
/// cheap. Two sets with the same members are equal no matter how they were
/// built. An empty set means the rule applies to all ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct PortSet {
    ranges: Vec<PortRange>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no ports are listed, i.e. the rule applies to all ports
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of individual ports in the set
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(PortRange::port_count).sum()
    }

    /// Returns `true` if `port` is listed explicitly
    pub fn contains(&self, port: u32) -> bool {
        self.ranges
            .binary_search_by(|range| {
                if range.end < port {
                    std::cmp::Ordering::Less
                } else if range.start > port {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Returns `true` if a rule with this port set applies to `port`.
    ///
    /// Unlike [`PortSet::contains`], an empty set covers every port.
    pub fn covers(&self, port: u32) -> bool {
        self.is_empty() || self.contains(port)
    }

    /// Normalized ranges in ascending order
    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// Every individual port in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|range| range.start..=range.end)
    }

    /// Adds a range, merging it with any overlapping or adjacent ranges
    pub fn insert_range(&mut self, range: PortRange) {
        let mut merged = range;
        // First range that could overlap or touch the new one
        let first = self
            .ranges
            .partition_point(|r| r.end.saturating_add(1) < merged.start);
        let mut last = first;
        while last < self.ranges.len() && self.ranges[last].start <= merged.end.saturating_add(1) {
            merged.start = merged.start.min(self.ranges[last].start);
            merged.end = merged.end.max(self.ranges[last].end);
            last += 1;
        }
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    pub fn insert(&mut self, port: u32) {
        self.insert_range(PortRange::single(port));
    }

    /// Union of two sets
    pub fn union(&self, other: &PortSet) -> PortSet {
        let mut out = self.clone();
        for range in &other.ranges {
            out.insert_range(*range);
        }
        out
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "all");
        }
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl FromStr for PortSet {
    type Err = Error;

    /// Parses comma-separated port tokens, e.g. `"22,80-443"`.
    /// An empty string yields the empty set.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::new());
        }
        let tokens: Vec<&str> = s.split(',').collect();
        expand_ports(&tokens)
    }
}

impl FromIterator<u32> for PortSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        iter.into_iter().map(PortRange::single).collect()
    }
}

impl FromIterator<PortRange> for PortSet {
    fn from_iter<I: IntoIterator<Item = PortRange>>(iter: I) -> Self {
        let mut set = Self::new();
        for range in iter {
            set.insert_range(range);
        }
        set
    }
}

impl From<PortSet> for Vec<String> {
    fn from(set: PortSet) -> Self {
        set.ranges.iter().map(ToString::to_string).collect()
    }
}

impl TryFrom<Vec<String>> for PortSet {
    type Error = Error;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        expand_ports(&tokens)
    }
}

/// Expands port tokens into the deduplicated set of ports they name.
///
/// Each token is either a decimal number or an inclusive `low-high` range.
/// An empty slice yields an empty set, which callers read as "all ports".
/// Numbers above 65535 are not rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidPortSpec`] for the first token that is not a
/// decimal number or well-formed range, or whose low bound exceeds its high
/// bound.
pub fn expand_ports<S: AsRef<str>>(specs: &[S]) -> Result<PortSet> {
    let mut set = PortSet::new();
    for spec in specs {
        set.insert_range(spec.as_ref().parse()?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(set: &PortSet) -> Vec<u32> {
        set.iter().collect()
    }

    #[test]
    fn test_expand_range_and_single() {
        let set = expand_ports(&["1-5", "50051"]).unwrap();
        assert_eq!(ports(&set), vec![1, 2, 3, 4, 5, 50051]);
    }

    #[test]
    fn test_expand_empty_is_empty() {
        let set = expand_ports::<String>(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(ports(&set), Vec::<u32>::new());
    }

    #[test]
    fn test_expand_deduplicates_overlaps() {
        let set = expand_ports(&["1-5", "3-8", "5", "8"]).unwrap();
        assert_eq!(ports(&set), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(set.ranges(), &[PortRange { start: 1, end: 8 }]);
    }

    #[test]
    fn test_expand_merges_adjacent_ranges() {
        let set = expand_ports(&["10-19", "20-29", "1"]).unwrap();
        assert_eq!(
            set.ranges(),
            &[PortRange::single(1), PortRange { start: 10, end: 29 }]
        );
    }

    #[test]
    fn test_expand_order_independent() {
        let a = expand_ports(&["443", "1-5", "80"]).unwrap();
        let b = expand_ports(&["80", "443", "5", "1-4"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expand_single_port_range() {
        let set = expand_ports(&["7-7"]).unwrap();
        assert_eq!(ports(&set), vec![7]);
    }

    #[test]
    fn test_expand_full_range_is_compact() {
        let set = expand_ports(&["0-65535"]).unwrap();
        assert_eq!(set.len(), 65536);
        assert_eq!(set.ranges().len(), 1);
        assert!(set.contains(0));
        assert!(set.contains(65535));
        assert!(!set.contains(65536));
    }

    #[test]
    fn test_expand_passes_out_of_range_ports_through() {
        let set = expand_ports(&["70000", "65535-65537"]).unwrap();
        assert_eq!(ports(&set), vec![65535, 65536, 65537, 70000]);
    }

    #[test]
    fn test_expand_touching_u32_max() {
        let set = expand_ports(&["4294967294-4294967295", "4294967295"]).unwrap();
        assert_eq!(ports(&set), vec![u32::MAX - 1, u32::MAX]);
    }

    #[test]
    fn test_expand_inverted_range_fails() {
        let err = expand_ports(&["5-1"]).unwrap_err();
        match err {
            Error::InvalidPortSpec { spec, reason } => {
                assert_eq!(spec, "5-1");
                assert_eq!(reason, PortSpecError::Inverted { start: 5, end: 1 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_expand_rejects_bad_tokens() {
        for bad in ["", "abc", "1-", "-1", "1-2-3", "1--2", " 1", "1 - 2", "22/tcp"] {
            let err = expand_ports(&[bad]).unwrap_err();
            assert!(err.is_invalid_port_spec(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_expand_reports_first_bad_token() {
        let err = expand_ports(&["22", "x", "5-1"]).unwrap_err();
        assert!(matches!(err, Error::InvalidPortSpec { ref spec, .. } if spec == "x"));
    }

    #[test]
    fn test_contains_and_covers() {
        let set = expand_ports(&["20-22", "80"]).unwrap();
        assert!(set.contains(21));
        assert!(set.contains(80));
        assert!(!set.contains(23));
        assert!(!set.contains(79));
        assert!(set.covers(22));
        assert!(!set.covers(443));

        let all = PortSet::new();
        assert!(!all.contains(443));
        assert!(all.covers(443));
    }

    #[test]
    fn test_union() {
        let a = expand_ports(&["1-3"]).unwrap();
        let b = expand_ports(&["3-5", "9"]).unwrap();
        assert_eq!(ports(&a.union(&b)), vec![1, 2, 3, 4, 5, 9]);
    }

    #[test]
    fn test_from_iterator_matches_expand() {
        let built: PortSet = [5u32, 1, 2, 50051, 3, 4, 1].into_iter().collect();
        assert_eq!(built, expand_ports(&["1-5", "50051"]).unwrap());
    }

    #[test]
    fn test_display_and_from_str() {
        let set: PortSet = "80,22,20-21".parse().unwrap();
        assert_eq!(set.to_string(), "20-22,80");
        assert_eq!(PortSet::new().to_string(), "all");
        assert!("".parse::<PortSet>().unwrap().is_empty());
        assert!("22,".parse::<PortSet>().is_err());
    }

    #[test]
    fn test_serde_uses_port_tokens() {
        let set = expand_ports(&["50051", "1-5"]).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!(["1-5", "50051"]));

        let back: PortSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);

        assert!(serde_json::from_value::<PortSet>(serde_json::json!(["9-1"])).is_err());
    }

    #[test]
    fn test_port_range_count() {
        assert_eq!(PortRange::single(0).port_count(), 1);
        assert_eq!(
            PortRange {
                start: 0,
                end: u32::MAX
            }
            .port_count(),
            u64::from(u32::MAX) + 1
        );
    }
}
