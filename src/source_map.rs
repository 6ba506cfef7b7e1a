//! Mapping between word addresses and source code spans.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use crate::parsing::{AsLineSpan, LineSpan, Span};

/// Mapping from word addresses into source code spans. This type is generic
/// over the span type. Most common types for the generic `V` are [Span] and [LineSpan].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap<V> {
    inner: BTreeMap<u16, V>,
}

impl<V> Default for SourceMap<V> {
    fn default() -> SourceMap<V> {
        SourceMap {
            inner: BTreeMap::new(),
        }
    }
}

impl<V> FromIterator<(u16, V)> for SourceMap<V> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (u16, V)>,
    {
        SourceMap {
            inner: BTreeMap::from_iter(iter),
        }
    }
}

impl<V> SourceMap<V> {
    pub fn insert(&mut self, address: u16, span: V) {
        self.inner.insert(address, span);
    }

    /// Returns the span in the original source code which
    /// produced the word at the given address.
    pub fn get_source_span(&self, address: u16) -> Option<&V> {
        self.inner.get(&address)
    }

    /// Iterates the mapping in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &V)> {
        self.inner.iter().map(|(address, span)| (*address, span))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SourceMap<Span> {
    /// Converts a [SourceMap] containing byte offset based spans ([Span])
    /// into one containing line and column number based spans ([LineSpan]).
    pub fn into_line_based(self, source: &str) -> SourceMap<LineSpan> {
        self.inner
            .into_iter()
            .map(|(address, span)| (address, span.as_line_span(source)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::LineLocation;

    #[test]
    fn test_into_line_based() {
        let source = "@5\n  D=A\n";
        let map: SourceMap<Span> = vec![(0, 1..2), (1, 5..8)].into_iter().collect();

        let lines = map.into_line_based(source);

        assert_eq!(
            lines.get_source_span(1),
            Some(&(LineLocation { line: 2, column: 3 }..LineLocation { line: 2, column: 6 }))
        );
        assert_eq!(lines.get_source_span(2), None);
        assert_eq!(lines.len(), 2);
    }
}
