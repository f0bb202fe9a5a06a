//! Secondary lookup structures over the store's record arena.
//!
//! Indices never own records: they hold [`HostId`] handles into the arena, so
//! one physical record can sit in the identifier index and under several IPv6
//! address keys at once without any reference counting. All lookups go through
//! a single equal-key scan primitive that yields handles lazily; the store's
//! public queries filter and map that sequence.

use std::collections::BTreeMap;

use crate::host::Identifier;

/// Stable handle to a record in the store's arena. Handles are only
/// meaningful for the store that issued them and stay valid for that
/// generation's lifetime (records are never removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub(crate) usize);

/// Ordered index keyed by client identity. Multi-valued: the same identity
/// may appear in several subnets, each as its own record.
#[derive(Debug, Default)]
pub(crate) struct IdentifierIndex {
    map: BTreeMap<Identifier, Vec<HostId>>,
}

impl IdentifierIndex {
    pub(crate) fn insert(&mut self, key: Identifier, id: HostId) {
        self.map.entry(key).or_default().push(id);
    }

    /// All handles stored under `key`, in insertion order.
    pub(crate) fn scan<'a>(&'a self, key: &Identifier) -> impl Iterator<Item = HostId> + use<'a> {
        self.map.get(key).into_iter().flatten().copied()
    }
}

/// Ordered multi-valued index keyed by a reserved address, instantiated once
/// per address family.
#[derive(Debug)]
pub(crate) struct AddrIndex<A> {
    map: BTreeMap<A, Vec<HostId>>,
}

// not derived: it would put a spurious `A: Default` bound on the key type
impl<A> Default for AddrIndex<A> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<A: Ord + Copy> AddrIndex<A> {
    pub(crate) fn insert(&mut self, addr: A, id: HostId) {
        self.map.entry(addr).or_default().push(id);
    }

    /// All handles stored under `addr`, in insertion order.
    pub(crate) fn scan(&self, addr: A) -> impl Iterator<Item = HostId> + '_ {
        self.map.get(&addr).into_iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn identifier_index_scan_returns_all_matches_in_order() {
        let mut idx = IdentifierIndex::default();
        let key = Identifier::hwaddr(vec![1, 2, 3]);
        idx.insert(key.clone(), HostId(0));
        idx.insert(key.clone(), HostId(2));
        idx.insert(Identifier::duid(vec![1, 2, 3]), HostId(1));

        let ids: Vec<_> = idx.scan(&key).collect();
        assert_eq!(ids, vec![HostId(0), HostId(2)]);

        // restartable: a second scan walks the same sequence
        let again: Vec<_> = idx.scan(&key).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn identifier_index_scan_misses_are_empty() {
        let idx = IdentifierIndex::default();
        let key = Identifier::duid(vec![0xaa]);
        assert_eq!(idx.scan(&key).count(), 0);
    }

    #[test]
    fn addr_index_is_multi_valued() {
        let mut idx = AddrIndex::default();
        let addr = Ipv4Addr::new(192, 0, 2, 10);
        idx.insert(addr, HostId(3));
        idx.insert(addr, HostId(7));
        idx.insert(Ipv4Addr::new(192, 0, 2, 11), HostId(5));

        let ids: Vec<_> = idx.scan(addr).collect();
        assert_eq!(ids, vec![HostId(3), HostId(7)]);
        assert_eq!(idx.scan(Ipv4Addr::new(198, 51, 100, 1)).count(), 0);
    }
}
