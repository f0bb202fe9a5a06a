//! The store facade: insertion validation, the three indices, and the
//! disambiguation algorithm for identity lookups.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::{debug, warn};

use crate::error::HostStoreError;
use crate::host::{Host, Identifier, SubnetId};
use crate::index::{AddrIndex, HostId, IdentifierIndex};

/// In-memory table of static host reservations.
///
/// Populated single-threaded through [`add`](HostStore::add), then shared
/// read-only with packet workers for the lifetime of the config generation.
/// Queries return shared `&Host` views; [`host_mut`](HostStore::host_mut) is
/// the explicit mutable checkout for build-phase fixups.
#[derive(Debug, Default)]
pub struct HostStore {
    /// record arena; a `HostId` is a stable position in here
    hosts: Vec<Host>,
    by_identity: IdentifierIndex,
    by_ipv4: AddrIndex<Ipv4Addr>,
    by_ipv6: AddrIndex<Ipv6Addr>,
}

impl HostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reservation, taking ownership of the record.
    ///
    /// The record must reference at least one subnet. The v4 leg additionally
    /// requires at least one reservable resource (hostname, IPv4 address, or
    /// an IPv6 reservation); both legs reject a second record for the same
    /// (subnet, identity) pair. A record spanning both families runs both
    /// legs but enters the identifier index exactly once.
    pub fn add(&mut self, host: Host) -> Result<HostId, HostStoreError> {
        if host.ipv4_subnet_id() == 0 && host.ipv6_subnet_id() == 0 {
            return Err(HostStoreError::InvalidHost(format!(
                "reservation for {} must reference at least one subnet, both subnet ids are 0",
                host.identifier()
            )));
        }
        if host.ipv4_subnet_id() != 0 {
            self.check_add_v4(&host)?;
        }
        if host.ipv6_subnet_id() != 0 {
            self.check_add_v6(&host)?;
        }

        let id = HostId(self.hosts.len());
        self.by_identity.insert(host.identifier().clone(), id);
        if let Some(addr) = host.ipv4_reservation() {
            self.by_ipv4.insert(addr, id);
        }
        // one IPv6 index entry per reserved resource; a record with no IPv6
        // reservations (hostname/options only) is simply absent from it
        for resrv in host.ipv6_reservations() {
            self.by_ipv6.insert(resrv.addr(), id);
        }
        debug!(
            identifier = %host.identifier(),
            kind = %host.identifier().kind(),
            v4_subnet = host.ipv4_subnet_id(),
            v6_subnet = host.ipv6_subnet_id(),
            "added host reservation"
        );
        self.hosts.push(host);
        Ok(id)
    }

    fn check_add_v4(&self, host: &Host) -> Result<(), HostStoreError> {
        // a v4-side record must reserve something
        if host.hostname().is_none_or(str::is_empty)
            && host.ipv4_reservation().is_none()
            && !host.has_ipv6_reservations()
        {
            return Err(HostStoreError::InvalidHost(format!(
                "reservation for {} '{}' must include at least one resource, \
                 i.e. hostname, IPv4 address or IPv6 address/prefix",
                host.identifier().kind(),
                host.identifier()
            )));
        }
        if self
            .get_v4(host.ipv4_subnet_id(), host.hwaddr(), host.duid())?
            .is_some()
        {
            return Err(HostStoreError::DuplicateHost {
                subnet_id: host.ipv4_subnet_id(),
                identity: identity_text(host.hwaddr(), host.duid()),
            });
        }
        Ok(())
    }

    fn check_add_v6(&self, host: &Host) -> Result<(), HostStoreError> {
        if self
            .get_v6(host.ipv6_subnet_id(), host.duid(), host.hwaddr())?
            .is_some()
        {
            return Err(HostStoreError::DuplicateHost {
                subnet_id: host.ipv6_subnet_id(),
                identity: identity_text(host.hwaddr(), host.duid()),
            });
        }
        Ok(())
    }

    /// All records matching the hardware address or the DUID (union of the
    /// two probes, in identity-index order).
    pub fn get_all(&self, hwaddr: Option<&[u8]>, duid: Option<&[u8]>) -> Vec<&Host> {
        self.scan_identity(hwaddr, duid)
            .map(|id| &self.hosts[id.0])
            .collect()
    }

    /// All records reserving the given IPv4 address.
    pub fn get_all_v4(&self, addr: IpAddr) -> Result<Vec<&Host>, HostStoreError> {
        let IpAddr::V4(addr) = addr else {
            return Err(HostStoreError::InvalidAddressFamily {
                expected: "IPv4",
                addr,
            });
        };
        Ok(self
            .by_ipv4
            .scan(addr)
            .map(|id| &self.hosts[id.0])
            .collect())
    }

    /// All records with a matching IPv6 reservation.
    pub fn get_all_v6(&self, addr: IpAddr) -> Result<Vec<&Host>, HostStoreError> {
        let IpAddr::V6(addr) = addr else {
            return Err(HostStoreError::InvalidAddressFamily {
                expected: "IPv6",
                addr,
            });
        };
        Ok(self
            .by_ipv6
            .scan(addr)
            .map(|id| &self.hosts[id.0])
            .collect())
    }

    /// The reservation for this identity in an IPv4 subnet, if any.
    pub fn get_v4(
        &self,
        subnet_id: SubnetId,
        hwaddr: Option<&[u8]>,
        duid: Option<&[u8]>,
    ) -> Result<Option<&Host>, HostStoreError> {
        self.disambiguate(subnet_id, false, hwaddr, duid)
    }

    /// The reservation for this identity in an IPv6 subnet, if any.
    pub fn get_v6(
        &self,
        subnet_id: SubnetId,
        duid: Option<&[u8]>,
        hwaddr: Option<&[u8]>,
    ) -> Result<Option<&Host>, HostStoreError> {
        self.disambiguate(subnet_id, true, hwaddr, duid)
    }

    /// The reservation in `subnet_id` for an IPv4 address. Returns the first
    /// in-subnet match; see [`add`](HostStore::add) for the uniqueness rules
    /// that normally keep this to a single candidate.
    pub fn get_v4_by_addr(&self, subnet_id: SubnetId, addr: Ipv4Addr) -> Option<&Host> {
        let mut matches = self
            .by_ipv4
            .scan(addr)
            .map(|id| &self.hosts[id.0])
            .filter(|host| host.ipv4_subnet_id() == subnet_id);
        let first = matches.next();
        // address uniqueness within a subnet is the config loader's job;
        // tolerate a collision here but make it visible
        if first.is_some() && matches.next().is_some() {
            warn!(
                %addr,
                subnet_id,
                "multiple reservations share one address in the same subnet, returning the first"
            );
        }
        first
    }

    /// The reservation in `subnet_id` for an IPv6 address.
    pub fn get_v6_by_addr(&self, subnet_id: SubnetId, addr: Ipv6Addr) -> Option<&Host> {
        let mut matches = self
            .by_ipv6
            .scan(addr)
            .map(|id| &self.hosts[id.0])
            .filter(|host| host.ipv6_subnet_id() == subnet_id);
        let first = matches.next();
        if first.is_some() && matches.next().is_some() {
            warn!(
                %addr,
                subnet_id,
                "multiple reservations share one address in the same subnet, returning the first"
            );
        }
        first
    }

    /// Lookup by delegated prefix. Not supported; always an error rather than
    /// a silently empty result.
    pub fn get_v6_by_prefix(
        &self,
        _prefix: Ipv6Addr,
        _prefix_len: u8,
    ) -> Result<Option<&Host>, HostStoreError> {
        Err(HostStoreError::NotImplemented(
            "prefix-based IPv6 host lookup",
        ))
    }

    pub fn host(&self, id: HostId) -> Option<&Host> {
        self.hosts.get(id.0)
    }

    /// Mutable checkout of a record during the build phase. Changing a
    /// record's identity or reserved addresses after insertion is not
    /// supported, the indices keep their original keys.
    pub fn host_mut(&mut self, id: HostId) -> Option<&mut Host> {
        self.hosts.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// All records in insertion order, for config dump and diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    /// Union scan behind every identity query: each supplied identifier
    /// independently probes the identifier index under its own kind.
    fn scan_identity<'a>(
        &'a self,
        hwaddr: Option<&[u8]>,
        duid: Option<&[u8]>,
    ) -> impl Iterator<Item = HostId> + use<'a> {
        let hw = hwaddr.map(|bytes| self.by_identity.scan(&Identifier::hwaddr(bytes)));
        let uid = duid.map(|bytes| self.by_identity.scan(&Identifier::duid(bytes)));
        hw.into_iter().flatten().chain(uid.into_iter().flatten())
    }

    /// Narrow an identity union to at most one record for `subnet_id`.
    ///
    /// A second in-subnet match means the admin keyed one reservation on the
    /// hardware address and another on the DUID for what the caller believes
    /// is a single client; there is no authoritative choice, so report it.
    fn disambiguate(
        &self,
        subnet_id: SubnetId,
        v6_subnet: bool,
        hwaddr: Option<&[u8]>,
        duid: Option<&[u8]>,
    ) -> Result<Option<&Host>, HostStoreError> {
        let mut found: Option<HostId> = None;
        for id in self.scan_identity(hwaddr, duid) {
            let host = &self.hosts[id.0];
            let host_subnet = if v6_subnet {
                host.ipv6_subnet_id()
            } else {
                host.ipv4_subnet_id()
            };
            if host_subnet != subnet_id {
                continue;
            }
            if found.is_some() {
                return Err(HostStoreError::DuplicateHost {
                    subnet_id,
                    identity: identity_text(hwaddr, duid),
                });
            }
            found = Some(id);
        }
        Ok(found.map(|id| &self.hosts[id.0]))
    }
}

/// Error-message rendering of an identity probe pair, `(null)` for an absent
/// identifier.
fn identity_text(hwaddr: Option<&[u8]>, duid: Option<&[u8]>) -> String {
    let hw = hwaddr.map(|bytes| Identifier::hwaddr(bytes).to_string());
    let uid = duid.map(|bytes| Identifier::duid(bytes).to_string());
    format!(
        "HW address '{}' and DUID '{}'",
        hw.as_deref().unwrap_or("(null)"),
        uid.as_deref().unwrap_or("(null)")
    )
}
