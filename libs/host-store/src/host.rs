//! The host reservation record and its identifier/reservation value types.
//!
//! A [`Host`] is built by the config-loading collaborator from parsed input
//! and handed to the store by value. It carries exactly one client identity
//! (hardware address or DUID) plus the reserved resources for up to two
//! subnets, one per address family.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::HostStoreError;

/// Opaque id of a configured subnet. `0` means "no applicable subnet" and is
/// never a valid id.
pub type SubnetId = u32;

/// Discriminator for the client identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentifierKind {
    /// Link-layer hardware address (`chaddr` in DHCPv4).
    HwAddr,
    /// Protocol-assigned unique identifier (DUID).
    Duid,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::HwAddr => write!(f, "hw-address"),
            IdentifierKind::Duid => write!(f, "duid"),
        }
    }
}

/// A client identity: kind tag plus immutable byte sequence. Ordered so it can
/// key the store's identifier index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    kind: IdentifierKind,
    bytes: Vec<u8>,
}

impl Identifier {
    pub fn new(kind: IdentifierKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    pub fn hwaddr(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(IdentifierKind::HwAddr, bytes)
    }

    pub fn duid(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(IdentifierKind::Duid, bytes)
    }

    /// Parse the textual form used in config files: hex digits optionally
    /// separated by `:` or `-`, e.g. `"00:0c:01:02:03:04"`.
    pub fn parse(kind: IdentifierKind, text: &str) -> Result<Self, HostStoreError> {
        let digits: String = text.chars().filter(|ch| *ch != ':' && *ch != '-').collect();
        let bytes = hex::decode(&digits).map_err(|err| {
            HostStoreError::InvalidHost(format!("identifier '{text}' is not valid hex: {err}"))
        })?;
        if bytes.is_empty() {
            return Err(HostStoreError::InvalidHost(format!(
                "identifier '{text}' contains no bytes"
            )));
        }
        Ok(Self { kind, bytes })
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Displays the identifier bytes in colon-separated hex, the same form
/// `parse` accepts.
impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Whether an IPv6 reservation is a single address or a delegated prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ipv6ReservationKind {
    Address,
    Prefix,
}

/// One reserved IPv6 resource. A host may own several of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Reservation {
    kind: Ipv6ReservationKind,
    prefix: Ipv6Addr,
    prefix_len: u8,
}

impl Ipv6Reservation {
    /// A single reserved address (prefix length fixed at 128).
    pub fn address(addr: Ipv6Addr) -> Self {
        Self {
            kind: Ipv6ReservationKind::Address,
            prefix: addr,
            prefix_len: 128,
        }
    }

    /// A reserved delegated prefix.
    pub fn prefix(addr: Ipv6Addr, prefix_len: u8) -> Self {
        Self {
            kind: Ipv6ReservationKind::Prefix,
            prefix: addr,
            prefix_len,
        }
    }

    pub fn kind(&self) -> Ipv6ReservationKind {
        self.kind
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.prefix
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for Ipv6Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Ipv6ReservationKind::Address => write!(f, "{}", self.prefix),
            Ipv6ReservationKind::Prefix => write!(f, "{}/{}", self.prefix, self.prefix_len),
        }
    }
}

/// A static host reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    identifier: Identifier,
    ipv4_subnet_id: SubnetId,
    ipv6_subnet_id: SubnetId,
    ipv4_reservation: Option<Ipv4Addr>,
    ipv6_reservations: Vec<Ipv6Reservation>,
    hostname: Option<String>,
}

impl Host {
    /// New reservation for the given client identity. Subnet ids start at 0
    /// ("not applicable"); the store rejects a record that never sets one.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            ipv4_subnet_id: 0,
            ipv6_subnet_id: 0,
            ipv4_reservation: None,
            ipv6_reservations: Vec::new(),
            hostname: None,
        }
    }

    pub fn with_ipv4_subnet(mut self, id: SubnetId) -> Self {
        self.ipv4_subnet_id = id;
        self
    }

    pub fn with_ipv6_subnet(mut self, id: SubnetId) -> Self {
        self.ipv6_subnet_id = id;
        self
    }

    pub fn with_ipv4_reservation(mut self, addr: Ipv4Addr) -> Self {
        self.ipv4_reservation = Some(addr);
        self
    }

    /// Appends one IPv6 reservation; call repeatedly for multiple resources.
    pub fn with_ipv6_reservation(mut self, resrv: Ipv6Reservation) -> Self {
        self.ipv6_reservations.push(resrv);
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn ipv4_subnet_id(&self) -> SubnetId {
        self.ipv4_subnet_id
    }

    pub fn ipv6_subnet_id(&self) -> SubnetId {
        self.ipv6_subnet_id
    }

    pub fn ipv4_reservation(&self) -> Option<Ipv4Addr> {
        self.ipv4_reservation
    }

    pub fn ipv6_reservations(&self) -> &[Ipv6Reservation] {
        &self.ipv6_reservations
    }

    pub fn has_ipv6_reservations(&self) -> bool {
        !self.ipv6_reservations.is_empty()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn set_hostname(&mut self, hostname: Option<String>) {
        self.hostname = hostname;
    }

    /// The identifier bytes when this reservation is keyed by hardware
    /// address, in the slot shape the identity queries take.
    pub fn hwaddr(&self) -> Option<&[u8]> {
        (self.identifier.kind() == IdentifierKind::HwAddr).then(|| self.identifier.bytes())
    }

    /// The identifier bytes when this reservation is keyed by DUID.
    pub fn duid(&self) -> Option<&[u8]> {
        (self.identifier.kind() == IdentifierKind::Duid).then(|| self.identifier.bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_parse_and_display_round_trip() {
        let id = Identifier::parse(IdentifierKind::HwAddr, "00:0c:01:02:03:04").unwrap();
        assert_eq!(id.bytes(), &[0x00, 0x0c, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(id.to_string(), "00:0c:01:02:03:04");

        // dashes and bare hex are accepted too
        let dashed = Identifier::parse(IdentifierKind::HwAddr, "00-0c-01-02-03-04").unwrap();
        let bare = Identifier::parse(IdentifierKind::HwAddr, "000c01020304").unwrap();
        assert_eq!(id, dashed);
        assert_eq!(id, bare);
    }

    #[test]
    fn identifier_parse_rejects_garbage() {
        let err = Identifier::parse(IdentifierKind::Duid, "zz:yy").unwrap_err();
        assert!(err.is_invalid_host());

        let err = Identifier::parse(IdentifierKind::Duid, "").unwrap_err();
        assert!(err.is_invalid_host());
    }

    #[test]
    fn identifier_ordering_separates_kinds() {
        // same bytes under different kinds are distinct index keys
        let hw = Identifier::hwaddr(vec![0xaa, 0xbb]);
        let duid = Identifier::duid(vec![0xaa, 0xbb]);
        assert_ne!(hw, duid);
        assert!(hw < duid);
    }

    #[test]
    fn host_identity_slots() {
        let host = Host::new(Identifier::hwaddr(vec![1, 2, 3]));
        assert_eq!(host.hwaddr(), Some(&[1u8, 2, 3][..]));
        assert_eq!(host.duid(), None);

        let host = Host::new(Identifier::duid(vec![4, 5]));
        assert_eq!(host.hwaddr(), None);
        assert_eq!(host.duid(), Some(&[4u8, 5][..]));
    }

    #[test]
    fn address_reservation_is_a_full_length_prefix() {
        let resrv = Ipv6Reservation::address("2001:db8::1".parse().unwrap());
        assert_eq!(resrv.kind(), Ipv6ReservationKind::Address);
        assert_eq!(resrv.prefix_len(), 128);
        assert_eq!(resrv.to_string(), "2001:db8::1");

        let pd = Ipv6Reservation::prefix("2001:db8:1::".parse().unwrap(), 56);
        assert_eq!(pd.kind(), Ipv6ReservationKind::Prefix);
        assert_eq!(pd.to_string(), "2001:db8:1::/56");
    }

    #[test]
    fn host_accessors_reflect_configuration() {
        let host = Host::new(Identifier::hwaddr(vec![1, 2, 3, 4, 5, 6]))
            .with_ipv4_subnet(1)
            .with_ipv6_subnet(2)
            .with_ipv4_reservation("192.0.2.10".parse().unwrap())
            .with_ipv6_reservation(Ipv6Reservation::address("2001:db8::1".parse().unwrap()))
            .with_hostname("printer.example.org");

        assert_eq!(host.ipv4_subnet_id(), 1);
        assert_eq!(host.ipv6_subnet_id(), 2);
        assert_eq!(host.ipv4_reservation(), "192.0.2.10".parse().ok());
        assert!(host.has_ipv6_reservations());
        assert_eq!(host.hostname(), Some("printer.example.org"));
    }
}
