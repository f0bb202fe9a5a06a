//! # host-store
//!
//! `host-store` holds the statically configured host reservations of a DHCP
//! server: bindings between a client's identifier (hardware address or DUID)
//! and its reserved resources (IPv4 address, IPv6 addresses/prefixes,
//! hostname). The config loader translates parsed reservations into [`Host`]
//! records and feeds them to [`HostStore::add`]; packet-processing code then
//! queries the store with identifiers or addresses pulled from incoming
//! messages.
//!
//! One record is reachable three independent ways: by client identity, by its
//! reserved IPv4 address, and by any of its reserved IPv6 addresses. The store
//! keeps all records in a single arena and maintains one index per access
//! path, each holding [`HostId`] handles into the arena.
//!
//! The store has no interior locking. A generation is populated on one thread
//! (`add` takes `&mut self`), after which the instance is treated as read-only
//! and may be shared across packet workers (e.g. behind an `Arc`). A config
//! reload builds a fresh store and swaps the active-generation pointer; live
//! generations are never mutated in place.
//!
//! [`Host`]: host::Host
//! [`HostStore::add`]: store::HostStore::add

pub mod error;
pub mod host;
mod index;
pub mod store;

pub use error::HostStoreError;
pub use host::{Host, Identifier, IdentifierKind, Ipv6Reservation, Ipv6ReservationKind, SubnetId};
pub use index::HostId;
pub use store::HostStore;
