//! Error types for host reservation storage.
//!
//! Every failure is reported synchronously as one of these variants; "not
//! found" on a single-record lookup is `Ok(None)`, not an error. Nothing is
//! retried internally — whether a failed insertion aborts a config reload is
//! the loader's decision.

use std::net::IpAddr;

use thiserror::Error;

use crate::host::SubnetId;

/// Top-level error type for the host-store crate.
#[derive(Debug, Error)]
pub enum HostStoreError {
    /// Malformed or incomplete host record handed to the store.
    #[error("invalid host reservation: {0}")]
    InvalidHost(String),

    /// Query address family doesn't match the index being searched.
    #[error(
        "must specify an {expected} address when searching for a host, \
         specified address was {addr}"
    )]
    InvalidAddressFamily {
        expected: &'static str,
        addr: IpAddr,
    },

    /// More than one record resolves to the same subnet and client identity,
    /// either discovered at insertion or by a disambiguated lookup.
    #[error("more than one reservation found for the host in subnet id '{subnet_id}' using {identity}")]
    DuplicateHost {
        subnet_id: SubnetId,
        identity: String,
    },

    /// The operation is not supported by this store.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl HostStoreError {
    /// Returns true if this error rejects the record itself (insertion-time
    /// validation failure).
    pub fn is_invalid_host(&self) -> bool {
        matches!(self, HostStoreError::InvalidHost(_))
    }

    /// Returns true if this error signals an ambiguous or duplicated
    /// reservation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, HostStoreError::DuplicateHost { .. })
    }

    /// Returns true if the query used the wrong address family.
    pub fn is_wrong_family(&self) -> bool {
        matches!(self, HostStoreError::InvalidAddressFamily { .. })
    }

    /// Returns true if the operation is unsupported.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, HostStoreError::NotImplemented(_))
    }
}

/// Shorthand result alias for store operations.
pub type HostStoreResult<T> = Result<T, HostStoreError>;

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv6Addr};

    use super::*;

    #[test]
    fn test_error_classification() {
        let invalid = HostStoreError::InvalidHost("no subnet".into());
        assert!(invalid.is_invalid_host());
        assert!(!invalid.is_duplicate());

        let dup = HostStoreError::DuplicateHost {
            subnet_id: 7,
            identity: "HW address '01:02:03'".into(),
        };
        assert!(dup.is_duplicate());
        assert!(!dup.is_wrong_family());

        let family = HostStoreError::InvalidAddressFamily {
            expected: "IPv4",
            addr: IpAddr::V6(Ipv6Addr::LOCALHOST),
        };
        assert!(family.is_wrong_family());
        assert!(!family.is_not_implemented());

        let unimpl = HostStoreError::NotImplemented("prefix-based IPv6 host lookup");
        assert!(unimpl.is_not_implemented());
        assert!(!unimpl.is_invalid_host());
    }

    #[test]
    fn test_error_display() {
        let dup = HostStoreError::DuplicateHost {
            subnet_id: 42,
            identity: "DUID 'aa:bb'".into(),
        };
        let msg = format!("{dup}");
        assert!(msg.contains("subnet id '42'"));
        assert!(msg.contains("DUID 'aa:bb'"));

        let family = HostStoreError::InvalidAddressFamily {
            expected: "IPv6",
            addr: "192.0.2.1".parse().unwrap(),
        };
        let msg = format!("{family}");
        assert!(msg.contains("IPv6"));
        assert!(msg.contains("192.0.2.1"));
    }
}
