use crate::errors::DomainError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Client-subnet hint advertised to an upstream (EDNS option code 8).
///
/// Parses from `ip` (full-length prefix) or `ip/prefix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetHint {
    addr: IpAddr,
    source_prefix: u8,
}

impl SubnetHint {
    pub fn new(addr: IpAddr, source_prefix: u8) -> Result<Self, DomainError> {
        let max = max_prefix(addr);
        if source_prefix > max {
            return Err(DomainError::InvalidIpAddress(format!(
                "prefix /{} exceeds /{} for {}",
                source_prefix, max, addr
            )));
        }
        Ok(Self {
            addr,
            source_prefix,
        })
    }

    /// Full-length hint for a client: /32 for IPv4, /128 for IPv6.
    /// IPv4-mapped IPv6 addresses are reported as IPv4.
    pub fn for_client(addr: IpAddr) -> Self {
        let addr = addr.to_canonical();
        Self {
            addr,
            source_prefix: max_prefix(addr),
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn source_prefix(&self) -> u8 {
        self.source_prefix
    }

    /// EDNS address family: 1 for IPv4, 2 for IPv6.
    pub fn family(&self) -> u16 {
        match self.addr {
            IpAddr::V4(_) => 1,
            IpAddr::V6(_) => 2,
        }
    }
}

fn max_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl FromStr for SubnetHint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(addr) = s.parse::<IpAddr>() {
            return Ok(Self::for_client(addr));
        }
        let network: IpNetwork = s
            .parse()
            .map_err(|e| DomainError::InvalidIpAddress(format!("'{}': {}", s, e)))?;
        Self::new(network.ip(), network.prefix())
    }
}

impl fmt::Display for SubnetHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.source_prefix)
    }
}
