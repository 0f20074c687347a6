use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Local host identity reported in every item's `server` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub host: String,
    pub ip: String,
}

/// Resolves the local host name and address once, when a notifier is
/// constructed.
pub trait HostResolver {
    fn resolve(&self) -> io::Result<HostInfo>;
}

/// Resolver backed by the operating system: host name from the OS, address
/// from resolving that name. IPv4 addresses are preferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostResolver;

impl HostResolver for SystemHostResolver {
    fn resolve(&self) -> io::Result<HostInfo> {
        let host = sysinfo::System::host_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "host name is not available")
        })?;

        let addrs: Vec<IpAddr> = (host.as_str(), 0)
            .to_socket_addrs()?
            .map(|addr| addr.ip())
            .collect();

        let ip = addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for host {}", host),
                )
            })?;

        Ok(HostInfo {
            ip: ip.to_string(),
            host,
        })
    }
}

/// Fixed host identity, for tests and for environments where the caller
/// already knows what to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost(pub HostInfo);

impl StaticHost {
    pub fn new(host: impl Into<String>, ip: impl Into<String>) -> Self {
        StaticHost(HostInfo {
            host: host.into(),
            ip: ip.into(),
        })
    }
}

impl HostResolver for StaticHost {
    fn resolve(&self) -> io::Result<HostInfo> {
        Ok(self.0.clone())
    }
}
