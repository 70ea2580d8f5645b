use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::{IntoName, TokioAsyncResolver, TryParseIp};

/// Default Source engine query port.
pub const DEFAULT_PORT: u16 = 27015;

pub struct Dns {
    resolver: TokioAsyncResolver,
}

impl Dns {
    pub fn new() -> Dns {
        let resolver = TokioAsyncResolver::tokio(
            ResolverConfig::default(),
            ResolverOpts::default());

        Dns {
            resolver
        }
    }

    pub async fn lookup_ip<N: IntoName + TryParseIp>(&self, host: N) -> Option<IpAddr> {
        let response = self.resolver.lookup_ip(host).await.ok()?;
        response.iter().next()
    }

    /// Resolve `host`, `host:port`, an IP literal or a socket address.
    pub async fn resolve(&self, target: &str) -> std::io::Result<SocketAddr> {
        if let Ok(addr) = target.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let (host, port) = split_target(target)?;

        let ip = match host.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => self.lookup_ip(host).await.ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Failed to resolve {}", host),
                )
            })?,
        };

        Ok(SocketAddr::new(ip, port))
    }
}

impl Default for Dns {
    fn default() -> Self {
        Self::new()
    }
}

fn split_target(target: &str) -> std::io::Result<(&str, u16)> {
    // Bare IPv6 literals contain colons but no port.
    if target.parse::<IpAddr>().is_ok() {
        return Ok((target, DEFAULT_PORT));
    }

    match target.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Invalid port in {}", target),
                )
            })?;
            Ok((host, port))
        }
        None => Ok((target, DEFAULT_PORT)),
    }
}
