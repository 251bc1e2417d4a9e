use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::lookup_host;

use crate::error::SweepError;

/// Validate the dotted-quad IPv4 form used for CLI targets: four decimal
/// octets, each in 0..=255. Shaped for use as a clap value parser.
pub fn parse_ipv4(s: &str) -> Result<String, String> {
    if s.parse::<Ipv4Addr>().is_ok() {
        Ok(s.to_string())
    } else {
        Err(format!("not a valid IPv4 address: {s}"))
    }
}

/// Resolve a target string to a single address, once, before any probing.
///
/// IP literals are parsed directly. Anything else goes through one
/// `lookup_host` call and the first IPv4 mapping wins.
pub async fn resolve(target: &str) -> Result<IpAddr, SweepError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = lookup_host((target, 0u16))
        .await
        .map_err(|e| {
            log::debug!("lookup for `{target}` failed: {e}");
            SweepError::HostUnresolved(target.to_string())
        })?;

    addrs
        .into_iter()
        .find_map(|saddr| match saddr {
            SocketAddr::V4(s4) => {
                let ip = *s4.ip();
                log::debug!("resolved `{target}` to {ip}");
                Some(IpAddr::V4(ip))
            }
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| SweepError::HostUnresolved(target.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quads() {
        for addr in ["0.0.0.0", "127.0.0.1", "192.168.1.42", "255.255.255.255"] {
            assert!(parse_ipv4(addr).is_ok(), "{addr} should validate");
        }
    }

    #[test]
    fn rejects_out_of_range_octets() {
        for addr in ["256.0.0.1", "1.2.3.300", "999.999.999.999"] {
            assert!(parse_ipv4(addr).is_err(), "{addr} should be rejected");
        }
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        for addr in ["1.2.3", "1.2.3.4.5", "1", ""] {
            assert!(parse_ipv4(addr).is_err(), "{addr:?} should be rejected");
        }
    }

    #[test]
    fn rejects_non_numeric_input() {
        for addr in ["a.b.c.d", "1.2.3.x", "localhost", "1.2.3.-4", " 1.2.3.4"] {
            assert!(parse_ipv4(addr).is_err(), "{addr:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn resolves_ip_literal_without_dns() {
        let ip = resolve("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn unresolvable_name_fails() {
        // `.invalid` is reserved and never resolves (RFC 2606).
        let err = resolve("no-such-host.invalid").await.unwrap_err();
        assert!(matches!(err, SweepError::HostUnresolved(_)));
    }
}
