//! Client address rules shared by the cache key and the geolocation lookup.

use std::net::IpAddr;

/// Address to send to the geolocation service for `ip`.
///
/// Empty, unparsable and loopback inputs become the empty string, which makes
/// the geolocation service locate the caller instead.
pub fn geolocation_address(ip: &str) -> &str {
    let trimmed = ip.trim();
    match trimmed.parse::<IpAddr>() {
        Ok(addr) if is_loopback(addr) => "",
        Ok(_) => trimmed,
        Err(_) => "",
    }
}

/// Address a request is about: a non-empty override wins over the client address.
pub fn subject_ip(override_ip: Option<&str>, client_ip: Option<IpAddr>) -> String {
    match override_ip.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => client_ip.map(|addr| addr.to_string()).unwrap_or_default(),
    }
}

fn is_loopback(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
    }
}
