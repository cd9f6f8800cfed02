//! Host and address validation helpers

use std::net::IpAddr;

/// Check if a string is a valid IP address (IPv4 or IPv6)
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

/// Check if a string is a valid DNS hostname (RFC 1123 labels)
pub fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Check if a string can be used as the host part of a node endpoint
pub fn is_valid_host(host: &str) -> bool {
    is_valid_ip(host) || is_valid_hostname(host)
}
