//! Common validation utilities for network identifiers.

use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use validator::ValidationError;

lazy_static! {
    static ref MAC_ADDRESS_REGEX: Regex =
        Regex::new(r"^(([0-9A-Fa-f]{2}:){5}|([0-9A-Fa-f]{2}-){5})[0-9A-Fa-f]{2}$").unwrap();
    static ref EXTENSION_NUMBER_REGEX: Regex = Regex::new(r"^[0-9]{2,10}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a MAC address in `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff` form.
pub fn validate_mac_address(mac: &str) -> Result<(), ValidationError> {
    if MAC_ADDRESS_REGEX.is_match(mac) {
        Ok(())
    } else {
        Err(error(
            "mac_address_format",
            "MAC address must be six hex octets separated by ':' or '-'",
        ))
    }
}

/// Canonical storage form of a MAC address: lowercase, colon separated.
pub fn normalize_mac_address(mac: &str) -> String {
    mac.trim().replace('-', ":").to_lowercase()
}

/// Validates an IPv4 or IPv6 address.
pub fn validate_ip_address(ip: &str) -> Result<(), ValidationError> {
    ip.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| error("ip_address_format", "Invalid IP address"))
}

/// Parses a subnet in CIDR notation. The prefix is required.
pub fn parse_subnet(subnet: &str) -> Option<IpNetwork> {
    let (addr, prefix) = subnet.split_once('/')?;
    IpNetwork::new(addr.parse().ok()?, prefix.parse().ok()?).ok()
}

/// Validates a subnet in CIDR notation, e.g. `10.12.0.0/24`.
pub fn validate_subnet(subnet: &str) -> Result<(), ValidationError> {
    parse_subnet(subnet)
        .map(|_| ())
        .ok_or_else(|| error("subnet_format", "Subnet must be in CIDR notation (e.g. 10.0.0.0/24)"))
}

/// Canonical storage form of a subnet: host bits cleared.
///
/// `10.0.0.5/24` becomes `10.0.0.0/24`.
pub fn normalize_subnet(subnet: &str) -> Option<String> {
    let net = parse_subnet(subnet)?;
    IpNetwork::new(net.network(), net.prefix())
        .ok()
        .map(|net| net.to_string())
}

/// Returns true when `ip` falls inside `subnet`.
///
/// Mixed address families never match. Malformed input never matches.
pub fn subnet_contains(subnet: &str, ip: &str) -> bool {
    match (parse_subnet(subnet), ip.parse::<IpAddr>()) {
        (Some(net), Ok(ip)) => net.contains(ip),
        _ => false,
    }
}

/// Validates a phone extension number (2 to 10 digits).
pub fn validate_extension_number(number: &str) -> Result<(), ValidationError> {
    if EXTENSION_NUMBER_REGEX.is_match(number) {
        Ok(())
    } else {
        Err(error(
            "extension_number_format",
            "Extension number must be 2 to 10 digits",
        ))
    }
}

/// Validates a percentage in `[0, 100]`. NaN and infinities are rejected.
pub fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(error("percentage_range", "Percentage must be between 0 and 100"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::{IPv4, MACAddress};
    use fake::Fake;

    #[test]
    fn test_validate_mac_address() {
        assert!(validate_mac_address("00:1a:2b:3c:4d:5e").is_ok());
        assert!(validate_mac_address("00-1A-2B-3C-4D-5E").is_ok());
        assert!(validate_mac_address("00:1a:2b:3c:4d").is_err());
        assert!(validate_mac_address("00:1a-2b:3c:4d:5e").is_err());
        assert!(validate_mac_address("zz:1a:2b:3c:4d:5e").is_err());
        assert!(validate_mac_address("").is_err());
    }

    #[test]
    fn test_validate_mac_address_generated() {
        for _ in 0..20 {
            let mac: String = MACAddress().fake();
            assert!(validate_mac_address(&mac).is_ok(), "rejected {}", mac);
        }
    }

    #[test]
    fn test_normalize_mac_address() {
        assert_eq!(normalize_mac_address("00-1A-2B-3C-4D-5E"), "00:1a:2b:3c:4d:5e");
        assert_eq!(normalize_mac_address(" AA:BB:CC:DD:EE:FF "), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_validate_ip_address() {
        assert!(validate_ip_address("10.0.0.1").is_ok());
        assert!(validate_ip_address("fe80::1").is_ok());
        assert!(validate_ip_address("10.0.0.256").is_err());
        assert!(validate_ip_address("phone-1").is_err());

        let ip: String = IPv4().fake();
        assert!(validate_ip_address(&ip).is_ok());
    }

    #[test]
    fn test_validate_subnet() {
        assert!(validate_subnet("10.12.0.0/24").is_ok());
        assert!(validate_subnet("10.12.0.0/32").is_ok());
        assert!(validate_subnet("2001:db8::/48").is_ok());
        assert!(validate_subnet("10.12.0.0/33").is_err());
        assert!(validate_subnet("10.12.0.0").is_err());
        assert!(validate_subnet("10.12.0/24").is_err());
    }

    #[test]
    fn test_validate_subnet_error_message() {
        let err = validate_subnet("nope").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Subnet must be in CIDR notation (e.g. 10.0.0.0/24)"
        );
    }

    #[test]
    fn test_normalize_subnet() {
        assert_eq!(normalize_subnet("10.0.0.5/24").as_deref(), Some("10.0.0.0/24"));
        assert_eq!(normalize_subnet("10.0.0.0/24").as_deref(), Some("10.0.0.0/24"));
        assert_eq!(normalize_subnet("10.12.0.5/32").as_deref(), Some("10.12.0.5/32"));
        assert_eq!(normalize_subnet("2001:db8::1/48").as_deref(), Some("2001:db8::/48"));
        assert_eq!(normalize_subnet("10.0.0.0"), None);
        assert_eq!(normalize_subnet("10.0.0.0/40"), None);
    }

    #[test]
    fn test_subnet_contains_v4() {
        assert!(subnet_contains("10.12.0.0/24", "10.12.0.17"));
        assert!(subnet_contains("10.12.0.9/24", "10.12.0.200"));
        assert!(subnet_contains("10.12.0.0/24", "10.12.0.255"));
        assert!(!subnet_contains("10.12.0.0/24", "10.12.1.1"));
        assert!(subnet_contains("0.0.0.0/0", "192.168.1.1"));
        assert!(subnet_contains("10.12.0.5/32", "10.12.0.5"));
        assert!(!subnet_contains("10.12.0.5/32", "10.12.0.6"));
    }

    #[test]
    fn test_subnet_contains_v6_and_mixed() {
        assert!(subnet_contains("2001:db8::/48", "2001:db8:0:1::5"));
        assert!(!subnet_contains("2001:db8::/48", "2001:db9::5"));
        assert!(!subnet_contains("10.0.0.0/8", "::1"));
        assert!(!subnet_contains("garbage", "10.0.0.1"));
    }

    #[test]
    fn test_validate_extension_number() {
        assert!(validate_extension_number("4321").is_ok());
        assert!(validate_extension_number("12").is_ok());
        assert!(validate_extension_number("1").is_err());
        assert!(validate_extension_number("12345678901").is_err());
        assert!(validate_extension_number("12a4").is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(42.5).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(-0.1).is_err());
        assert!(validate_percentage(100.1).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
        assert!(validate_percentage(f64::INFINITY).is_err());
    }
}
