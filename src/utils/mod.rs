use std::net::IpAddr;

/// Lowercase, alphanumerics kept, runs of anything else collapsed to a single hyphen
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Use the supplied slug when non-blank, otherwise derive one from the name
pub fn slug_or_default(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(name),
    }
}

/// Validate a slug: non-empty, lowercase alphanumerics, hyphens and underscores
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Parse "addr" or "addr/len" and return the address family (4 or 6).
/// A missing prefix length is accepted as a host address.
pub fn ip_family(address: &str) -> Result<i32, String> {
    let address = address.trim();
    let (addr, prefix_len) = match address.split_once('/') {
        Some((a, len)) => (a, Some(len)),
        None => (address, None),
    };

    let ip: IpAddr = addr
        .parse()
        .map_err(|_| format!("Invalid IP address: {}", address))?;
    let (family, max_len) = match ip {
        IpAddr::V4(_) => (4, 32),
        IpAddr::V6(_) => (6, 128),
    };

    if let Some(len) = prefix_len {
        let len: u8 = len
            .parse()
            .map_err(|_| format!("Invalid prefix length in {}", address))?;
        if len > max_len {
            return Err(format!("Prefix length {} out of range for {}", len, address));
        }
    }
    Ok(family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Cisco Systems"), "cisco-systems");
        assert_eq!(slugify("  Juniper  Networks, Inc. "), "juniper-networks-inc");
        assert_eq!(slugify("core_switch"), "core_switch");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_or_default() {
        assert_eq!(slug_or_default(Some("custom"), "Cisco"), "custom");
        assert_eq!(slug_or_default(Some("   "), "Cisco"), "cisco");
        assert_eq!(slug_or_default(None, "Arista Networks"), "arista-networks");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("network-mgmt"));
        assert!(is_valid_slug("skip_discovery"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Network Mgmt"));
    }

    #[test]
    fn test_ip_family() {
        assert_eq!(ip_family("10.0.0.1/24"), Ok(4));
        assert_eq!(ip_family("10.0.0.1"), Ok(4));
        assert_eq!(ip_family("2001:db8::1/64"), Ok(6));
        assert_eq!(ip_family(" 192.0.2.1/32 "), Ok(4));
    }

    #[test]
    fn test_ip_family_rejects_bad_input() {
        assert!(ip_family("10.0.0.256/24").is_err());
        assert!(ip_family("10.0.0.1/33").is_err());
        assert!(ip_family("2001:db8::1/129").is_err());
        assert!(ip_family("not-an-ip").is_err());
        assert!(ip_family("10.0.0.1/abc").is_err());
    }
}
