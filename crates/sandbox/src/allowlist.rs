// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Network allowlist. When enabled, restricts a sandbox container's
//! outbound traffic to a fixed set of hosts plus the essentials (loopback,
//! DNS, established connections, the host itself).

/// Builds the `iptables` setup script applied once at container start.
///
/// `allowed_hosts` are resolved by `iptables` itself via `-d <host>`, which
/// accepts hostnames directly; re-resolution on DNS change is out of scope
/// here, matching a container that is started fresh per profile.
pub fn iptables_script(allowed_hosts: &[String]) -> String {
    let mut lines = vec![
        "set -e".to_string(),
        "iptables -F OUTPUT".to_string(),
        "iptables -P OUTPUT DROP".to_string(),
        "iptables -A OUTPUT -m state --state ESTABLISHED,RELATED -j ACCEPT".to_string(),
        "iptables -A OUTPUT -o lo -j ACCEPT".to_string(),
        "iptables -A OUTPUT -p udp --dport 53 -j ACCEPT".to_string(),
        "iptables -A OUTPUT -d host.docker.internal -j ACCEPT".to_string(),
    ];
    for host in allowed_hosts {
        lines.push(format!("iptables -A OUTPUT -d {host} -j ACCEPT"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_allows_loopback_and_configured_hosts() {
        let script = iptables_script(&["api.anthropic.com".to_string()]);
        assert!(script.contains("-o lo -j ACCEPT"));
        assert!(script.contains("-d api.anthropic.com -j ACCEPT"));
        assert!(script.contains("-P OUTPUT DROP"));
    }

    #[test]
    fn script_with_no_hosts_still_allows_the_essentials() {
        let script = iptables_script(&[]);
        assert!(script.contains("--dport 53"));
        assert!(script.contains("host.docker.internal"));
    }
}
