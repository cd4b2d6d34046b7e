//! Advisory scope checking
//!
//! Classifies URLs against authorized domain patterns, IP ranges, and
//! excluded paths. Every verdict is advisory: the human may hold
//! authorization the checker cannot see, and nothing here blocks
//! navigation or testing.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;
use uuid::Uuid;

use vigil_boundary::{AdvisoryStamp, BoundaryGuard, ComponentManifest};

use crate::error::Result;

/// Advisory scope verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStatus {
    InScope,
    OutOfScope,
    Excluded,
    Ambiguous,
    Unknown,
}

/// One advisory scope warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeWarning {
    pub warning_id: Uuid,
    pub url: String,
    pub status: ScopeStatus,
    pub message: String,
    pub authorization_reference: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Always true.
    pub does_not_block: bool,
    pub stamp: AdvisoryStamp,
}

/// Read-only scope classifier.
pub struct ScopeChecker {
    authorized_domains: BTreeSet<String>,
    authorized_ranges: Vec<String>,
    excluded_paths: Vec<String>,
}

impl ScopeChecker {
    /// Construct the checker, presenting its manifest to the guard.
    pub fn new(
        guard: &BoundaryGuard,
        authorized_domains: Vec<String>,
        authorized_ranges: Vec<String>,
        excluded_paths: Vec<String>,
    ) -> Result<Self> {
        let manifest = ComponentManifest::new("scope_checker")
            .with_method("check_scope")
            .with_method("scope_summary");
        guard.admit(&manifest)?;
        Ok(ScopeChecker {
            authorized_domains: authorized_domains.into_iter().collect(),
            authorized_ranges,
            excluded_paths,
        })
    }

    /// Classify a URL. Advisory in every branch.
    pub fn check_scope(&self, url: &str, authorization_reference: Option<&str>) -> ScopeWarning {
        let (host, ip, path) = parse_url(url);

        let (status, message) = if self.is_excluded(&path, host.as_deref()) {
            (
                ScopeStatus::Excluded,
                "URL falls under an excluded path. Human verification required before proceeding."
                    .to_string(),
            )
        } else if host
            .as_deref()
            .map(|h| self.is_authorized_domain(h))
            .unwrap_or(false)
            || ip.map(|ip| self.is_authorized_ip(ip)).unwrap_or(false)
        {
            (
                ScopeStatus::InScope,
                "URL appears to be within the authorized scope. Human verification still \
                 recommended."
                    .to_string(),
            )
        } else if host
            .as_deref()
            .map(|h| self.is_ambiguous(h))
            .unwrap_or(false)
        {
            (
                ScopeStatus::Ambiguous,
                "Scope status is ambiguous for this URL. Human verification required."
                    .to_string(),
            )
        } else if self.authorized_domains.is_empty() && self.authorized_ranges.is_empty() {
            (
                ScopeStatus::Unknown,
                "No scope information configured. The human must verify authorization before \
                 testing."
                    .to_string(),
            )
        } else {
            (
                ScopeStatus::OutOfScope,
                "URL does not appear to be within the configured scope. The human may hold \
                 additional authorization."
                    .to_string(),
            )
        };

        ScopeWarning {
            warning_id: Uuid::new_v4(),
            url: url.to_string(),
            status,
            message,
            authorization_reference: authorization_reference.map(|s| s.to_string()),
            timestamp: Utc::now(),
            does_not_block: true,
            stamp: AdvisoryStamp::new(),
        }
    }

    /// One-line summary of the configured scope.
    pub fn scope_summary(&self) -> String {
        format!(
            "domains: {}; ranges: {}; excluded paths: {}",
            self.authorized_domains.len(),
            self.authorized_ranges.len(),
            self.excluded_paths.len()
        )
    }

    fn is_excluded(&self, path: &str, host: Option<&str>) -> bool {
        self.excluded_paths.iter().any(|pattern| {
            glob_match(pattern, path) || host.map(|h| glob_match(pattern, h)).unwrap_or(false)
        })
    }

    fn is_authorized_domain(&self, domain: &str) -> bool {
        self.authorized_domains.iter().any(|authorized| {
            if domain == authorized {
                return true;
            }
            if let Some(base) = authorized.strip_prefix("*.") {
                return domain == base || domain.ends_with(&format!(".{base}"));
            }
            domain.ends_with(&format!(".{authorized}"))
        })
    }

    fn is_authorized_ip(&self, ip: IpAddr) -> bool {
        self.authorized_ranges
            .iter()
            .any(|range| cidr_contains(range, ip))
    }

    fn is_ambiguous(&self, domain: &str) -> bool {
        self.authorized_domains.iter().any(|authorized| {
            let authorized = authorized.trim_start_matches("*.");
            authorized != domain && (authorized.contains(domain) || domain.contains(authorized))
        })
    }
}

fn parse_url(url: &str) -> (Option<String>, Option<IpAddr>, String) {
    let (authority, path) = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => (&rest[..slash], rest[slash..].to_string()),
                None => (rest, String::new()),
            }
        }
        None => match url.find('/') {
            Some(slash) => (&url[..slash], url[slash..].to_string()),
            None => (url, String::new()),
        },
    };
    let host = authority
        .rsplit('@')
        .next()
        .unwrap_or(authority)
        .split(':')
        .next()
        .unwrap_or("")
        .to_string();
    if host.is_empty() {
        return (None, None, path);
    }
    match host.parse::<IpAddr>() {
        Ok(ip) => (None, Some(ip), path),
        Err(_) => (Some(host), None, path),
    }
}

/// Shell-style glob match supporting `*` and `?`.
fn glob_match(pattern: &str, value: &str) -> bool {
    let mut escaped = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => escaped.push_str(".*"),
            '?' => escaped.push('.'),
            other => escaped.push_str(&regex::escape(&other.to_string())),
        }
    }
    escaped.push('$');
    Regex::new(&escaped)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Whether `ip` falls inside `range` (CIDR notation or a bare address).
fn cidr_contains(range: &str, ip: IpAddr) -> bool {
    let Some((network, prefix)) = range.split_once('/') else {
        return range.parse::<IpAddr>().map(|r| r == ip).unwrap_or(false);
    };
    let Ok(prefix) = prefix.parse::<u32>() else {
        return false;
    };
    match (network.parse::<IpAddr>(), ip) {
        (Ok(IpAddr::V4(network)), IpAddr::V4(ip)) => {
            if prefix > 32 {
                return false;
            }
            let mask = if prefix == 0 {
                0
            } else {
                u32::MAX << (32 - prefix)
            };
            (u32::from(network) & mask) == (u32::from(ip) & mask)
        }
        (Ok(IpAddr::V6(network)), IpAddr::V6(ip)) => {
            if prefix > 128 {
                return false;
            }
            let mask = if prefix == 0 {
                0
            } else {
                u128::MAX << (128 - prefix)
            };
            (u128::from(network) & mask) == (u128::from(ip) & mask)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ScopeChecker {
        ScopeChecker::new(
            &BoundaryGuard::default(),
            vec!["*.example.com".to_string(), "example.org".to_string()],
            vec!["10.0.0.0/8".to_string()],
            vec!["/admin/*".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_wildcard_domain_in_scope() {
        let checker = checker();
        let warning = checker.check_scope("https://app.example.com/profile", None);
        assert_eq!(warning.status, ScopeStatus::InScope);
        assert!(warning.does_not_block);
        assert!(warning.stamp.is_intact());
    }

    #[test]
    fn test_base_domain_matches_wildcard() {
        let checker = checker();
        let warning = checker.check_scope("https://example.com/", None);
        assert_eq!(warning.status, ScopeStatus::InScope);
    }

    #[test]
    fn test_authorized_ip_range() {
        let checker = checker();
        let warning = checker.check_scope("http://10.2.3.4/status", None);
        assert_eq!(warning.status, ScopeStatus::InScope);
        let warning = checker.check_scope("http://192.168.1.1/status", None);
        assert_eq!(warning.status, ScopeStatus::OutOfScope);
    }

    #[test]
    fn test_excluded_path_wins() {
        let checker = checker();
        let warning = checker.check_scope("https://app.example.com/admin/users", None);
        assert_eq!(warning.status, ScopeStatus::Excluded);
    }

    #[test]
    fn test_unrelated_domain_out_of_scope() {
        let checker = checker();
        let warning = checker.check_scope("https://other.net/page", None);
        assert_eq!(warning.status, ScopeStatus::OutOfScope);
    }

    #[test]
    fn test_similar_domain_is_ambiguous() {
        let checker = checker();
        let warning = checker.check_scope("https://example.org.attacker.net/", None);
        // `example.org` is contained in the host, but the host is not a
        // subdomain of it.
        assert_eq!(warning.status, ScopeStatus::Ambiguous);
    }

    #[test]
    fn test_no_configuration_is_unknown() {
        let empty =
            ScopeChecker::new(&BoundaryGuard::default(), Vec::new(), Vec::new(), Vec::new())
                .unwrap();
        let warning = empty.check_scope("https://anything.net/", None);
        assert_eq!(warning.status, ScopeStatus::Unknown);
    }

    #[test]
    fn test_every_verdict_is_advisory() {
        let checker = checker();
        for url in [
            "https://app.example.com/",
            "https://other.net/",
            "https://app.example.com/admin/x",
        ] {
            let warning = checker.check_scope(url, Some("program-policy-v2"));
            assert!(warning.does_not_block);
            assert!(warning.stamp.human_confirmation_required);
            assert_eq!(
                warning.authorization_reference.as_deref(),
                Some("program-policy-v2")
            );
        }
    }

    #[test]
    fn test_cidr_edges() {
        assert!(cidr_contains("10.0.0.0/8", "10.255.255.255".parse().unwrap()));
        assert!(!cidr_contains("10.0.0.0/8", "11.0.0.0".parse().unwrap()));
        assert!(cidr_contains("0.0.0.0/0", "8.8.8.8".parse().unwrap()));
        assert!(cidr_contains("192.168.1.7", "192.168.1.7".parse().unwrap()));
        assert!(!cidr_contains("bad-range/8", "10.0.0.1".parse().unwrap()));
    }
}
