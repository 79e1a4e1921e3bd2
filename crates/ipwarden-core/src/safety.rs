//! Safety net: address ranges that may never be the target of a BLOCK rule.
//!
//! The guard is built once at start-up and is read-only afterwards. There is
//! no method that adds or removes a range on a live guard; operators extend
//! the set through configuration, which only takes effect on restart.

use std::net::IpAddr;

use ipnet::IpNet;

/// Ranges protected in every deployment: loopback and private networks.
pub const BUILTIN_RANGES: [&str; 6] = [
    "127.0.0.0/8",
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "::1/128",
    "fc00::/7",
];

/// Immutable set of protected ranges.
#[derive(Debug, Clone)]
pub struct SafetyGuard {
    ranges: Vec<IpNet>,
}

impl SafetyGuard {
    /// Guard holding only the built-in ranges.
    pub fn new() -> Self {
        Self::with_extra_ranges(Vec::new())
    }

    /// Built-in ranges plus operator-supplied ones (e.g. payment gateway egress).
    /// Built-ins cannot be dropped this way.
    pub fn with_extra_ranges(extra: impl IntoIterator<Item = IpNet>) -> Self {
        let mut ranges: Vec<IpNet> = BUILTIN_RANGES
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        for net in extra {
            let net = net.trunc();
            if !ranges.contains(&net) {
                ranges.push(net);
            }
        }
        Self { ranges }
    }

    pub fn is_protected(&self, addr: IpAddr) -> bool {
        self.covering_range(addr).is_some()
    }

    /// First protected range containing `addr`.
    ///
    /// IPv4-mapped IPv6 addresses are checked in their IPv4 form so that
    /// `::ffff:10.0.0.5` cannot slip past `10.0.0.0/8`.
    pub fn covering_range(&self, addr: IpAddr) -> Option<IpNet> {
        let addr = addr.to_canonical();
        self.ranges.iter().find(|net| net.contains(&addr)).copied()
    }

    pub fn ranges(&self) -> &[IpNet] {
        &self.ranges
    }
}

impl Default for SafetyGuard {
    fn default() -> Self {
        Self::new()
    }
}
