use std::net::IpAddr;

/// One shadow root server the replay may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    /// Server name, used only in report output.
    pub ns_name: String,
    pub addr: IpAddr,
}

impl ServerTarget {
    pub fn new(ns_name: impl Into<String>, addr: IpAddr) -> Self {
        Self {
            ns_name: ns_name.into(),
            addr,
        }
    }
}

/// Built-in shadow root-server list (the Yeti DNS project root hints),
/// used when no explicit server list is configured.
pub fn default_shadow_servers() -> Vec<ServerTarget> {
    const HINTS: &[(&str, &str)] = &[
        ("bii.dns-lab.net.", "240c:f:1:22::6"),
        ("yeti-ns.tisf.net.", "2001:4f8:3:1006::1:4"),
        ("yeti-ns.wide.ad.jp.", "2001:200:1d9::35"),
        ("yeti-ns.as59715.net.", "2a02:cdc5:9715:0:185:5:203:53"),
        ("dahu1.yeti.eu.org.", "2001:4b98:dc2:45:216:3eff:fe4b:8c5b"),
        ("ns-yeti.bondis.org.", "2a02:2810:0:405::250"),
        ("yeti-ns.ix.ru.", "2001:6d0:6d06::53"),
        ("yeti.bofh.priv.at.", "2a01:4f8:161:6106:1::10"),
        ("yeti.ipv6.ernet.in.", "2001:e30:1c1e:1::333"),
        ("yeti-dns01.dnsworkshop.org.", "2001:1608:10:167:32e::53"),
        ("yeti-ns.conit.co.", "2604:6600:2000:11::4854:a010"),
        ("dahu2.yeti.eu.org.", "2001:67c:217c:6::2"),
    ];

    HINTS
        .iter()
        .map(|(name, addr)| {
            let addr: IpAddr = addr.parse().expect("built-in hint address is a valid literal");
            ServerTarget::new(*name, addr)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shadow_servers_are_unique() {
        let servers = default_shadow_servers();
        assert!(servers.len() >= 2);

        let mut addrs: Vec<IpAddr> = servers.iter().map(|s| s.addr).collect();
        addrs.sort();
        addrs.dedup();
        assert_eq!(addrs.len(), servers.len(), "hint addresses must be unique");
    }

    #[test]
    fn test_default_shadow_server_names_are_fqdns() {
        for server in default_shadow_servers() {
            assert!(
                server.ns_name.ends_with('.'),
                "{} should be fully qualified",
                server.ns_name
            );
        }
    }
}
