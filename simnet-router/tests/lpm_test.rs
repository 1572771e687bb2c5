use ipnet::Ipv4Net;
use prefix_trie::PrefixMap;
use simnet_router::addr::{ip_to_binary, network_prefix_of};
use simnet_router::{DEFAULT_GATEWAY, ForwardingTable, Route, Router, RouterError};
use std::net::Ipv4Addr;

fn lab_table() -> ForwardingTable {
    ForwardingTable::build(vec![
        ("223.1.1.0/24", "Link 0"),
        ("223.1.2.0/24", "Link 1"),
        ("223.1.3.0/24", "Link 2"),
        ("223.1.0.0/16", "Link 4 (ISP)"),
    ])
    .expect("Failed to build table")
}

/// Nested and disjoint prefixes, no duplicates.
fn nested_routes() -> Vec<Route> {
    [
        ("0.0.0.0/0", "default-upstream"),
        ("10.0.0.0/8", "corp"),
        ("10.1.0.0/16", "corp-east"),
        ("10.1.2.0/24", "corp-east-lab"),
        ("10.1.2.128/25", "corp-east-lab-hi"),
        ("10.1.2.200/32", "printer"),
        ("172.16.0.0/12", "vpn"),
        ("192.168.0.0/16", "home"),
        ("192.168.1.0/24", "home-lan"),
        ("128.0.0.0/1", "upper-half"),
    ]
    .into_iter()
    .map(Route::from)
    .collect()
}

/// Deterministic address generator (xorshift32).
fn addresses(count: usize) -> Vec<Ipv4Addr> {
    let mut state: u32 = 0x9e37_79b9;
    let mut out: Vec<Ipv4Addr> = (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Ipv4Addr::from(state)
        })
        .collect();
    // Make sure every route is exercised, not just the wide ones.
    out.extend(
        [
            [10, 1, 2, 200],
            [10, 1, 2, 201],
            [10, 1, 2, 5],
            [10, 1, 9, 9],
            [10, 200, 0, 1],
            [172, 20, 1, 1],
            [192, 168, 1, 1],
            [192, 168, 7, 1],
            [200, 0, 0, 1],
            [1, 2, 3, 4],
        ]
        .map(Ipv4Addr::from),
    );
    out
}

#[test]
fn test_reference_scenario() {
    let _ = tracing_subscriber::fmt::try_init();
    let table = lab_table();

    assert_eq!(table.route("223.1.1.100").unwrap(), "Link 0");
    assert_eq!(table.route("223.1.2.5").unwrap(), "Link 1");
    assert_eq!(table.route("223.1.250.1").unwrap(), "Link 4 (ISP)");
    assert_eq!(table.route("198.51.100.1").unwrap(), DEFAULT_GATEWAY);
}

#[test]
fn test_sort_invariant() {
    let table = ForwardingTable::build(nested_routes()).unwrap();
    assert_eq!(table.len(), 10);
    assert!(
        table
            .entries()
            .windows(2)
            .all(|w| w[0].prefix_len() >= w[1].prefix_len())
    );
}

#[test]
fn test_empty_table_always_defaults() {
    let table = ForwardingTable::build(Vec::<Route>::new()).unwrap();
    for addr in addresses(64) {
        assert_eq!(table.route(&addr.to_string()).unwrap(), DEFAULT_GATEWAY);
    }
}

#[test]
fn test_matches_trie_lpm() {
    let routes = nested_routes();
    let table = ForwardingTable::build(routes.clone()).unwrap();

    let mut trie: PrefixMap<Ipv4Net, String> = PrefixMap::new();
    for route in &routes {
        let net: Ipv4Net = route.prefix.parse().unwrap();
        trie.insert(net.trunc(), route.link.clone());
    }

    for addr in addresses(2000) {
        let host = Ipv4Net::new(addr, 32).unwrap();
        let expected = trie
            .get_lpm(&host)
            .map(|(_, link)| link.as_str())
            .unwrap_or(DEFAULT_GATEWAY);
        assert_eq!(table.route(&addr.to_string()).unwrap(), expected, "{addr}");
    }
}

#[test]
fn test_matches_bit_string_semantics() {
    let routes = nested_routes();
    let table = ForwardingTable::build(routes.clone()).unwrap();

    // Longest route whose bit-string prefix starts the address bit-string.
    for addr in addresses(500) {
        let bits = ip_to_binary(&addr.to_string()).unwrap();
        let expected = routes
            .iter()
            .map(|r| (network_prefix_of(&r.prefix).unwrap(), r.link.as_str()))
            .filter(|(prefix, _)| bits.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, link)| link)
            .unwrap_or(DEFAULT_GATEWAY);
        assert_eq!(table.route(&addr.to_string()).unwrap(), expected, "{addr}");
    }
}

#[test]
fn test_without_default_route_falls_back() {
    let routes: Vec<Route> = nested_routes()
        .into_iter()
        .filter(|r| !r.prefix.ends_with("/0") && !r.prefix.ends_with("/1"))
        .collect();
    let table = ForwardingTable::build(routes).unwrap();

    assert_eq!(table.route("8.8.8.8").unwrap(), DEFAULT_GATEWAY);
    assert_eq!(table.route("10.1.2.200").unwrap(), "printer");
    assert_eq!(table.route("10.1.2.129").unwrap(), "corp-east-lab-hi");
}

#[test]
fn test_invalid_inputs() {
    assert!(matches!(
        ForwardingTable::build(vec![("223.1.1.0", "no length")]),
        Err(RouterError::InvalidPrefix(_))
    ));
    assert!(matches!(
        ForwardingTable::build(vec![("300.1.1.0/24", "bad octet")]),
        Err(RouterError::InvalidPrefix(_))
    ));

    let table = lab_table();
    assert!(matches!(
        table.route("223.1.1.100/32"),
        Err(RouterError::InvalidAddress(_))
    ));
    assert_eq!(table.route("223.1.3.1").unwrap(), "Link 2");
}

#[test]
fn test_concurrent_lookups() {
    let table = lab_table();
    let expected: Vec<(String, &str)> = addresses(256)
        .into_iter()
        .map(|a| (a.to_string(), table.route(&a.to_string()).unwrap()))
        .collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for (addr, link) in &expected {
                    assert_eq!(table.route(addr).unwrap(), *link);
                }
            });
        }
    });
}

#[test]
fn test_router_swap_under_readers() {
    let router = Router::new(vec![("10.0.0.0/8", "old")]).unwrap();

    std::thread::scope(|s| {
        let reader = s.spawn(|| {
            for _ in 0..1000 {
                let link = router.route("10.1.1.1").unwrap();
                assert!(link == "old" || link == "new", "unexpected link {link}");
            }
        });

        router.replace(vec![("10.0.0.0/8", "new")]).unwrap();
        reader.join().unwrap();
    });

    assert_eq!(router.route("10.1.1.1").unwrap(), "new");
}
