use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn get_private_ipv4(&self) -> Option<Ipv4Addr>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn get_private_ipv4(&self) -> Option<Ipv4Addr> {
        self.get_ipv4_nets()
            .into_iter()
            .map(|net| net.ip())
            .find(|ip| ip.is_private())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(ips: Vec<IpNetwork>) -> NetworkInterface {
        NetworkInterface {
            name: "eth0".into(),
            description: String::new(),
            index: 2,
            mac: None,
            ips,
            flags: 0,
        }
    }

    #[test]
    fn private_ipv4_skips_public_and_v6() {
        let intf = iface(vec![
            IpNetwork::V6("fe80::1".parse().unwrap()),
            IpNetwork::V4("203.0.113.9/24".parse().unwrap()),
            IpNetwork::V4("192.168.1.42/24".parse().unwrap()),
        ]);
        assert_eq!(intf.get_private_ipv4(), Some(Ipv4Addr::new(192, 168, 1, 42)));
        assert_eq!(intf.get_ipv4_nets().len(), 2);
    }

    #[test]
    fn private_ipv4_none_without_private_address() {
        let intf = iface(vec![IpNetwork::V4("8.8.8.8/32".parse().unwrap())]);
        assert_eq!(intf.get_private_ipv4(), None);
    }
}
