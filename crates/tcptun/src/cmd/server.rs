use std::net::SocketAddr;

use tcptun_transport::Role;

use crate::cmd::tunnel::{self, TunnelPlan};
use crate::cmd::ServerArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

pub fn run(args: ServerArgs, format: OutputFormat, debug_packets: bool) -> CliResult<i32> {
    tunnel::run(plan(args), format, debug_packets)
}

fn plan(args: ServerArgs) -> TunnelPlan {
    TunnelPlan {
        role: Role::Listener,
        addr: SocketAddr::new(args.bind, args.port),
        device: args.device,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::cmd::DeviceArgs;

    #[test]
    fn listener_binds_requested_address_and_port() {
        let plan = plan(ServerArgs {
            device: DeviceArgs {
                interface: "tun0".to_string(),
                tap: false,
                mtu: None,
            },
            port: 6000,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
        });

        assert_eq!(plan.role, Role::Listener);
        assert_eq!(plan.addr, "127.0.0.1:6000".parse().unwrap());
    }
}
