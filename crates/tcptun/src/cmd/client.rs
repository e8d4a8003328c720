use tcptun_transport::{resolve, Role};

use crate::cmd::tunnel::{self, TunnelPlan};
use crate::cmd::ClientArgs;
use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ClientArgs, format: OutputFormat, debug_packets: bool) -> CliResult<i32> {
    let addr =
        resolve(&args.server, args.port).map_err(|err| transport_error("resolve failed", err))?;

    let plan = TunnelPlan {
        role: Role::Connector,
        addr,
        device: args.device,
    };
    tunnel::run(plan, format, debug_packets)
}
