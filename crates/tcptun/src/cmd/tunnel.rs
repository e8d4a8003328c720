use std::net::SocketAddr;

use tcptun_transport::Role;

use crate::cmd::DeviceArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

/// Everything a server or client run needs once its arguments are resolved.
#[derive(Debug)]
pub struct TunnelPlan {
    pub role: Role,
    /// Bind address for the listener, peer address for the connector.
    pub addr: SocketAddr,
    pub device: DeviceArgs,
}

#[cfg(target_os = "linux")]
pub fn run(plan: TunnelPlan, format: OutputFormat, debug_packets: bool) -> CliResult<i32> {
    use tcptun_relay::{RelayConfig, RelaySession, ShutdownSignal};
    use tcptun_transport::{establish, DeviceMode, TunDevice};
    use tracing::info;

    use crate::exit::{relay_error, transport_error, SUCCESS};
    use crate::output::{print_report, SessionReport};

    let mode = if plan.device.tap {
        DeviceMode::Tap
    } else {
        DeviceMode::Tun
    };

    let device = TunDevice::open(&plan.device.interface, mode)
        .map_err(|err| transport_error("device setup failed", err))?;
    if let Some(mtu) = plan.device.mtu {
        device
            .set_mtu(mtu)
            .map_err(|err| transport_error("device setup failed", err))?;
    }
    let interface = device.name().to_string();

    info!(role = %plan.role, addr = %plan.addr, "establishing tunnel stream");
    let stream = establish(plan.role, plan.addr).map_err(|err| match plan.role {
        Role::Listener => transport_error("listen failed", err),
        Role::Connector => transport_error("connect failed", err),
    })?;
    let peer = stream.peer_addr().map(|addr| addr.to_string());

    // Ctrl-C keeps its default behavior until the stream is up.
    let shutdown =
        ShutdownSignal::new().map_err(|err| relay_error("relay setup failed", err))?;
    install_ctrlc_handler(shutdown.clone())?;

    let config = RelayConfig::default().with_debug_packets(debug_packets);
    let session = RelaySession::with_shutdown(device, stream, config, shutdown)
        .map_err(|err| relay_error("relay setup failed", err))?;
    let outcome = session
        .run()
        .map_err(|err| relay_error("relay failed", err))?;

    let report = SessionReport::new(
        plan.role.as_str(),
        interface,
        mode.as_str(),
        peer,
        &outcome,
    );
    print_report(&report, format);

    Ok(SUCCESS)
}

#[cfg(not(target_os = "linux"))]
pub fn run(_plan: TunnelPlan, _format: OutputFormat, _debug_packets: bool) -> CliResult<i32> {
    Err(crate::exit::CliError::new(
        crate::exit::FAILURE,
        "TUN/TAP devices are only supported on Linux",
    ))
}

#[cfg(target_os = "linux")]
fn install_ctrlc_handler(shutdown: tcptun_relay::ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.trigger();
    })
    .map_err(|err| {
        crate::exit::CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
