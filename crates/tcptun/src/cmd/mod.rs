use std::net::{IpAddr, Ipv4Addr};

use clap::{Args, Subcommand};
use tcptun_transport::DEFAULT_PORT;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod client;
pub mod doctor;
pub mod server;
pub mod tunnel;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wait for one peer on a TCP port and relay device traffic to it.
    Server(ServerArgs),
    /// Connect to a server and relay device traffic to it.
    Client(ClientArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat, debug_packets: bool) -> CliResult<i32> {
    match command {
        Command::Server(args) => server::run(args, format, debug_packets),
        Command::Client(args) => client::run(args, format, debug_packets),
        Command::Version(args) => version::run(args),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Interface to attach to (created if it does not exist).
    #[arg(long, short = 'i', value_name = "IFACE", env = "TCPTUN_INTERFACE")]
    pub interface: String,
    /// Use a TAP (Ethernet frame) device instead of TUN (IP packet).
    #[arg(long)]
    pub tap: bool,
    /// Set the interface MTU before relaying.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=65535))]
    pub mtu: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// TCP port to listen on.
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT, env = "TCPTUN_PORT")]
    pub port: u16,
    /// Local address to bind.
    #[arg(long, value_name = "ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Server host name or IP address.
    pub server: String,
    /// TCP port to connect to.
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT, env = "TCPTUN_PORT")]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}
