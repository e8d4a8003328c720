mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tcptun",
    version,
    about = "Tunnel TUN/TAP traffic over a single TCP connection"
)]
struct Cli {
    /// Session report format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "TCPTUN_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Log every relayed packet (implies --log-level debug).
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level.with_debug(cli.debug));

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format, cli.debug);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_with_defaults() {
        let cli = Cli::try_parse_from(["tcptun", "server", "-i", "tun0"])
            .expect("server args should parse");

        let Command::Server(args) = cli.command else {
            panic!("expected server command");
        };
        assert_eq!(args.device.interface, "tun0");
        assert!(!args.device.tap);
        assert_eq!(args.device.mtu, None);
        assert_eq!(args.port, 55555);
        assert_eq!(args.bind.to_string(), "0.0.0.0");
        assert!(!cli.debug);
    }

    #[test]
    fn parses_client_with_port_tap_and_debug() {
        let cli = Cli::try_parse_from([
            "tcptun", "-d", "client", "-i", "tap3", "--tap", "10.0.0.1", "-p", "6000",
        ])
        .expect("client args should parse");

        let Command::Client(args) = cli.command else {
            panic!("expected client command");
        };
        assert_eq!(args.server, "10.0.0.1");
        assert_eq!(args.port, 6000);
        assert!(args.device.tap);
        assert!(cli.debug);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tcptun",
            "server",
            "-i",
            "tun0",
            "--format",
            "json",
            "--log-format",
            "json",
        ])
        .expect("global flags should parse after the subcommand");

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn client_requires_server_argument() {
        let err = Cli::try_parse_from(["tcptun", "client", "-i", "tun0"])
            .expect_err("missing server should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn mtu_must_fit_the_frame_limit() {
        let err = Cli::try_parse_from(["tcptun", "server", "-i", "tun0", "--mtu", "70000"])
            .expect_err("oversized mtu should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_version_extended() {
        let cli = Cli::try_parse_from(["tcptun", "version", "--extended"])
            .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(args) if args.extended));
    }
}
