use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tcptun_relay::RelayOutcome;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Summary of one finished tunnel session.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub role: &'static str,
    pub interface: String,
    pub mode: &'static str,
    pub peer: Option<String>,
    pub reason: &'static str,
    pub device_to_stream: u64,
    pub stream_to_device: u64,
    pub bytes_device_to_stream: u64,
    pub bytes_stream_to_device: u64,
}

impl SessionReport {
    pub fn new(
        role: &'static str,
        interface: impl Into<String>,
        mode: &'static str,
        peer: Option<String>,
        outcome: &RelayOutcome,
    ) -> Self {
        Self {
            role,
            interface: interface.into(),
            mode,
            peer,
            reason: outcome.reason.as_str(),
            device_to_stream: outcome.stats.device_to_stream,
            stream_to_device: outcome.stats.stream_to_device,
            bytes_device_to_stream: outcome.stats.bytes_device_to_stream,
            bytes_stream_to_device: outcome.stats.bytes_stream_to_device,
        }
    }
}

pub fn print_report(report: &SessionReport, format: OutputFormat) {
    println!("{}", render_report(report, format));
}

fn render_report(report: &SessionReport, format: OutputFormat) -> String {
    let peer = report.peer.as_deref().unwrap_or("-");
    match format {
        OutputFormat::Json => {
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "PACKETS", "BYTES"])
                .add_row(vec![
                    "device -> stream".to_string(),
                    report.device_to_stream.to_string(),
                    report.bytes_device_to_stream.to_string(),
                ])
                .add_row(vec![
                    "stream -> device".to_string(),
                    report.stream_to_device.to_string(),
                    report.bytes_stream_to_device.to_string(),
                ]);
            format!(
                "{} {} ({}) peer={} reason={}\n{table}",
                report.role, report.interface, report.mode, peer, report.reason
            )
        }
        OutputFormat::Pretty => format!(
            "role={} interface={} mode={} peer={} reason={} \
             device_to_stream={} ({} bytes) stream_to_device={} ({} bytes)",
            report.role,
            report.interface,
            report.mode,
            peer,
            report.reason,
            report.device_to_stream,
            report.bytes_device_to_stream,
            report.stream_to_device,
            report.bytes_stream_to_device,
        ),
        OutputFormat::Raw => format!(
            "{} {} {}",
            report.reason, report.device_to_stream, report.stream_to_device
        ),
    }
}
