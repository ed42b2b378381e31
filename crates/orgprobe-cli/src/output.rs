use std::io::{self, Write};

use orgprobe_core::{LookupOutcome, Payload};

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, EndpointInfo, LookupReport};
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    render_to(&mut writer, output, format, pretty)?;
    writer.flush()?;
    Ok(())
}

pub fn render_to<W: Write>(
    writer: &mut W,
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match (output, format) {
        (CommandOutput::Lookup(report), OutputFormat::Json) => write_json(writer, report, pretty),
        (CommandOutput::Endpoints(endpoints), OutputFormat::Json) => {
            write_json(writer, endpoints, pretty)
        }
        (CommandOutput::Lookup(report), OutputFormat::Ndjson) => {
            for outcome in &report.outcomes {
                writeln!(writer, "{}", serde_json::to_string(outcome)?)?;
            }
            Ok(())
        }
        (CommandOutput::Endpoints(endpoints), OutputFormat::Ndjson) => {
            for endpoint in endpoints {
                writeln!(writer, "{}", serde_json::to_string(endpoint)?)?;
            }
            Ok(())
        }
        (CommandOutput::Lookup(report), OutputFormat::Table) => lookup_table(writer, report),
        (CommandOutput::Endpoints(endpoints), OutputFormat::Table) => {
            endpoints_table(writer, endpoints)
        }
    }
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(writer, "{payload}")?;
    Ok(())
}

fn lookup_table<W: Write>(writer: &mut W, report: &LookupReport) -> Result<(), CliError> {
    let summary = &report.summary;
    writeln!(writer, "endpoint  : {}", report.endpoint)?;
    writeln!(writer, "latency_ms: {}", report.latency_ms)?;
    writeln!(
        writer,
        "summary   : total={} success={} empty={} failed={} unattributable={}",
        summary.total, summary.success, summary.empty, summary.failed, summary.unattributable
    )?;
    writeln!(writer)?;
    writeln!(writer, "{:<12} {:<8} DETAIL", "ORG_CODE", "STATUS")?;
    for outcome in &report.outcomes {
        writeln!(
            writer,
            "{:<12} {:<8} {}",
            outcome.org_code().unwrap_or("?"),
            outcome.status().as_str(),
            detail(outcome)
        )?;
    }
    Ok(())
}

fn endpoints_table<W: Write>(writer: &mut W, endpoints: &[EndpointInfo]) -> Result<(), CliError> {
    writeln!(writer, "{:<14} SESSION", "ENDPOINT")?;
    for endpoint in endpoints {
        let session = if endpoint.requires_session { "yes" } else { "no" };
        writeln!(writer, "{:<14} {session}", endpoint.id.as_str())?;
    }
    Ok(())
}

fn detail(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Success { payload, .. } => match payload {
            Payload::Certificates { certificates } => {
                format!("{} certificate(s)", certificates.len())
            }
            Payload::Licenses(summary) => format!("{} licensed module(s)", summary.module_count()),
            Payload::Company(record) => record
                .short_name
                .clone()
                .or_else(|| record.name.clone())
                .unwrap_or_else(|| String::from("-")),
        },
        LookupOutcome::Empty { .. } => String::from("-"),
        LookupOutcome::Failed { cause, .. } => cause.to_string(),
    }
}
