//! Code command - replay decoded payloads through a code scan.

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use cardscan_core::{ChannelSink, CodeResult, ScanEvent, ScanResult, SessionController};

use super::card::OutputFormat;

/// Arguments for the code command.
#[derive(Args)]
pub struct CodeArgs {
    /// Decoded payloads, one per frame ("-" for stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reject payloads not starting with this prefix and scan again
    #[arg(long)]
    expect_prefix: Option<String>,
}

/// Run a code scan. Code sessions have no settings, so no config file is read.
pub async fn run(args: CodeArgs) -> anyhow::Result<()> {
    let input = super::read_input(&args.input)?;

    let (sink, mut events) = ChannelSink::new();
    let controller = SessionController::code(sink);

    let mut accepted: Option<CodeResult> = None;
    let mut rejected = 0usize;

    'frames: for payload in input.lines() {
        if !controller.ingest_code(payload) {
            continue;
        }

        while let Ok(event) = events.try_recv() {
            let ScanEvent::Completed(ScanResult::Code(code)) = event else {
                continue;
            };

            match &args.expect_prefix {
                Some(prefix) if !code.payload.starts_with(prefix.as_str()) => {
                    warn!("Rejected payload {:?}", code.payload);
                    rejected += 1;
                    controller.reject();
                    controller.notify_retry();
                }
                _ => {
                    accepted = Some(code);
                    break 'frames;
                }
            }
        }
    }

    let Some(code) = accepted else {
        anyhow::bail!("No valid code found ({} rejected)", rejected);
    };

    info!("Accepted code after {} rejections", rejected);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&ScanResult::Code(code))?,
        OutputFormat::Csv => format_csv(&code)?,
        OutputFormat::Text => format!("Payload: {}", code.payload),
    };
    super::write_output(&output, args.output.as_deref())?;

    Ok(())
}

fn format_csv(code: &CodeResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["payload"])?;
    wtr.write_record([code.payload.as_str()])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_csv_quotes_commas() {
        let code = CodeResult {
            payload: "a,b".to_string(),
        };
        assert_eq!(format_csv(&code).unwrap(), "payload\n\"a,b\"\n");
    }
}
