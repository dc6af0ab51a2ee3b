//! Card command - replay recognized text frames through a card scan.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use cardscan_core::{CardResult, OneshotSink, ScanResult, SessionController};

/// Arguments for the card command.
#[derive(Args)]
pub struct CardArgs {
    /// Recognized lines, one per text line, frames separated by blank lines ("-" for stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Number of frames processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Anchor the expiry date window at this year
    #[arg(long)]
    reference_year: Option<i32>,

    /// Wait for the holder name before completing
    #[arg(long)]
    require_name: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: CardArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(year) = args.reference_year {
        config.classifier.reference_year = Some(year);
    }
    if args.require_name {
        config.session.require_holder_name = true;
    }

    let input = super::read_input(&args.input)?;
    let frames = split_frames(&input);
    if frames.is_empty() {
        anyhow::bail!("No frames found in {}", args.input.display());
    }

    info!("Replaying {} frames", frames.len());

    let (sink, result_rx) = OneshotSink::new();
    let controller = Arc::new(SessionController::card(&config, sink));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, frame) in frames.into_iter().enumerate() {
        // Stop feeding once the scan is over; frames in flight are dropped
        if !controller.is_active() {
            debug!("Scan finished, skipping remaining frames from {}", index);
            break;
        }

        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let controller = Arc::clone(&controller);
        tasks.spawn(async move {
            let _permit = permit;
            if controller.ingest_lines(&frame) {
                debug!("Frame {} completed the scan", index);
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined?;
    }

    let partial = controller.snapshot().unwrap_or_default();
    drop(controller);

    let card = match result_rx.await {
        Ok(ScanResult::Card(card)) => card,
        Ok(other) => anyhow::bail!("Unexpected {} result from card scan", other.mode()),
        Err(_) => anyhow::bail!(
            "Card scan incomplete: captured {} of 3 fields ({})",
            partial.filled(),
            describe_missing(&partial, config.session.require_holder_name)
        ),
    };

    let output = format_card(&card, args.format)?;
    super::write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Split input into frames of lines, separated by blank lines.
fn split_frames(input: &str) -> Vec<Vec<String>> {
    let mut frames = Vec::new();
    let mut current = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                frames.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() {
        frames.push(current);
    }

    frames
}

fn describe_missing(card: &CardResult, require_name: bool) -> String {
    let mut missing = Vec::new();
    if card.number.is_none() {
        missing.push("number");
    }
    if card.expiry.is_none() {
        missing.push("expiry");
    }
    if require_name && card.holder_name.is_none() {
        missing.push("holder name");
    }
    format!("missing {}", missing.join(", "))
}

fn format_card(card: &CardResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            Ok(serde_json::to_string_pretty(&ScanResult::Card(card.clone()))?)
        }
        OutputFormat::Csv => format_csv(card),
        OutputFormat::Text => Ok(format_text(card)),
    }
}

fn format_csv(card: &CardResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["number", "expiry", "holder_name"])?;
    wtr.write_record([
        card.number_display().unwrap_or_default(),
        card.expiry_display().unwrap_or_default(),
        card.holder_name_display().unwrap_or_default(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(card: &CardResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Number: {}\n", card.number_display().unwrap_or("-")));
    output.push_str(&format!("Expiry: {}\n", card.expiry_display().unwrap_or("-")));
    output.push_str(&format!("Name:   {}\n", card.holder_name_display().unwrap_or("-")));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::{ClassifiedField, FieldKind};

    #[test]
    fn test_split_frames() {
        let input = "4111 1111 1111 1111\nVISA\n\n\n12/26\n   \nJOHN SMITH\n";
        let frames = split_frames(input);

        assert_eq!(
            frames,
            vec![
                vec!["4111 1111 1111 1111".to_string(), "VISA".to_string()],
                vec!["12/26".to_string()],
                vec!["JOHN SMITH".to_string()],
            ]
        );
    }

    #[test]
    fn test_split_frames_empty() {
        assert!(split_frames("\n \n").is_empty());
    }

    #[test]
    fn test_describe_missing() {
        let card = CardResult {
            number: Some(ClassifiedField::new(FieldKind::Number, "4111111111111111", "4111 1111 1111 1111")),
            ..CardResult::default()
        };

        assert_eq!(describe_missing(&card, false), "missing expiry");
        assert_eq!(describe_missing(&card, true), "missing expiry, holder name");
    }

    #[test]
    fn test_format_csv() {
        let card = CardResult {
            expiry: Some(ClassifiedField::new(FieldKind::ExpiryDate, "12/26", "12/26")),
            ..CardResult::default()
        };

        assert_eq!(format_csv(&card).unwrap(), "number,expiry,holder_name\n,12/26,\n");
    }
}
