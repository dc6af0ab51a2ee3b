//! Classify command - show how individual lines are classified.

use std::path::Path;

use clap::Args;
use serde::Serialize;

use cardscan_core::{ClassifiedField, LineClassifier};

use super::card::OutputFormat;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Lines to classify (read from stdin when omitted)
    lines: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Anchor the expiry date window at this year
    #[arg(long)]
    reference_year: Option<i32>,
}

#[derive(Serialize)]
struct Classification<'a> {
    line: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<ClassifiedField>,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(year) = args.reference_year {
        config.classifier.reference_year = Some(year);
    }
    let classifier = LineClassifier::from_config(&config.classifier);

    let stdin;
    let lines: Vec<&str> = if args.lines.is_empty() {
        stdin = super::read_input(Path::new("-"))?;
        stdin.lines().collect()
    } else {
        args.lines.iter().map(String::as_str).collect()
    };

    let results: Vec<Classification<'_>> = lines
        .into_iter()
        .map(|line| Classification {
            line,
            field: classifier.classify(line),
        })
        .collect();

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&results)?,
        OutputFormat::Csv => format_csv(&results)?,
        OutputFormat::Text => format_text(&results),
    };

    println!("{}", output);

    Ok(())
}

fn format_csv(results: &[Classification<'_>]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["line", "kind", "display_value"])?;
    for result in results {
        match &result.field {
            Some(field) => wtr.write_record([result.line, field.kind.as_str(), field.display_value.as_str()])?,
            None => wtr.write_record([result.line, "", ""])?,
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(results: &[Classification<'_>]) -> String {
    results
        .iter()
        .map(|r| match &r.field {
            Some(field) => format!("{:<12} {} -> {}", field.kind, r.line, field.display_value),
            None => format!("{:<12} {}", "-", r.line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::FieldKind;

    #[test]
    fn test_format_text() {
        let results = vec![
            Classification {
                line: "4111111111111111",
                field: Some(ClassifiedField::new(
                    FieldKind::Number,
                    "4111111111111111",
                    "4111 1111 1111 1111",
                )),
            },
            Classification {
                line: "garbage!!",
                field: None,
            },
        ];

        assert_eq!(
            format_text(&results),
            "number       4111111111111111 -> 4111 1111 1111 1111\n-            garbage!!"
        );
    }

    #[test]
    fn test_csv_and_json_use_same_kind_label() {
        let results = vec![Classification {
            line: "12/26",
            field: Some(ClassifiedField::new(FieldKind::ExpiryDate, "12/26", "12/26")),
        }];

        let csv = format_csv(&results).unwrap();
        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json[0]["field"]["kind"], "expiry_date");
        assert_eq!(csv, "line,kind,display_value\n12/26,expiry_date,12/26\n");
    }
}
