use feargauge_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("request_id  : {}", envelope.meta.request_id));
    line(format!("schema      : {}", envelope.meta.schema_version));
    line(format!("generated_at: {}", envelope.meta.generated_at.format_rfc3339()));
    line(format!(
        "feeds       : {}",
        envelope
            .meta
            .feeds
            .iter()
            .map(|feed| feed.as_str())
            .collect::<Vec<_>>()
            .join(",")
    ));
    line(format!("latency_ms  : {}", envelope.meta.latency_ms));

    for summary in summary_lines(&envelope.data) {
        line(summary);
    }

    if !envelope.meta.warnings.is_empty() {
        line(String::from("warnings:"));
        for warning in &envelope.meta.warnings {
            line(format!("  - {warning}"));
        }
    }

    if !envelope.data.is_null() {
        line(String::from("data:"));
        for data_line in serde_json::to_string_pretty(&envelope.data)?.lines() {
            line(format!("  {data_line}"));
        }
    }

    if !envelope.errors.is_empty() {
        line(String::from("errors:"));
        for error in &envelope.errors {
            line(format!("  - {}: {}", error.code, error.message));
        }
    }

    Ok(out)
}

/// Headline summary for `report` and `insights` data; empty for anything else.
///
/// `report` nests readings under `snapshot` and insights under `insights`,
/// while `insights` returns both at the top level.
fn summary_lines(data: &Value) -> Vec<String> {
    let (readings, insights) = match (data.get("snapshot"), data.get("insights")) {
        (Some(snapshot), Some(insights)) => (snapshot, insights),
        _ if data.get("dominant_side").is_some() => (data, data),
        _ => return Vec::new(),
    };
    let reading = |side: &str| {
        format!(
            "{} ({})",
            readings[side]["value"],
            readings[side]["label"].as_str().unwrap_or("?")
        )
    };

    vec![
        format!("crypto      : {}", reading("crypto")),
        format!("stock       : {}", reading("stock")),
        format!("divergence  : {}", insights["divergence"]),
        format!("dominant    : {}", insights["dominant_side"].as_str().unwrap_or("?")),
        format!(
            "overall     : {} (average {})",
            insights["overall"].as_str().unwrap_or("?"),
            insights["average"]
        ),
    ]
}

#[cfg(test)]
mod tests {
    use feargauge_core::{EnvelopeError, EnvelopeMeta, FeedId};
    use serde_json::json;

    use super::*;

    fn meta() -> EnvelopeMeta {
        EnvelopeMeta::new("request-12345", "v1.0.0", FeedId::ALL.to_vec(), 12)
            .expect("valid meta")
    }

    #[test]
    fn table_summarizes_report_data() {
        let envelope = Envelope::new(
            meta(),
            json!({
                "snapshot": {
                    "crypto": { "value": 70, "label": "Greed" },
                    "stock": { "value": 40, "label": "Fear" }
                },
                "insights": {
                    "divergence": 30,
                    "dominant_side": "crypto",
                    "overall": "greedy",
                    "average": 55.0
                }
            }),
            Vec::new(),
        )
        .expect("valid");

        let table = render_table(&envelope).expect("renders");

        assert!(table.contains("crypto      : 70 (Greed)"));
        assert!(table.contains("divergence  : 30"));
        assert!(table.contains("overall     : greedy (average 55.0)"));
    }

    #[test]
    fn table_lists_errors_without_data() {
        let error = EnvelopeError::new("upstream.network_failure", "stock feed unavailable", true)
            .expect("valid error");
        let envelope = Envelope::new(meta(), Value::Null, vec![error]).expect("valid");

        let table = render_table(&envelope).expect("renders");

        assert!(!table.contains("data:"));
        assert!(table.contains("  - upstream.network_failure: stock feed unavailable"));
    }

    #[test]
    fn table_summarizes_flat_insights_data() {
        let envelope = Envelope::new(
            meta(),
            json!({
                "crypto": { "value": 72, "label": "Greed" },
                "stock": { "value": 44, "label": "Fear" },
                "divergence": 28,
                "dominant_side": "crypto",
                "dominant_side_text": "Crypto showing more optimism",
                "overall": "greedy",
                "overall_text": "Generally Greedy",
                "average": 58.0
            }),
            Vec::new(),
        )
        .expect("valid");

        let table = render_table(&envelope).expect("renders");

        assert!(table.contains("stock       : 44 (Fear)"));
        assert!(table.contains("dominant    : crypto"));
        assert!(table.contains("overall     : greedy (average 58.0)"));
    }

    #[test]
    fn table_has_no_summary_for_history_data() {
        assert!(summary_lines(&json!({ "stock": [] })).is_empty());
    }
}
