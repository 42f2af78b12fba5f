use std::sync::Arc;

use anyhow::Context;
use deal_assist::config::ExtractorConfig;
use deal_assist::llm::{LlmConfig, create_provider};
use deal_assist::pipeline::processor::DealPipeline;
use deal_assist::pipeline::types::InboundEmail;
use deal_assist::store::{DealRecord, DealSink, JsonFileSink};

/// One-shot runner: read normalized emails from a JSON file (an object or
/// an array of objects), run each through the pipeline, append the records
/// to the local store, and print the results to stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let input_path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: deal-assist <emails.json>");
        eprintln!("  JSON: {{\"from\", \"subject\", \"receivedAt\", \"body\", \"threadId\"}} or an array of those");
        std::process::exit(2);
    });

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let config = ExtractorConfig::from_env()?;
    let store_path = std::env::var("DEAL_ASSIST_STORE_PATH")
        .unwrap_or_else(|_| "./deals-local.json".to_string());

    eprintln!("📬 Deal Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Store: {}", store_path);

    let llm_config = LlmConfig {
        api_key: secrecy::SecretString::from(api_key),
        model: config.model.clone(),
        base_url: std::env::var("DEAL_ASSIST_BASE_URL").ok(),
    };
    let provider = create_provider(&llm_config);

    let pipeline = Arc::new(DealPipeline::new(provider, &config));
    let sink = JsonFileSink::new(&store_path);

    let raw = tokio::fs::read_to_string(&input_path)
        .await
        .with_context(|| format!("failed to read {input_path}"))?;
    let emails = parse_input(&raw).context("failed to parse input emails")?;

    eprintln!("   Emails: {}\n", emails.len());

    let mut failures = 0usize;
    for email in emails {
        match pipeline.process(&email).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                let record = DealRecord::new(email, result);
                sink.save(&record).await?;
            }
            Err(e) => {
                failures += 1;
                eprintln!("Failed to process \"{}\": {e}", email.subject);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} email(s) failed");
    }
    Ok(())
}

/// Accept a single email object or an array of them.
fn parse_input(raw: &str) -> Result<Vec<InboundEmail>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|email| vec![email])
    }
}
