//! HLS caption inspector
//!
//! Reads WebVTT segments from files or URLs, resolves their X-TIMESTAMP-MAP
//! offset and prints the cues moved onto the presentation timeline.
//!
//! Usage: `hls-captions [config.toml] [--json] <file-or-url>...`

use chrono::TimeDelta;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use hls_captions::config_file::ConfigFile;
use hls_captions::subtitle::timecode::format_timecode;
use hls_captions::subtitle::{Caption, CaptionTrack};
use hls_captions::{timestamp_offset, HttpFetcher, PluginConfig, Result, SegmentFetcher};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-captions";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // Load configuration
    let config = match args.first() {
        Some(path) if path.ends_with(".toml") => {
            let path = args.remove(0);
            match ConfigFile::from_file(&path) {
                Ok(cf) => cf.into_plugin_config(),
                Err(e) => {
                    eprintln!("Failed to load config file {}: {}. Using defaults.", path, e);
                    PluginConfig::default()
                }
            }
        }
        _ => PluginConfig::default(),
    };

    init_logging(&config);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::debug!("Configuration loaded: {:?}", config);

    let json = args.iter().any(|a| a == "--json");
    let inputs: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();
    if inputs.is_empty() {
        eprintln!("usage: {} [config.toml] [--json] <file-or-url>...", APP_NAME);
        std::process::exit(2);
    }

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let mut failed = false;
    for input in inputs {
        match load(&fetcher, input).await {
            Ok(body) => report(input, &body, json),
            Err(e) => {
                tracing::error!("failed to read {}: {}", input, e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn load(fetcher: &HttpFetcher, input: &str) -> Result<String> {
    if input.starts_with("http://") || input.starts_with("https://") {
        let url = Url::parse(input)?;
        fetcher.fetch_text(&url).await
    } else {
        Ok(tokio::fs::read_to_string(input).await?)
    }
}

fn report(source: &str, body: &str, json: bool) {
    let offset = timestamp_offset(body);
    let mut track = CaptionTrack::new(Caption::new(source, source));
    track.augment_payload(body, offset, TimeDelta::zero());

    if json {
        let cues: Vec<serde_json::Value> = track
            .cues()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "start": format_timecode(c.start),
                    "end": format_timecode(c.end),
                    "text": c.text,
                })
            })
            .collect();
        let report = serde_json::json!({
            "source": source,
            "offset_ms": offset.num_milliseconds(),
            "cues": cues,
        });
        println!("{}", report);
    } else {
        println!("NOTE {} offset {}", source, format_timecode(offset));
        print!("{}", track.to_webvtt());
    }
}

/// Initialize logging with tracing
fn init_logging(config: &PluginConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hls_captions={}", config.log_level).into());

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
