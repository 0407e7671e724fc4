//! Health check command - checks a running ScholarAI server.

use std::time::Duration;

use crate::cli::HealthArgs;

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.url.trim_end_matches('/');
    let url = if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            std::process::exit(1);
        }
    };
    if !response.status().is_success() {
        eprintln!("unhealthy: server returned HTTP status {}", response.status());
        std::process::exit(1);
    }

    let body: serde_json::Value = response.json().await?;
    if body["status"] != "healthy" {
        eprintln!("unhealthy: server reported {}", body["status"]);
        std::process::exit(1);
    }

    let provider = body["provider"].as_str().unwrap_or("unknown");
    if body["configured"] == true {
        println!("healthy: provider {provider}");
    } else {
        // Reachable, but every operation will fail until a key is set.
        println!("healthy: provider {provider} (no API key configured)");
        std::process::exit(2);
    }
    Ok(())
}
