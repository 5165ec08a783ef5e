//! `folio doctor`: diagnose configuration and knowledge sources.

use folio_config::AppConfig;
use folio_core::provider::Provider;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Folio Doctor");
    println!("============\n");

    let mut issues = 0;

    let path = super::config_path(config_path);
    if path.exists() {
        println!("  [ok]   Config file: {}", path.display());
    } else {
        println!("  [info] No config file at {}, using defaults", path.display());
    }

    let config = match AppConfig::load_with_overrides(&path) {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue found. See above for details.");
            return Ok(());
        }
    };

    println!("  [ok]   Model: {} via {}", config.provider.model, config.provider.base_url);

    if config.has_api_key() {
        println!("  [ok]   API key configured");
        match folio_providers::build_from_config(&config) {
            Ok(provider) => {
                let (line, failed) = check_backend(provider.as_ref()).await;
                println!("{line}");
                if failed {
                    issues += 1;
                }
            }
            Err(e) => {
                println!("  [fail] Backend client: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  [fail] No API key: set FOLIO_API_KEY or GOOGLE_API_KEY");
        issues += 1;
    }

    if config.notifications.pushover_configured() {
        println!("  [ok]   Notifications: Pushover");
    } else {
        println!("  [warn] Notifications: local log only (set PUSHOVER_TOKEN and PUSHOVER_USER)");
    }

    let sources = config.persona.knowledge_sources();
    let paths = sources
        .profile
        .iter()
        .chain(sources.summary.iter())
        .chain(sources.extra.iter());
    let mut found = 0;
    for p in paths {
        if p.is_file() {
            println!("  [ok]   Knowledge: {}", p.display());
            found += 1;
        } else {
            println!("  [warn] Knowledge file missing: {}", p.display());
        }
    }
    if found == 0 {
        println!("  [fail] No knowledge files found; the persona has nothing to answer from");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Probe the model backend. Returns the report line and whether it is an issue.
async fn check_backend(provider: &dyn Provider) -> (String, bool) {
    match provider.health_check().await {
        Ok(true) => (format!("  [ok]   Backend reachable: {}", provider.name()), false),
        Ok(false) => (
            format!(
                "  [fail] Backend {} rejected the request (check the API key and base URL)",
                provider.name()
            ),
            true,
        ),
        Err(e) => (format!("  [fail] Backend {} unreachable: {e}", provider.name()), true),
    }
}
