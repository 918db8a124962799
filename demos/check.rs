//! Runs one update check against GitHub and prints the outcome.
//!
//! ```text
//! RUST_LOG=updatecheck=debug cargo run --example check -- owner/repo [running-version]
//! ```

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use updatecheck::{binary_version, ReleaseVersion, UpdateChecker, UpdateCheckerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some((owner, name)) = args.next().and_then(|repo| {
        repo.split_once('/')
            .map(|(owner, name)| (owner.to_string(), name.to_string()))
    }) else {
        eprintln!("usage: check <owner/repo> [running-version]");
        return ExitCode::FAILURE;
    };

    let running = match args.next() {
        Some(version) => match ReleaseVersion::from_release_tag(&version) {
            Ok(version) => version,
            Err(e) => {
                eprintln!("invalid running version '{}': {}", version, e);
                return ExitCode::FAILURE;
            }
        },
        None => binary_version!().into(),
    };

    let mut config = UpdateCheckerConfig::new(owner, name, running);
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        config = config.token(token);
    }

    let checker = match UpdateChecker::new(config) {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Version: {}", checker.running_version());
    let outcome = checker.check_for_update().await;

    match outcome.latest_version {
        Some(latest) if outcome.update_available => {
            println!("Update available: {} ({})", latest, outcome.release_page_address);
        }
        Some(_) => println!("Up to date"),
        None => println!("Could not reach {}", outcome.release_page_address),
    }

    ExitCode::SUCCESS
}
