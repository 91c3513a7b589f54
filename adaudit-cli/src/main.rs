//! adaudit - Ad Creative Audit CLI
//!
//! Terminal front-end for the ad creative audit backend: email+OTP login,
//! creative submission, paginated history, decoded insight display, and
//! HTML report export.

use adaudit_client::api::BackendClient;
use adaudit_client::pipeline::SubmitPipeline;
use adaudit_client::session::SessionStore;
use adaudit_client::storage::StorageClient;
use adaudit_client::{decode, report};
use adaudit_common::config::{ensure_root_folder, resolve_root_folder, Settings};
use adaudit_common::types::{RecordId, UserId};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "adaudit", version, about = "AI-powered ad creative audits")]
struct Cli {
    /// Root folder for local state (session, exported reports)
    #[arg(long, global = true, env = "ADAUDIT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Backend base URL override
    #[arg(long, global = true, env = "ADAUDIT_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and request a one-time code
    Signup {
        name: String,
        email: String,
    },
    /// Request a one-time code for an existing account
    Login {
        email: String,
    },
    /// Verify the emailed one-time code and store the session
    Verify {
        email: String,
        otp: String,
    },
    /// Show the logged-in user's profile and remaining quota
    Profile,
    /// Upload a creative and run an audit on it
    Submit {
        /// Path to the image creative (PNG or JPEG)
        image: PathBuf,
        /// Who the ad is meant to reach
        #[arg(long)]
        audience: Option<String>,
    },
    /// List past audits, newest first
    History {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 5)]
        limit: i64,
    },
    /// Show one audit with its decoded AI insight
    Show {
        id: String,
    },
    /// Export an audit as an HTML report
    Export {
        id: String,
        /// Output file (defaults to audit-<id>.html in the root folder)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Clear the stored session
    Logout,
}

/// Default log filter: INFO unless overridden via RUST_LOG
///
/// The build-identification banner is logged at INFO and must be visible
/// out of the box.
fn default_env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(default_env_filter())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "adaudit v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = api_url.clone();
    }

    let root_folder = resolve_root_folder(cli.root_folder.as_ref(), &settings);
    ensure_root_folder(&root_folder)?;

    let backend = BackendClient::new(&settings)?;
    let storage = StorageClient::new(&settings)?;
    let session = SessionStore::new(&root_folder);

    match cli.command {
        Command::Signup { name, email } => {
            let user_id = backend.signup(&name, &email).await?;
            println!("Account created (user {user_id}).");
            println!("Check {email} for your one-time code, then run: adaudit verify {email} <otp>");
        }
        Command::Login { email } => {
            backend.login(&email).await?;
            println!("Check {email} for your one-time code, then run: adaudit verify {email} <otp>");
        }
        Command::Verify { email, otp } => {
            let user_id = backend.verify_otp(&email, &otp).await?;
            session.set(&user_id)?;
            println!("Logged in as user {user_id}.");
        }
        Command::Profile => {
            let user_id = require_session(&session)?;
            let profile = backend.profile(&user_id).await?;
            println!("Name:  {}", profile.name.as_deref().unwrap_or("Guest"));
            println!(
                "Quota: {} audits remaining",
                profile.quota.map(|q| q.remaining).unwrap_or(0)
            );
        }
        Command::Submit { image, audience } => {
            let user = session.get()?;
            let pipeline = SubmitPipeline::new(&backend, &storage, &backend);
            let record = pipeline
                .submit_audit(&image, audience.as_deref().unwrap_or(""), user.as_ref())
                .await?;

            let insight = decode(record.analysis_json.as_ref());
            println!("Audit #{} complete.", record.id);
            println!();
            print_insight(record.score, &insight);
        }
        Command::History { page, limit } => {
            let user_id = require_session(&session)?;
            let history = backend.history(&user_id, page, limit).await?;

            if history.items.is_empty() {
                println!("No audits yet.");
            } else {
                for item in &history.items {
                    let date = item
                        .created_at
                        .map(|t| t.format("%b %e, %Y").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "#{:<8} {:>3}  {:<12} {}  (target: {})",
                        item.id,
                        item.score,
                        date,
                        item.file_name(),
                        item.target_audience
                    );
                }
                let pages = (history.total + limit - 1) / limit.max(1);
                println!();
                println!(
                    "Page {} of {} ({} audits total)",
                    history.page,
                    pages.max(1),
                    history.total
                );
            }
        }
        Command::Show { id } => {
            let record = backend.audit_by_id(&RecordId(id)).await?;
            let insight = decode(record.analysis_json.as_ref());

            println!("Audit #{}", record.id);
            println!("Creative: {}", storage.public_url(&record.s3_key));
            println!("Audience: {}", record.target_audience);
            if let Some(created_at) = record.created_at {
                println!("Date:     {}", created_at.format("%B %e, %Y"));
            }
            println!();
            print_insight(record.score, &insight);
        }
        Command::Export { id, output } => {
            let record = backend.audit_by_id(&RecordId(id)).await?;
            let insight = decode(record.analysis_json.as_ref());
            let image_url = storage.public_url(&record.s3_key);
            let html = report::render_html(&record, &insight, &image_url);

            let output =
                output.unwrap_or_else(|| root_folder.join(format!("audit-{}.html", record.id)));
            std::fs::write(&output, html)
                .with_context(|| format!("Failed to write report to {}", output.display()))?;
            println!("Report written to {}", output.display());
        }
        Command::Logout => {
            session.clear()?;
            println!("Signed out.");
        }
    }

    Ok(())
}

/// Resolve the stored session or fail with a login hint
fn require_session(session: &SessionStore) -> Result<UserId> {
    match session.get()? {
        Some(user_id) => Ok(user_id),
        None => bail!("Not logged in. Run `adaudit login <email>` first."),
    }
}

fn print_insight(score: i64, insight: &adaudit_common::types::DecodedInsight) {
    println!("Score:      {score}");
    println!("Risk:       {}", insight.risk);
    println!("Confidence: {}%", insight.confidence);
    if !insight.summary.is_empty() {
        println!();
        println!("{}", insight.summary);
    }
    if !insight.findings.is_empty() {
        println!();
        println!("Key findings:");
        for finding in &insight.findings {
            println!("  - {finding}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_keeps_info_banner_visible() {
        // With no RUST_LOG override the filter must admit INFO events,
        // otherwise the startup banner never appears
        assert!(default_env_filter().to_string().contains("info"));
    }
}
