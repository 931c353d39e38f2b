mod api_types;
mod config;
mod explore;
mod export;
mod fetch;
mod models;
mod orchestrator;
mod render;
mod session;
mod store;
mod summary;
mod viz_export;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use config::{load_config, AppConfig};
use explore::{parse_top_n, ExplorerInputs, ExplorerViews};
use fetch::AnalyzeError;
use models::AnalysisResult;
use orchestrator::{build_client, run_analysis};
use session::Session;
use store::AnalysisStore;

/// YouTube Comment Vibes - sentiment report and comment explorer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (overrides VIBES_CONFIG environment variable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Analysis endpoint (overrides config and VIBES_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output directory for generated reports (default: "out")
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Directory holding the session's user record and current analysis
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a video URL for analysis and print the report
    Analyze {
        url: String,
        /// Don't print the report after a successful run
        #[arg(long)]
        quiet: bool,
    },
    /// Print the report for the current analysis
    Report,
    /// Search, rank and page through the current analysis' comments
    Explore {
        /// Case-insensitive substring to search for
        #[arg(short, long, default_value = "")]
        search: String,
        /// How many top positive comments to show
        #[arg(long, default_value = "")]
        top_positive: String,
        /// How many top negative comments to show
        #[arg(long, default_value = "")]
        top_negative: String,
        /// 1-indexed page of the full comment list
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Emit the views as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the current report as a print-ready document
    Export {
        /// Target directory (default: <output_dir>)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Store a local user record
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Remove the local user record
    Logout,
    /// Show the logged-in user
    Whoami,
}

fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        debug!("Using api_url from --api-url argument: {}", url);
        cfg.api_url = url.clone();
    }
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    if let Some(dir) = &args.data_dir {
        cfg.data_dir = Some(dir.clone());
    }
    Ok(cfg)
}

fn require_login(session: &Session) -> Result<()> {
    if session.current_user().is_none() {
        bail!("Please log in first: yt_comment_vibes login --email <EMAIL> --password <PASSWORD>");
    }
    Ok(())
}

fn require_result(store: &AnalysisStore) -> Result<&AnalysisResult> {
    match store.current() {
        Some(r) => Ok(r),
        None => bail!("No analysis found ❗ Analyze a YouTube video first."),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = resolve_config(&args)?;
    let data_dir = cfg.data_dir();
    debug!("Using data directory: {}", data_dir.display());

    let mut session = Session::load(&data_dir);
    let mut store = AnalysisStore::open(&data_dir)?;

    match args.command {
        Command::Analyze { url, quiet } => {
            require_login(&session)?;
            let client = build_client(&cfg)?;
            let dir = match run_analysis(&cfg, &client, &mut store, &url).await {
                Ok(dir) => dir,
                Err(e) => {
                    if let Some(AnalyzeError::Failed { detail }) = e.downcast_ref::<AnalyzeError>() {
                        debug!("Underlying failure: {}", detail);
                    }
                    return Err(e);
                }
            };
            let r = require_result(&store)?;
            if !quiet {
                println!("{}", render::render_report_markdown(r));
            }
            info!("Report written to {}", dir.display());
        }
        Command::Report => {
            require_login(&session)?;
            let r = require_result(&store)?;
            println!("{}", render::render_report_markdown(r));
        }
        Command::Explore {
            search,
            top_positive,
            top_negative,
            page,
            json,
        } => {
            let r = require_result(&store)?;
            let mut inputs = ExplorerInputs::new();
            inputs.search_term = search;
            inputs.top_positive = parse_top_n(&top_positive);
            inputs.top_negative = parse_top_n(&top_negative);
            inputs.page = page;
            inputs.page_size = cfg.page_size;
            let views = ExplorerViews::compute(&r.all_comments, &inputs);
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print!("{}", render::render_explore_text(&views, &inputs.search_term));
            }
        }
        Command::Export { dir } => {
            require_login(&session)?;
            let r = require_result(&store)?;
            let target = dir.unwrap_or_else(|| cfg.output_dir.clone());
            let out = export::export_report(r, &target, export::BLOCKS_PER_PAGE)?;
            println!("{} ({} pages)", out.html.display(), out.pages);
            println!("{}", out.markdown.display());
        }
        Command::Login { email, password } => {
            if !session.login(&email, &password)? {
                bail!("Email and password are required.");
            }
            println!("Logged in as {}", email.trim());
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match session.current_user() {
            Some(u) => println!("{} (since {})", u.email, u.logged_in_at.format("%Y-%m-%d %H:%M UTC")),
            None => println!("Not logged in"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let args = Args::parse_from([
            "yt_comment_vibes",
            "--api-url",
            "http://localhost:1/analyze",
            "--data-dir",
            "/tmp/vibes-test",
            "explore",
            "--top-positive",
            "3",
        ]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.api_url, "http://localhost:1/analyze");
        assert_eq!(cfg.data_dir(), PathBuf::from("/tmp/vibes-test"));
        match args.command {
            Command::Explore { top_positive, page, .. } => {
                assert_eq!(parse_top_n(&top_positive), Some(3));
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn commands_need_login_and_a_result() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load(dir.path());
        assert!(require_login(&session).is_err());
        let store = AnalysisStore::in_memory();
        assert!(require_result(&store)
            .unwrap_err()
            .to_string()
            .starts_with("No analysis found"));
    }
}
