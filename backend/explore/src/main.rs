use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use explore::{ExploreConfig, FrameContext, GraphTab, ResultState};
use graph::{Fid, User, UserLookup, UserSummary, proxy::ProxyGateway};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    time::timeout,
};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the castgraph server
    #[arg(long, env = "EXPLORE_PROXY_URL", default_value = "http://localhost:3000")]
    proxy_url: String,

    /// Viewer fid, needed for followers/following
    #[arg(long, env = "EXPLORE_FID")]
    fid: Option<Fid>,

    #[arg(long, env = "EXPLORE_DEBOUNCE_MS", default_value_t = 300)]
    debounce_ms: u64,

    #[arg(long, env = "EXPLORE_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every line on stdin replaces the search box content
    Search,

    Followers,

    Following,

    /// Show a profile, the viewer's by default
    User {
        #[arg(long, conflicts_with = "username")]
        lookup_fid: Option<Fid>,

        #[arg(long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ExploreConfig {
        debounce: Duration::from_millis(args.debounce_ms),
        request_timeout: Duration::from_millis(args.timeout_ms),
    };
    let gateway = Arc::new(ProxyGateway::connect(args.proxy_url)?);
    let ctx = FrameContext::new(args.fid, gateway, config);

    match args.command {
        Command::Search => search(&ctx).await,
        Command::Followers => list(&ctx, GraphTab::Followers).await,
        Command::Following => list(&ctx, GraphTab::Following).await,
        Command::User {
            lookup_fid,
            username,
        } => {
            let user = match (lookup_fid, username) {
                (Some(fid), _) => ctx.user(&UserLookup::Fid(fid)).await?,
                (None, Some(username)) => ctx.user(&UserLookup::Username(username)).await?,
                (None, None) => ctx.viewer().await?,
            };

            print_profile(&user);
            Ok(())
        }
    }
}

async fn search(ctx: &FrameContext) -> Result<()> {
    let handle = ctx.spawn_search();
    let mut states = handle.subscribe();

    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            print_state(&state);
        }
    });

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        handle.input(line)?;
    }

    let settle = ctx.config().request_timeout + Duration::from_secs(1);
    match timeout(settle, handle.settle()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("{e}"),
        Err(_) => warn!("Search still loading after {settle:?}, giving up"),
    }

    // The printer ends once the session drops its state, after the last change.
    drop(handle);
    printer.await?;

    Ok(())
}

async fn list(ctx: &FrameContext, tab: GraphTab) -> Result<()> {
    let label = match tab {
        GraphTab::Followers => "followers",
        GraphTab::Following => "following",
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fetching {label}"));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let users = ctx.graph(tab).await;
    spinner.finish_and_clear();

    let users = users?;
    println!("{} {label}\n", users.len());

    for user in &users {
        print_summary(user);
    }

    Ok(())
}

fn print_state(state: &ResultState) {
    match state {
        ResultState::Idle => println!("Type to search"),
        ResultState::Loading { query } => println!("Searching for {query}..."),
        ResultState::Success { query, users } if users.is_empty() => {
            println!("No users found for {query}")
        }
        ResultState::Success { users, .. } => {
            for user in users {
                print_summary(user);
            }
            println!();
        }
        ResultState::Error { reason, .. } => println!("Search failed: {reason}"),
    }
}

fn print_summary(user: &UserSummary) {
    let mut flags = Vec::new();
    if user.is_following() {
        flags.push("following");
    }
    if user.is_followed_by() {
        flags.push("follows you");
    }

    println!(
        "{} @{} ({}) · {} followers {}",
        user.display_name(),
        user.username(),
        user.fid(),
        user.follower_count(),
        flags.join(", ")
    );
}

fn print_profile(user: &User) {
    println!("{} @{}", user.display_name, user.username);
    println!("fid {}", user.fid);

    if let Some(bio) = user.profile.as_ref().map(|p| p.bio.text.as_str()) {
        if !bio.is_empty() {
            println!("\n{bio}\n");
        }
    }

    println!(
        "{} followers · {} following",
        user.follower_count, user.following_count
    );

    if let Some(pfp) = &user.pfp {
        println!("avatar {}", pfp.url);
    }
}
