mod alert;
mod api;
mod auth;
mod config;
mod controller;
mod models;
mod query;
mod suggest;
#[cfg(test)]
mod testing;
mod tui;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, EnvFilter};

use alert::{Alerter, LogAlerter, Severity};
use api::{HttpApi, PostsApi};
use auth::{greeting, AuthProvider};
use config::Config;
use controller::{NewPostAction, Phase, ResultController, Ticket};
use models::{Field, NewPost, PostRecord, SortKey};
use query::FilterState;
use suggest::SuggestionIndex;

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Browse, search and create job application posts")]
struct Cli {
    /// Posts API base URL (overrides config file and APPTRACK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent posts
    List {
        /// Sort key
        #[arg(short, long, value_enum, default_value_t = SortKey::CreateDate)]
        sort: SortKey,
    },

    /// Search posts by company and/or position
    Search {
        /// Company name
        #[arg(short, long)]
        company: Option<String>,

        /// Position title
        #[arg(short, long)]
        position: Option<String>,

        /// Sort key
        #[arg(short, long, value_enum, default_value_t = SortKey::CreateDate)]
        sort: SortKey,
    },

    /// Show known companies or positions matching some text
    Suggest {
        /// Which field to look up
        #[arg(value_enum)]
        field: Field,

        /// Text to match (case-insensitive substring)
        text: String,
    },

    /// Interactive post browser
    Browse,

    /// Create a post (requires a token)
    New {
        /// Company name
        #[arg(short, long)]
        company: String,

        /// Position title
        #[arg(short, long)]
        position: String,

        /// Application status (applied, interviewing, offer, rejected)
        #[arg(short, long)]
        status: Option<String>,

        /// Interview date (YYYY-MM-DD)
        #[arg(short, long)]
        interview_date: Option<NaiveDate>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show the signed-in user
    Whoami,
}

fn init_logging(verbose: u8, to_file: bool) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    // The terminal view owns the screen, so its logs go to a file.
    if to_file {
        let dir = Config::data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        let path = dir.join("browse.log");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Browse))?;

    let config = Config::load()?.with_api_url(cli.api_url);
    tracing::debug!(api_url = config.api_url(), "configuration loaded");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let api: Arc<dyn PostsApi> = Arc::new(HttpApi::new(config.api_url()));
    let alerter = LogAlerter;

    match cli.command {
        Commands::List { sort } => {
            let mut controller = ResultController::with_sort_key(sort);
            let ticket = controller.mount();
            settle_and_print(&runtime, &mut controller, ticket, api.as_ref(), &alerter)?;
        }

        Commands::Search {
            company,
            position,
            sort,
        } => {
            let filter = FilterState::new(
                company.as_deref().unwrap_or_default(),
                position.as_deref().unwrap_or_default(),
            );
            let mut controller = ResultController::with_sort_key(sort);
            controller.activate();
            let ticket = controller
                .search(&filter)
                .ok_or_else(|| anyhow!("Search view is not active"))?;
            settle_and_print(&runtime, &mut controller, ticket, api.as_ref(), &alerter)?;
        }

        Commands::Suggest { field, text } => {
            let mut index = SuggestionIndex::new(field);
            runtime.block_on(index.ensure_loaded(api.as_ref(), &alerter));
            if !index.is_loaded() {
                return Err(anyhow!("Could not load {}", field.plural()));
            }

            tracing::debug!(known = index.candidates().len(), %field, "suggestions ready");
            let matches = index.matches(&text);
            if matches.is_empty() {
                println!("No {} match '{}'.", field.plural(), text);
            } else {
                for candidate in matches {
                    println!("{}", candidate);
                }
            }
        }

        Commands::Browse => {
            tui::run_browse(api, runtime.handle().clone(), Box::new(config.auth()))?;
        }

        Commands::New {
            company,
            position,
            status,
            interview_date,
            notes,
        } => {
            let new_post = NewPost {
                company,
                position,
                status,
                interview_date,
                notes,
            };
            let created =
                runtime.block_on(create_post(api.as_ref(), &config.auth(), &alerter, &new_post))?;
            println!("Created post #{}", created.id);
        }

        Commands::Whoami => match greeting(&config.auth()) {
            Some(hello) => println!("{}", hello),
            None => println!("Not signed in."),
        },
    }

    Ok(())
}

/// Creates a post as the signed-in user. Fails before any request when no token is set.
async fn create_post(
    api: &dyn PostsApi,
    auth: &dyn AuthProvider,
    alerter: &dyn Alerter,
    new_post: &NewPost,
) -> Result<PostRecord> {
    let token = match (ResultController::new().new_post_action(auth), auth.token()) {
        (NewPostAction::OpenEditor, Some(token)) => token,
        _ => {
            let path = Config::default_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.json".to_string());
            return Err(anyhow!(
                "Not signed in. Set APPTRACK_TOKEN or add a \"token\" to {}",
                path
            ));
        }
    };

    let created = api
        .create_post(new_post, token)
        .await
        .context("Could not create post")?;
    alerter.alert(
        Severity::Success,
        "Post created",
        &format!("#{} {} at {}", created.id, new_post.position, new_post.company),
        None,
    );
    Ok(created)
}

fn settle_and_print(
    runtime: &tokio::runtime::Runtime,
    controller: &mut ResultController,
    ticket: Ticket,
    api: &dyn PostsApi,
    alerter: &LogAlerter,
) -> Result<()> {
    let operation = ticket.query.operation();
    runtime.block_on(controller.run(ticket, api, alerter));
    controller.teardown();

    if controller.phase() == Phase::Failed {
        return Err(anyhow!("{} failed", operation));
    }
    print_posts(controller.posts(), controller.sort_key());
    Ok(())
}

fn print_posts(posts: &[PostRecord], sort: SortKey) {
    if posts.is_empty() {
        println!("No posts found.");
        return;
    }

    println!("Sorted by {} (newest first)", sort.label());
    println!(
        "{:<6} {:<24} {:<28} {:<12} {:<12} {:>6}",
        "ID", "COMPANY", "POSITION", "CREATED", "INTERVIEW", "VIEWS"
    );
    println!("{}", "-".repeat(93));
    for post in posts {
        println!(
            "{:<6} {:<24} {:<28} {:<12} {:<12} {:>6}",
            post.id,
            truncate(post.company.as_deref().unwrap_or("-"), 22),
            truncate(post.position.as_deref().unwrap_or("-"), 26),
            post.created_label(),
            post.interview_label(),
            post.views.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
