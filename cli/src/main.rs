//! `civic`: command-line front end for the civic issue-reporting backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use civic_client::{BackendClient, ClientConfig, ImageAttachment, NewPost, Registration, VoteMode};
use civic_store::SessionStore;
use civic_store_file::FileStore;
use civic_types::{Category, Location, Post, PostId, Urgency, VoteState};
use civic_utils::LogFormat;
use civic_voting::{IgnoreReason, TapResult, VoteBoard, VoteReconciler};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "civic", about = "Report and vote on local problems")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "CIVIC_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. "http://127.0.0.1:8000".
    #[arg(long, env = "CIVIC_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the device store (vote ledger, session token).
    #[arg(long, env = "CIVIC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Vote contract: "toggle" or "public".
    #[arg(long, env = "CIVIC_VOTE_MODE")]
    vote_mode: Option<VoteMode>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CIVIC_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CIVIC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session token on this device.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token.
    Logout,
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long = "confirm-password")]
        confirm_password: String,
    },
    /// List reported problems with their vote counts.
    Posts {
        /// Only show posts in this category.
        #[arg(long)]
        category: Option<Category>,
        /// Show the N most-voted posts, highest first.
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },
    /// Toggle your vote on a post.
    Vote { post: PostId },
    /// File a new problem report.
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Free text or "lat,lon".
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "other")]
        category: Category,
        #[arg(long, default_value = "medium")]
        urgency: Urgency,
        /// Photo to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

type CliReconciler = VoteReconciler<BackendClient, Arc<FileStore>, Arc<FileStore>>;
type CliBoard = VoteBoard<BackendClient, Arc<FileStore>, Arc<FileStore>>;

fn reconciler(client: BackendClient, store: Arc<FileStore>) -> Arc<CliReconciler> {
    Arc::new(VoteReconciler::new(client, Arc::clone(&store), store))
}

/// File settings first, then flags and env vars on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let file_cfg = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    Ok(ClientConfig {
        base_url: cli.base_url.clone().unwrap_or(file_cfg.base_url),
        data_dir: cli.data_dir.clone().unwrap_or(file_cfg.data_dir),
        vote_mode: cli.vote_mode.unwrap_or(file_cfg.vote_mode),
        log_format: cli.log_format.clone().unwrap_or(file_cfg.log_format),
        log_level: cli.log_level.clone().unwrap_or(file_cfg.log_level),
        ..file_cfg
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let log_format: LogFormat = config.log_format.parse().map_err(anyhow::Error::msg)?;
    civic_utils::init_logging(log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let store = Arc::new(
        FileStore::in_dir(&config.data_dir)
            .with_context(|| format!("opening device store in {}", config.data_dir.display()))?,
    );
    let client = BackendClient::from_config(&config)?;
    tracing::debug!(
        base_url = client.base_url(),
        vote_mode = %client.vote_mode(),
        data_dir = %config.data_dir.display(),
        "client ready"
    );

    match cli.command {
        Command::Login { email, password } => {
            let token = client.login(&email, &password).await?;
            store.set_token(&token)?;
            println!("Signed in.");
        }
        Command::Logout => {
            store.clear_token()?;
            println!("Signed out.");
        }
        Command::Register {
            name,
            email,
            phone,
            password,
            confirm_password,
        } => {
            let registration = Registration {
                name,
                email,
                phone_number: phone,
                password,
                password2: confirm_password,
            };
            client.register(&registration).await?;
            println!("Account created. Sign in with `civic login`.");
        }
        Command::Posts { category, top } => {
            let token = store.token()?;
            let posts = in_category(client.list_posts(token.as_deref()).await?, category);
            let board = VoteBoard::new(reconciler(client, store));
            board.load(&posts);
            print_posts(&board, &posts, top);
        }
        Command::Vote { post } => {
            let state = vote(reconciler(client, store), &post).await?;
            println!(
                "Post {post}: {} votes, {}",
                state.votes,
                if state.user_voted {
                    "you voted"
                } else {
                    "vote removed"
                }
            );
        }
        Command::Report {
            title,
            description,
            location,
            category,
            urgency,
            image,
        } => {
            let Some(token) = store.token()? else {
                bail!("not signed in, run `civic login` first");
            };
            let image = image
                .as_deref()
                .map(ImageAttachment::from_path)
                .transpose()?;
            let report = NewPost {
                title,
                description,
                location: Location::parse(&location),
                category,
                urgency,
                image,
            };
            let message = client.create_post(Some(&token), report).await?;
            println!("{message}");
        }
    }

    Ok(())
}

/// Keep only posts in `category`; `None` keeps everything.
fn in_category(posts: Vec<Post>, category: Option<Category>) -> Vec<Post> {
    match category {
        Some(category) => posts.into_iter().filter(|p| p.category == category).collect(),
        None => posts,
    }
}

/// Posts in display order with their displayed vote states: load order, or
/// the `top` most-voted when asked.
fn ordered<'p>(board: &CliBoard, posts: &'p [Post], top: Option<usize>) -> Vec<(&'p Post, VoteState)> {
    match top {
        Some(limit) => board
            .top(limit)
            .into_iter()
            .filter_map(|(id, state)| posts.iter().find(|p| p.id == id).map(|p| (p, state)))
            .collect(),
        None => posts
            .iter()
            .map(|p| (p, board.state(&p.id).unwrap_or_else(|| p.vote_state())))
            .collect(),
    }
}

fn print_posts(board: &CliBoard, posts: &[Post], top: Option<usize>) {
    if posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for (post, state) in ordered(board, posts, top) {
        println!(
            "#{id} [{category}/{urgency}] {title}",
            id = post.id,
            category = post.category.as_str(),
            urgency = post.urgency.as_str(),
            title = post.title,
        );
        println!(
            "    {location} | {votes} votes{voted} | {comments} comments",
            location = post.location,
            votes = state.votes,
            voted = if state.user_voted { " (voted)" } else { "" },
            comments = post.comments,
        );
    }
    println!("{} posts, {} votes in total", posts.len(), board.total_votes());
}

/// Fetch the posts, then toggle the vote on `post`. Returns the state left
/// on screen; a failed vote is an error carrying the user-facing notice.
async fn vote(reconciler: Arc<CliReconciler>, post: &PostId) -> anyhow::Result<VoteState> {
    let token = reconciler.session().token()?;
    let posts = reconciler.endpoint().list_posts(token.as_deref()).await?;
    let board = VoteBoard::new(reconciler);
    board.load(&posts);

    let result = board.tap(post).await;
    match result {
        TapResult::Ignored(IgnoreReason::UnknownPost) => bail!("no post with id {post}"),
        TapResult::Ignored(IgnoreReason::InFlight) => bail!("a vote on post {post} is already running"),
        TapResult::Completed(outcome) => {
            if let Some(notice) = outcome.notice() {
                if notice.prompt_sign_in {
                    bail!("{}: {} Run `civic login`.", notice.title, notice.body);
                }
                bail!("{}: {}", notice.title, notice.body);
            }
            Ok(outcome.state)
        }
    }
}
