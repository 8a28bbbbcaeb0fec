//! sosmed - A terminal client for the FreeAPI social-media service
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sosmed::api::{ApiClient, NewPost, Registration};
use sosmed::models::{Comment, FollowEntry, Page, Post};
use sosmed::{Config, Session, SessionStore};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    // Parse CLI arguments
    match parse_args(&std::env::args().collect::<Vec<_>>())? {
        Command::Run => sosmed::app::run(config),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        // The TUI owns its runtime; one-shot commands get their own
        cmd => tokio::runtime::Runtime::new()?.block_on(run_command(cmd, &config)),
    }
}

/// CLI commands
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Register { email: String, username: String },
    Login { username: String },
    Logout,
    Whoami,
    Feed { page: u32, limit: Option<u32> },
    Post {
        content: String,
        tags: Vec<String>,
        images: Vec<PathBuf>,
    },
    Like { post_id: String },
    Comments { post_id: String },
    Comment { post_id: String, content: String },
    Follow { username: String },
    Profile { username: Option<String> },
    Followers { username: String },
    Following { username: String },
    Bookmarks,
    Help,
    Version,
}

fn required(args: &[String], index: usize, what: &str) -> Result<String> {
    args.get(index)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing {what}\nRun 'sosmed --help' for usage"))
}

/// Value following `flag` (or its short form) parsed as a number
fn numeric_flag(args: &[String], long: &str, short: &str) -> Result<Option<u32>> {
    match args.iter().position(|a| a == long || a == short) {
        Some(i) => {
            let raw = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("{long} needs a value"))?;
            let n = raw
                .parse()
                .with_context(|| format!("{long} expects a number, got '{raw}'"))?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "register" => Ok(Command::Register {
            email: required(args, 2, "email")?,
            username: required(args, 3, "username")?,
        }),
        "login" => Ok(Command::Login {
            username: required(args, 2, "username")?,
        }),
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),

        "feed" => Ok(Command::Feed {
            page: numeric_flag(args, "--page", "-p")?.unwrap_or(1).max(1),
            limit: numeric_flag(args, "--limit", "-l")?,
        }),

        "post" => {
            let content = required(args, 2, "post content")?;

            // Parse --tag / --image flags
            let mut tags = Vec::new();
            let mut images = Vec::new();
            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "--tag" | "-t" => {
                        tags.push(required(args, i + 1, "tag")?);
                        i += 2;
                    }
                    "--image" | "-i" => {
                        images.push(PathBuf::from(required(args, i + 1, "image path")?));
                        i += 2;
                    }
                    other => anyhow::bail!("Unknown option for post: {other}"),
                }
            }
            Ok(Command::Post {
                content,
                tags,
                images,
            })
        }

        "like" => Ok(Command::Like {
            post_id: required(args, 2, "post ID")?,
        }),
        "comments" => Ok(Command::Comments {
            post_id: required(args, 2, "post ID")?,
        }),
        "comment" => Ok(Command::Comment {
            post_id: required(args, 2, "post ID")?,
            content: required(args, 3, "comment text")?,
        }),
        "follow" => Ok(Command::Follow {
            username: required(args, 2, "username")?,
        }),
        "profile" => Ok(Command::Profile {
            username: args.get(2).cloned(),
        }),
        "followers" => Ok(Command::Followers {
            username: required(args, 2, "username")?,
        }),
        "following" => Ok(Command::Following {
            username: required(args, 2, "username")?,
        }),
        "bookmarks" => Ok(Command::Bookmarks),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'sosmed --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = sosmed::paths::config_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🌐 sosmed - A terminal client for the FreeAPI social-media service

USAGE:
    sosmed                             Launch TUI
    sosmed [COMMAND]

COMMANDS:
    register <email> <username>        Create an account (password from stdin)
    login <username>                   Log in (password from stdin)
    logout                             End the session
    whoami                             Show the logged-in account

    feed [OPTIONS]                     Show the public feed
      Options:
        -p, --page <n>                 Page number (default: 1)
        -l, --limit <n>                Posts per page (default: from config)

    post <content> [OPTIONS]           Publish a post
      Options:
        -t, --tag <tag>                Add a tag (up to 3, repeatable)
        -i, --image <path>             Attach an image (repeatable)
      Examples:
        sosmed post "Hello world!" --tag rust --image cat.png

    like <post-id>                     Like or unlike a post
    comments <post-id>                 Show comments on a post
    comment <post-id> <text>           Comment on a post
    follow <username>                  Follow or unfollow a user
    profile [username]                 Show your or another user's profile
    followers <username>               List followers
    following <username>               List followed accounts
    bookmarks                          Show your bookmarks

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

ENVIRONMENT:
    SOSMED_BASE_URL                    API root (default: {})
    RUST_LOG                           Log filter, e.g. debug

CONFIG:
    {}
"#,
        sosmed::LOGO,
        sosmed::api::DEFAULT_BASE_URL,
        config_path
    );
}

fn print_version() {
    println!("sosmed {}", sosmed::VERSION);
}

/// Read one line from stdin after printing `prompt` to stderr
fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_password() -> Result<String> {
    let password = prompt_line("Password: ")?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}

/// Client carrying the saved token, if any
fn client_for(config: &Config, session: Option<&Session>) -> ApiClient {
    let mut client = ApiClient::new(&config.base_url);
    client.set_token(session.map(|s| s.access_token.clone()));
    client
}

/// Saved session, or an error telling the user to log in
fn require_session(store: &SessionStore) -> Result<Session> {
    store
        .load()?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run: sosmed login <username>"))
}

async fn run_command(cmd: Command, config: &Config) -> Result<()> {
    let store = SessionStore::open()?;

    match cmd {
        Command::Register { email, username } => {
            let password = read_password()?;
            let client = client_for(config, None);
            let user = client
                .register(&Registration::user(&email, &username, &password))
                .await?;
            println!("✓ Registered @{}", user.username);
            println!("  Log in with: sosmed login {}", user.username);
        }

        Command::Login { username } => {
            let password = read_password()?;
            let client = client_for(config, None);
            let data = client.login(&username.to_lowercase(), &password).await?;
            let name = data.user.username.clone();
            store.save(&Session::from(data))?;
            println!("✓ Logged in as @{name}");
        }

        Command::Logout => {
            let Some(session) = store.load()? else {
                println!("Not logged in.");
                return Ok(());
            };
            let client = client_for(config, Some(&session));
            if let Err(e) = client.logout().await {
                tracing::warn!("Server logout failed: {e}");
            }
            store.clear()?;
            println!("✓ Logged out");
        }

        Command::Whoami => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            let user = match client.current_user().await {
                Err(e) if e.is_unauthorized() => {
                    store.clear()?;
                    anyhow::bail!("Session expired. Run: sosmed login {}", session.user.username);
                }
                other => other?,
            };
            store.update_user(&user)?;
            println!("@{} <{}>", user.username, user.email);
            if let Some(role) = &user.role {
                println!("Role: {role}");
            }
        }

        Command::Feed { page, limit } => {
            let session = store.load()?;
            let client = client_for(config, session.as_ref());
            let posts = client
                .feed(page, limit.unwrap_or(config.page_size))
                .await?;
            print_posts("📰 Feed", &posts);
        }

        Command::Post {
            content,
            tags,
            images,
        } => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            if tags.len() > 3 {
                anyhow::bail!("At most 3 tags are allowed");
            }
            let post = client
                .create_post(NewPost {
                    content,
                    tags,
                    images,
                })
                .await?;
            println!("✓ Posted [{}]", post.id);
        }

        Command::Like { post_id } => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            let liked = client.toggle_post_like(&post_id).await?;
            println!("{}", if liked { "♥ Liked" } else { "♡ Unliked" });
        }

        Command::Comments { post_id } => {
            let session = store.load()?;
            let client = client_for(config, session.as_ref());
            let comments = client.comments(&post_id, 1, config.comment_limit).await?;
            print_comments(&comments);
        }

        Command::Comment { post_id, content } => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            let comment = client.add_comment(&post_id, &content).await?;
            println!("✓ Commented [{}]", comment.id);
        }

        Command::Follow { username } => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            let profile = client.user_profile(&username.to_lowercase()).await?;
            let following = client.toggle_follow(&profile.account.id).await?;
            if following {
                println!("✓ Following @{}", profile.account.username);
            } else {
                println!("✓ Unfollowed @{}", profile.account.username);
            }
        }

        Command::Profile { username } => {
            let session = store.load()?;
            let client = client_for(config, session.as_ref());
            let profile = match username {
                Some(name) => client.user_profile(&name.to_lowercase()).await?,
                None => {
                    require_session(&store)?;
                    client.my_profile().await?
                }
            };
            println!("{} @{}", profile.display_name(), profile.account.username);
            if !profile.bio.is_empty() {
                println!("{}", profile.bio);
            }
            println!(
                "{} followers · {} following{}",
                profile.followers_count,
                profile.following_count,
                if profile.is_following {
                    " · you follow them"
                } else {
                    ""
                }
            );
            if !profile.location.is_empty() {
                println!("📍 {}", profile.location);
            }
        }

        Command::Followers { username } => {
            let session = store.load()?;
            let client = client_for(config, session.as_ref());
            let page = client
                .followers(&username.to_lowercase(), 1, config.page_size)
                .await?;
            print_follows(&format!("Followers of @{username}"), &page);
        }

        Command::Following { username } => {
            let session = store.load()?;
            let client = client_for(config, session.as_ref());
            let page = client
                .following(&username.to_lowercase(), 1, config.page_size)
                .await?;
            print_follows(&format!("@{username} follows"), &page);
        }

        Command::Bookmarks => {
            let session = require_session(&store)?;
            let client = client_for(config, Some(&session));
            let posts = client.bookmarks(1, config.page_size).await?;
            print_posts("🔖 Bookmarks", &posts);
        }

        Command::Run | Command::Help | Command::Version => {}
    }

    Ok(())
}

fn print_posts(title: &str, page: &Page<Post>) {
    println!("\n{title} ({})", page.label());
    println!("{}", "─".repeat(60));

    if page.is_empty() {
        println!("No posts.");
        return;
    }

    for post in &page.items {
        println!(
            "\n@{} · {} [{}]",
            post.author.username(),
            post.relative_time(),
            post.id
        );
        println!("{}", post.content);
        let tags = post.tags_line();
        if !tags.is_empty() {
            println!("{tags}");
        }
        println!(
            "{} {}  💬 {}{}",
            if post.is_liked { "♥" } else { "♡" },
            post.likes,
            post.comments,
            if post.is_bookmarked { "  🔖" } else { "" }
        );
    }
}

fn print_comments(page: &Page<Comment>) {
    if page.is_empty() {
        println!("No comments.");
        return;
    }
    for comment in &page.items {
        println!(
            "\n@{} · {} [{}]",
            comment.author.username(),
            comment.relative_time(),
            comment.id
        );
        println!("{}", comment.content);
        println!("♥ {}", comment.likes);
    }
}

fn print_follows(title: &str, page: &Page<FollowEntry>) {
    println!("\n{title} ({})", page.total);
    println!("{}", "─".repeat(60));
    if page.is_empty() {
        println!("Nobody yet.");
        return;
    }
    for entry in &page.items {
        let name = entry.full_name();
        if name.is_empty() {
            println!("  @{}", entry.username);
        } else {
            println!("  @{} · {name}", entry.username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sosmed")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_args_runs_tui() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Command::Run);
    }

    #[test]
    fn test_parse_feed_flags() {
        assert_eq!(
            parse_args(&args(&["feed", "--page", "3", "-l", "5"])).unwrap(),
            Command::Feed {
                page: 3,
                limit: Some(5)
            }
        );
        assert_eq!(
            parse_args(&args(&["feed"])).unwrap(),
            Command::Feed {
                page: 1,
                limit: None
            }
        );
        assert!(parse_args(&args(&["feed", "--page", "x"])).is_err());
    }

    #[test]
    fn test_parse_post_with_tags_and_images() {
        let cmd = parse_args(&args(&[
            "post", "hello", "--tag", "rust", "-t", "tui", "--image", "a.png",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            Command::Post {
                content: "hello".into(),
                tags: vec!["rust".into(), "tui".into()],
                images: vec![PathBuf::from("a.png")],
            }
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert!(parse_args(&args(&["login"])).is_err());
        assert!(parse_args(&args(&["comment", "p1"])).is_err());
        assert!(parse_args(&args(&["post", "hi", "--tag"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn test_profile_username_optional() {
        assert_eq!(
            parse_args(&args(&["profile"])).unwrap(),
            Command::Profile { username: None }
        );
        assert_eq!(
            parse_args(&args(&["profile", "ann"])).unwrap(),
            Command::Profile {
                username: Some("ann".into())
            }
        );
    }
}
