use clap::{Args, Parser, Subcommand};
use marquee_api::MediaType;
use marquee_core::viewmodel::NewsCategory;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod approver;
mod commands;
mod output;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(version, about = "News headlines and TMDB movies in your terminal", long_about = None)]
pub struct Cli {
    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default one
    #[arg(long, global = true, env = "MARQUEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session profile to use
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// TMDB language, e.g. en-US
    #[arg(long, global = true)]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Top headlines for a category
    Headlines {
        #[arg(short, long, default_value = "general")]
        category: NewsCategory,
    },
    /// Search all news
    NewsSearch { query: String },
    /// Movies on TMDB
    Movies {
        #[command(subcommand)]
        action: TitleAction,
    },
    /// TV shows on TMDB
    Tv {
        #[command(subcommand)]
        action: TitleAction,
    },
    /// Search people
    People {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Content ratings per country
    Certifications { kind: MediaType },
    /// Log in to TMDB (approve the request in a browser)
    Login,
    /// Start a guest session
    Guest,
    /// Delete the stored session
    Logout,
    /// Your TMDB account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Mark a movie or show as favorite
    Favorite(MarkArgs),
    /// Add a movie or show to the watchlist
    Watchlist(MarkArgs),
    /// TMDB lists
    List {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Upload an image to TMDB's upload endpoint
    Upload { file: PathBuf },
    /// Demo REST users API
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
pub enum TitleAction {
    Popular {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: i64,
    },
    Search {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Rate from 0.5 to 10 in half steps
    Rate {
        id: i64,
        rating: f64,
    },
    /// Delete your rating
    Unrate {
        id: i64,
    },
    Discover {
        #[arg(short, long, default_value = "popularity.desc")]
        sort_by: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Subcommand)]
pub enum AccountAction {
    Details,
    Favorites {
        #[arg(long)]
        tv: bool,
    },
    Watchlist {
        #[arg(long)]
        tv: bool,
    },
    Rated {
        #[arg(long)]
        tv: bool,
    },
}

#[derive(Args)]
pub struct MarkArgs {
    pub media_type: MediaType,
    pub id: i64,
    /// Take it off again
    #[arg(long)]
    pub remove: bool,
}

#[derive(Subcommand)]
pub enum ListAction {
    Show {
        list_id: String,
    },
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Add {
        list_id: String,
        media_id: i64,
    },
}

#[derive(Args)]
pub struct UserFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub job: Option<String>,
}

#[derive(Subcommand)]
pub enum UserAction {
    Get {
        id: i64,
    },
    Create(UserFields),
    Register(UserFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        id: i64,
    },
    /// Users with a status, e.g. active
    Status {
        status: String,
    },
    /// Users matching key=value filters
    Filter {
        #[arg(value_parser = parse_pair, required = true)]
        filters: Vec<(String, String)>,
    },
    /// Users from an absolute or base-relative URL
    Url {
        url: String,
    },
    /// Form-encoded create with just a name and a job
    Quick {
        name: String,
        job: String,
    },
    Profile {
        token: String,
    },
    /// Profile call with arbitrary Name=value headers
    ProfileWithHeaders {
        #[arg(value_parser = parse_pair, required = true)]
        headers: Vec<(String, String)>,
    },
    Upload {
        file: PathBuf,
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got {}", s))?;
    if key.trim().is_empty() {
        return Err(format!("Empty key in {}", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// stderr for commands; a log file for the TUI so the screen stays clean
fn init_logging(verbose: bool, tui: bool) -> anyhow::Result<()> {
    let default = if verbose { "marquee=debug" } else { "marquee=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    if tui {
        let dir = marquee_core::Config::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("marquee.log"))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.command.is_none())?;

    let config = commands::load_config(&cli)?;
    commands::run(cli, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("status=active"),
            Ok(("status".to_string(), "active".to_string()))
        );
        assert_eq!(
            parse_pair("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn test_headlines_category_parses() {
        let cli = Cli::parse_from(["marquee", "headlines", "--category", "Sports"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Headlines {
                category: NewsCategory::Sports
            })
        ));
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::parse_from(["marquee", "--json"]);
        assert!(cli.command.is_none());
        assert!(cli.json);
    }
}
