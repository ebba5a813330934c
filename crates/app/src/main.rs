use std::fmt;

use dino_core::model::{ProfileDraft, Tier};
use services::{AppServices, Clock};

mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTier { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    IncompleteProfile,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTier { raw } => write!(f, "invalid --tier value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::IncompleteProfile => write!(f, "--name and --age must be given together"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app play    [--tier <beginner|intermediate|advanced>] [--db <sqlite_url>]");
    eprintln!("  app profile [--name <name> --age <2-10> [--avatar <id>]] [--reset] [--db <sqlite_url>]");
    eprintln!("  app history [--limit <n>] [--db <sqlite_url>]");
    eprintln!("  app mute    [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dino.sqlite3");
    eprintln!("  --tier beginner");
    eprintln!("  --limit 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DINO_DB_URL, DINO_TIER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Profile,
    History,
    Mute,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "profile" => Some(Self::Profile),
            "history" => Some(Self::History),
            "mute" => Some(Self::Mute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    tier: Tier,
    limit: u32,
    name: Option<String>,
    age: Option<u8>,
    avatar: Option<u32>,
    reset: bool,
}

impl Args {
    fn from_env() -> Self {
        Self {
            db_url: std::env::var("DINO_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://dino.sqlite3".into(), normalize_sqlite_url),
            tier: std::env::var("DINO_TIER")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            limit: 10,
            name: None,
            age: None,
            avatar: None,
            reset: false,
        }
    }

    fn parse(mut self, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--tier" => {
                    let value = require_value(args, "--tier")?;
                    self.tier = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTier { raw: value.clone() })?;
                }
                "--limit" => {
                    self.limit = parse_number("--limit", require_value(args, "--limit")?)?;
                }
                "--name" => self.name = Some(require_value(args, "--name")?),
                "--age" => self.age = Some(parse_number("--age", require_value(args, "--age")?)?),
                "--avatar" => {
                    self.avatar = Some(parse_number("--avatar", require_value(args, "--avatar")?)?);
                }
                "--reset" => self.reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if self.name.is_some() != self.age.is_some() {
            return Err(ArgsError::IncompleteProfile);
        }
        Ok(self)
    }

    fn profile_draft(&self) -> Option<ProfileDraft> {
        Some(ProfileDraft {
            display_name: self.name.clone()?,
            age: self.age?,
            avatar_id: self.avatar.unwrap_or(1),
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn show_profile(services: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = services.profiles();
    if args.reset {
        profiles.sign_out().await?;
        println!("Profile cleared.");
        return Ok(());
    }
    if let Some(draft) = args.profile_draft() {
        profiles.sign_in(draft).await?;
    }

    let Some(overview) = profiles.overview().await? else {
        println!("Nobody signed in yet. Create a profile with --name and --age.");
        return Ok(());
    };
    println!("{}", overview.display_name);
    println!("  stars:          {}", overview.star_total);
    println!("  highest score:  {}", overview.highest_score);
    println!("  games played:   {}", overview.games_played);
    println!("  achievements:   {}", overview.unlocked_achievements);
    let games: Vec<&str> = overview.recommended_games.iter().map(|g| g.as_str()).collect();
    println!("  recommended:    {}", games.join(", "));
    Ok(())
}

async fn show_history(services: &AppServices, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let items = services.history().list_recent(None, limit).await?;
    if items.is_empty() {
        println!("No games played yet.");
    }
    for item in items {
        println!(
            "{}  {:<8} {:<12} score {:>4}  {}/{} correct  {} star(s)  {}",
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.game.as_str(),
            item.tier.as_str(),
            item.final_score,
            item.correct,
            item.correct + item.wrong,
            item.stars,
            item.ended_by.as_str(),
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::from_env().parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system()).await?;
    services.sound_settings().load().await?;
    tracing::debug!(db = %parsed.db_url, ?cmd, "services ready");

    match cmd {
        Command::Play => play::run(&services, parsed.tier).await,
        Command::Profile => show_profile(&services, &parsed).await,
        Command::History => show_history(&services, parsed.limit).await,
        Command::Mute => {
            let muted = services.sound_settings().toggle_mute().await?;
            println!("Sound {}.", if muted { "muted" } else { "on" });
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Args {
        Args {
            db_url: "sqlite::memory:".into(),
            tier: Tier::Beginner,
            limit: 10,
            name: None,
            age: None,
            avatar: None,
            reset: false,
        }
    }

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        base().parse(&mut args.iter().map(ToString::to_string))
    }

    #[test]
    fn parses_tier_and_limit() {
        let args = parse(&["--tier", "Advanced", "--limit", "3"]).unwrap();
        assert_eq!(args.tier, Tier::Advanced);
        assert_eq!(args.limit, 3);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--tier", "expert"]),
            Err(ArgsError::InvalidTier { .. })
        ));
        assert!(matches!(
            parse(&["--age", "old"]),
            Err(ArgsError::InvalidNumber { flag: "--age", .. })
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--bogus"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn profile_flags_come_in_pairs() {
        assert!(matches!(
            parse(&["--name", "Rex"]),
            Err(ArgsError::IncompleteProfile)
        ));
        let args = parse(&["--name", "Rex", "--age", "6"]).unwrap();
        let draft = args.profile_draft().unwrap();
        assert_eq!(draft.display_name, "Rex");
        assert_eq!(draft.avatar_id, 1);
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/dino.db".into()),
            "sqlite:///tmp/dino.db"
        );
        assert!(normalize_sqlite_url("dino.db".into()).starts_with("sqlite:///"));
    }
}
