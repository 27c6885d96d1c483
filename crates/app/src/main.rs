use std::fmt;

use prep_core::Clock;
use prep_core::filter::{self, FilterTab};
use prep_core::model::BankDomain;
use services::AppServices;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTab { raw: String },
    MissingCompany,
    MissingFile,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTab { raw } => write!(f, "invalid --tab value: {raw}"),
            ArgsError::MissingCompany => write!(f, "progress requires --company"),
            ArgsError::MissingFile => write!(f, "import requires --file"),
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Import,
    Companies,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "import" => Some(Self::Import),
            "companies" => Some(Self::Companies),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    file: Option<String>,
    company: Option<String>,
    search: String,
    tab: FilterTab,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PREP_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut file = None;
        let mut company = None;
        let mut search = String::new();
        let mut tab = FilterTab::All;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--file" => file = Some(require_value(args, "--file")?),
                "--company" => company = Some(require_value(args, "--company")?),
                "--search" => search = require_value(args, "--search")?,
                "--tab" => {
                    let value = require_value(args, "--tab")?;
                    tab = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTab { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            file,
            company,
            search,
            tab,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- import --file <corpus.txt> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- companies [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- progress --company <name> [--search <text>] [--tab <tab>]");
    eprintln!();
    eprintln!("Tabs: all | bookmarked | complete | incomplete");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_AI_API_KEY, PREP_AI_BASE_URL, PREP_AI_MODEL");
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Import => {
            let file = args.file.ok_or(ArgsError::MissingFile)?;
            let raw = std::fs::read_to_string(&file)?;
            let corpus = app.corpus().import(&raw).await?;
            println!(
                "Imported {} companies / {} questions from {file}",
                corpus.companies.len(),
                corpus.question_count()
            );
        }
        Command::Companies => {
            for name in app.corpus().company_names().await? {
                println!("{name}");
            }
        }
        Command::Progress => {
            let company_name = args.company.ok_or(ArgsError::MissingCompany)?;
            let corpus = app.corpus().load().await?;
            let Some(company) = corpus.company(&company_name) else {
                eprintln!("no such company: {company_name}");
                std::process::exit(1);
            };

            let mut tracker = app.progress(BankDomain::Dsa);
            tracker.select_scope(&company_name).await;

            for topic in &company.topics {
                let progress = tracker.topic_progress(&topic.questions);
                println!(
                    "{}: {}/{} ({}%)",
                    topic.name, progress.done, progress.total, progress.percent
                );
                let hits = filter::apply_filters(
                    &topic.questions,
                    &args.search,
                    args.tab,
                    tracker.completed(),
                    tracker.bookmarked(),
                );
                for question in hits {
                    let mark = if tracker.is_completed(&question.id()) {
                        "x"
                    } else {
                        " "
                    };
                    println!("  [{mark}] {} ({})", question.title, question.difficulty);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
