use std::fmt;

use prep_core::model::BankDomain;
use prep_core::parser;
use storage::repository::Storage;

/// Small bundled corpus so a fresh database is immediately browsable.
const SAMPLE_CORPUS: &str = "\
1. INFOSYS (SP & DSE)
ARRAYS
1. Two Sum (Easy)
- Link: https://leetcode.com/problems/two-sum/
2. Maximum Subarray (Medium)
- Link: https://leetcode.com/problems/maximum-subarray/
STRINGS
1. Valid Anagram (Easy)
- Link: https://leetcode.com/problems/valid-anagram/
2. WIPRO
ARRAYS
1. Rotate Array (Medium)
- Link: https://leetcode.com/problems/rotate-array/
GRAPHS
1. Course Schedule (Hard)
- Link: https://leetcode.com/problems/course-schedule/
3. TCS
STRINGS
1. Longest Palindromic Substring (Medium)
- Link: https://leetcode.com/problems/longest-palindromic-substring/
";

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    corpus_file: Option<String>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("PREP_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut corpus_file = std::env::var("PREP_CORPUS_FILE").ok();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--corpus" => {
                    let value = require_value(&mut args, "--corpus")?;
                    corpus_file = Some(value);
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
            corpus_file,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --corpus <path>       Corpus text file (default: bundled sample)");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  PREP_DB_URL, PREP_CORPUS_FILE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = match &args.corpus_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_CORPUS.to_string(),
    };

    let corpus = parser::parse(&raw);
    let storage = Storage::sqlite(&args.db_url).await?;

    let key = format!("{}corpus", BankDomain::Dsa.storage_prefix());
    storage.state.put(&key, &raw).await?;

    println!(
        "Seeded {} companies / {} questions into {} under {}",
        corpus.companies.len(),
        corpus.question_count(),
        args.db_url,
        key
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
