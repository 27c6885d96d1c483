use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Corpus, Difficulty, Question};

//
// ─── LINE CLASSIFICATION ───────────────────────────────────────────────────────
//

/// Company-header form: leading integer and dot, then an all-uppercase phrase
/// over letters, spaces, and `&/().'+-` that ends in a letter. An optional
/// `" | ..."` remainder after the phrase is tolerated and dropped.
static COMPANY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s*([A-Z][A-Z\s&/().'+-]*[A-Z])(?:\s*\|.*)?$")
        .expect("company header pattern is valid")
});

/// Any numbered line: the prefix shared by company headers and question starts.
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*(.*)$").expect("numbered line pattern is valid"));

/// Topic-header body: all-uppercase letters with a few separators.
static TOPIC_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z\s&/-]*$").expect("topic header pattern is valid"));

/// `- Link: <token>` with arbitrary case and whitespace around the colon.
static LINK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-\s*link\s*:\s*(\S+)").expect("link line pattern is valid")
});

/// Difficulty tag anywhere in a question remainder.
static DIFFICULTY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(easy|medium|hard)\b").expect("difficulty tag pattern is valid")
});

/// A parenthesized group containing a difficulty tag, stripped from titles.
static PAREN_DIFFICULTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\([^)]*\b(easy|medium|hard)\b[^)]*\)")
        .expect("parenthesized difficulty pattern is valid")
});

/// Maximum length of a topic-header line. Longer all-caps lines are treated
/// as unrecognized; this threshold is the inherited disambiguation between
/// topic and company headers and must not be tuned casually.
const TOPIC_HEADER_MAX_LEN: usize = 30;

/// Classification of a single trimmed, non-blank corpus line.
///
/// Classification is context-free; the parse loop decides how each kind acts
/// on the current cursor state. Variants are listed in match priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A recognized company header, name already suffix-stripped.
    CompanyHeader(String),
    /// An all-caps topic header within the current company.
    TopicHeader(String),
    /// A numbered question line; the remainder still carries its
    /// difficulty annotation.
    QuestionStart(String),
    /// A `- Link:` line carrying the captured token.
    Link(String),
    /// Anything else; silently ignored by the parser.
    Unrecognized,
}

/// Classify one trimmed line.
///
/// Priority: strict company header, then the numbered form (fallback all-caps
/// company or question start), then topic header, then link line.
#[must_use]
pub fn classify(line: &str) -> LineKind {
    if let Some(caps) = COMPANY_HEADER.captures(line) {
        return LineKind::CompanyHeader(strip_scope_suffix(&caps[1]).trim().to_string());
    }

    if let Some(caps) = NUMBERED_LINE.captures(line) {
        let rest = caps[1].trim();
        if rest.is_empty() {
            return LineKind::Unrecognized;
        }
        // Fallback company form: the remainder is entirely uppercase once
        // digits and punctuation are ignored. Catches names the strict
        // pattern rejects, e.g. ones ending in a closing parenthesis.
        if is_upper_phrase(rest) {
            return LineKind::CompanyHeader(strip_scope_suffix(rest).trim().to_string());
        }
        return LineKind::QuestionStart(rest.to_string());
    }

    if line.chars().count() <= TOPIC_HEADER_MAX_LEN && TOPIC_HEADER.is_match(line) {
        return LineKind::TopicHeader(line.to_string());
    }

    if let Some(caps) = LINK_LINE.captures(line) {
        return LineKind::Link(caps[1].to_string());
    }

    LineKind::Unrecognized
}

fn is_upper_phrase(rest: &str) -> bool {
    rest.chars().any(|c| c.is_ascii_alphabetic())
        && !rest.chars().any(|c| c.is_ascii_lowercase())
}

/// Drop a trailing `" | ..."` annotation from a company name.
fn strip_scope_suffix(name: &str) -> &str {
    match name.find(" | ") {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Split a question remainder into its cleaned title and difficulty.
///
/// The difficulty tag is searched case-insensitively; a parenthesized group
/// containing the tag is stripped from the title in full. Untagged questions
/// default to medium.
#[must_use]
pub fn split_question(rest: &str) -> (String, Difficulty) {
    let difficulty = DIFFICULTY_TAG
        .captures(rest)
        .and_then(|caps| Difficulty::from_tag(&caps[1]))
        .unwrap_or_default();
    let title = PAREN_DIFFICULTY.replace_all(rest, "").trim().to_string();
    (title, difficulty)
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

/// Parse a raw corpus blob into companies, topics, and questions.
///
/// Single forward pass over the lines with three pieces of cursor state: the
/// current company, the current topic, and a pending question that is
/// committed whenever a new header or question start is recognized and once
/// more at end of input. A pending question is appended only when both
/// cursors were set at the time it was staged; otherwise it is discarded.
///
/// Never fails: unrecognized lines are dropped and malformed regions simply
/// contribute nothing. If the pass yields at most one company, the lines are
/// rescanned with only the strict company-header pattern so that at least a
/// partial company list survives a body-parse failure; the rescan recovers
/// no topics or questions.
///
/// Deterministic and free of side effects: identical input yields a
/// structurally identical `Corpus`, ordered by line order.
#[must_use]
pub fn parse(raw: &str) -> Corpus {
    let mut corpus = Corpus::default();
    let mut current_company: Option<String> = None;
    let mut current_topic: Option<String> = None;
    let mut pending: Option<Question> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match classify(line) {
            LineKind::CompanyHeader(name) => {
                commit(&mut corpus, &mut pending);
                corpus.ensure_company(&name);
                current_company = Some(name);
                current_topic = None;
            }
            LineKind::TopicHeader(name) => {
                commit(&mut corpus, &mut pending);
                if let Some(company) = &current_company {
                    corpus.ensure_company(company).ensure_topic(&name);
                }
                current_topic = Some(name);
            }
            LineKind::QuestionStart(rest) => {
                commit(&mut corpus, &mut pending);
                if current_company.is_some() {
                    let (title, difficulty) = split_question(&rest);
                    pending = Some(Question {
                        title,
                        difficulty,
                        url: String::new(),
                        topic: current_topic.clone().unwrap_or_default(),
                        company: current_company.clone().unwrap_or_default(),
                    });
                }
            }
            LineKind::Link(url) => {
                if let Some(question) = pending.as_mut() {
                    question.url = url;
                }
            }
            LineKind::Unrecognized => {}
        }
    }
    commit(&mut corpus, &mut pending);

    // Fallback: body parsing found almost nothing. Rescan for strict company
    // headers so the company list is at least partially visible.
    if corpus.companies.len() <= 1 {
        for line in raw.lines() {
            if let Some(caps) = COMPANY_HEADER.captures(line.trim()) {
                corpus.ensure_company(strip_scope_suffix(&caps[1]).trim());
            }
        }
    }

    corpus
}

/// Append the pending question if it was staged under a complete scope.
///
/// The pending slot is cleared either way.
fn commit(corpus: &mut Corpus, pending: &mut Option<Question>) {
    if let Some(question) = pending.take() {
        if !question.company.is_empty() && !question.topic.is_empty() {
            corpus.push_question(question);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_strict_company_header() {
        assert_eq!(
            classify("1. GOOGLE"),
            LineKind::CompanyHeader("GOOGLE".into())
        );
        assert_eq!(
            classify("12. TATA CONSULTANCY SERVICES"),
            LineKind::CompanyHeader("TATA CONSULTANCY SERVICES".into())
        );
    }

    #[test]
    fn classify_company_header_strips_scope_suffix() {
        assert_eq!(
            classify("3. AMAZON | 45 Questions"),
            LineKind::CompanyHeader("AMAZON".into())
        );
    }

    #[test]
    fn classify_fallback_company_form_allows_trailing_punctuation() {
        // Ends in ')' so the strict pattern rejects it; the all-caps
        // fallback keeps the full remainder.
        assert_eq!(
            classify("1. INFOSYS (SP & DSE)"),
            LineKind::CompanyHeader("INFOSYS (SP & DSE)".into())
        );
    }

    #[test]
    fn classify_topic_header_and_length_cutoff() {
        assert_eq!(classify("ARRAYS"), LineKind::TopicHeader("ARRAYS".into()));
        assert_eq!(
            classify("DYNAMIC PROGRAMMING"),
            LineKind::TopicHeader("DYNAMIC PROGRAMMING".into())
        );
        // 31 chars of uppercase is too long to be a topic.
        let long = "A".repeat(31);
        assert_eq!(classify(&long), LineKind::Unrecognized);
        let exact = "A".repeat(30);
        assert_eq!(classify(&exact), LineKind::TopicHeader(exact.clone()));
    }

    #[test]
    fn classify_question_start_keeps_remainder() {
        assert_eq!(
            classify("2. Two Sum (Easy)"),
            LineKind::QuestionStart("Two Sum (Easy)".into())
        );
    }

    #[test]
    fn classify_link_line_is_case_insensitive() {
        assert_eq!(
            classify("- Link: https://x"),
            LineKind::Link("https://x".into())
        );
        assert_eq!(
            classify("-link  :  https://example.com/a"),
            LineKind::Link("https://example.com/a".into())
        );
    }

    #[test]
    fn classify_ignores_everything_else() {
        assert_eq!(classify("some stray prose"), LineKind::Unrecognized);
        assert_eq!(classify("7."), LineKind::Unrecognized);
    }

    #[test]
    fn split_question_extracts_and_strips_difficulty() {
        let (title, difficulty) = split_question("Two Sum (Easy)");
        assert_eq!(title, "Two Sum");
        assert_eq!(difficulty, Difficulty::Easy);

        let (title, difficulty) = split_question("Word Ladder (Hard, asked twice)");
        assert_eq!(title, "Word Ladder");
        assert_eq!(difficulty, Difficulty::Hard);
    }

    #[test]
    fn split_question_defaults_to_medium() {
        let (title, difficulty) = split_question("Rotate Matrix");
        assert_eq!(title, "Rotate Matrix");
        assert_eq!(difficulty, Difficulty::Medium);
    }

    #[test]
    fn split_question_keeps_unparenthesized_tag_in_title() {
        // Tag still sets the difficulty, but only parenthesized groups are
        // stripped from the title.
        let (title, difficulty) = split_question("Hard Drive Cleanup");
        assert_eq!(title, "Hard Drive Cleanup");
        assert_eq!(difficulty, Difficulty::Hard);
    }

    #[test]
    fn parse_scenario_company_topic_question_link() {
        let raw = "1. INFOSYS (SP & DSE)\nARRAYS\n1. Two Sum (Easy)\n- Link: https://x\n";
        let corpus = parse(raw);

        assert_eq!(corpus.companies.len(), 1);
        let company = corpus.company("INFOSYS (SP & DSE)").unwrap();
        let topic = company.topic("ARRAYS").unwrap();
        assert_eq!(topic.questions.len(), 1);

        let question = &topic.questions[0];
        assert_eq!(question.title, "Two Sum");
        assert_eq!(question.difficulty, Difficulty::Easy);
        assert_eq!(question.url, "https://x");
        assert_eq!(question.company, "INFOSYS (SP & DSE)");
        assert_eq!(question.topic, "ARRAYS");
    }

    #[test]
    fn parse_discards_question_before_any_company() {
        let raw = "1. Two Sum (Easy)\n- Link: https://x\n2. WIPRO\nARRAYS\n3. Merge Sort\n";
        let corpus = parse(raw);

        assert_eq!(corpus.question_count(), 1);
        let wipro = corpus.company("WIPRO").unwrap();
        assert_eq!(wipro.topic("ARRAYS").unwrap().questions[0].title, "Merge Sort");
    }

    #[test]
    fn parse_discards_question_without_topic() {
        let raw = "1. WIPRO\n2. Orphan Question\nARRAYS\n3. Kept Question\n";
        let corpus = parse(raw);

        let wipro = corpus.company("WIPRO").unwrap();
        assert_eq!(wipro.question_count(), 1);
        assert_eq!(
            wipro.topic("ARRAYS").unwrap().questions[0].title,
            "Kept Question"
        );
    }

    #[test]
    fn parse_link_before_any_question_is_ignored() {
        let raw = "1. WIPRO\nARRAYS\n- Link: https://stray\n2. Two Sum\n";
        let corpus = parse(raw);
        let question = &corpus.company("WIPRO").unwrap().topic("ARRAYS").unwrap().questions[0];
        assert_eq!(question.url, "");
    }

    #[test]
    fn parse_new_header_commits_pending_question() {
        let raw = "\
1. WIPRO
ARRAYS
1. First (Medium)
STRINGS
1. Second (Hard)
2. ACCENTURE
GRAPHS
1. Third
";
        let corpus = parse(raw);

        let wipro = corpus.company("WIPRO").unwrap();
        assert_eq!(wipro.topic("ARRAYS").unwrap().questions[0].title, "First");
        assert_eq!(wipro.topic("STRINGS").unwrap().questions[0].title, "Second");
        let accenture = corpus.company("ACCENTURE").unwrap();
        assert_eq!(accenture.topic("GRAPHS").unwrap().questions[0].title, "Third");
    }

    #[test]
    fn parse_topic_names_are_scoped_per_company() {
        let raw = "\
1. WIPRO
ARRAYS
1. Alpha
2. ACCENTURE
ARRAYS
1. Beta
";
        let corpus = parse(raw);
        let wipro = corpus.company("WIPRO").unwrap().topic("ARRAYS").unwrap();
        let accenture = corpus.company("ACCENTURE").unwrap().topic("ARRAYS").unwrap();
        assert_eq!(wipro.questions[0].title, "Alpha");
        assert_eq!(accenture.questions[0].title, "Beta");
    }

    #[test]
    fn parse_topic_header_registers_empty_topic() {
        let raw = "1. WIPRO\nARRAYS\nSTRINGS\n1. Only Question\n2. ACCENTURE\n";
        let corpus = parse(raw);
        let wipro = corpus.company("WIPRO").unwrap();
        assert_eq!(wipro.topic("ARRAYS").unwrap().questions.len(), 0);
        assert_eq!(wipro.topic("STRINGS").unwrap().questions.len(), 1);
        // Second company exists with no topics at all.
        assert!(corpus.company("ACCENTURE").unwrap().topics.is_empty());
    }

    #[test]
    fn parse_is_deterministic() {
        let raw = "\
1. WIPRO
ARRAYS
1. Two Sum (Easy)
- Link: https://a
2. Kadane (Medium)
2. ACCENTURE
STRINGS
1. Anagrams (hard)
";
        assert_eq!(parse(raw), parse(raw));
    }

    #[test]
    fn parse_every_difficulty_is_in_domain_and_titles_are_clean() {
        let raw = "\
1. WIPRO
ARRAYS
1. Alpha (Easy)
2. Beta (MEDIUM)
3. Gamma (hard)
4. Delta
";
        let corpus = parse(raw);
        for company in &corpus.companies {
            for topic in &company.topics {
                for question in &topic.questions {
                    assert!(matches!(
                        question.difficulty,
                        Difficulty::Easy | Difficulty::Medium | Difficulty::Hard
                    ));
                    assert!(!question.title.to_lowercase().contains("(easy"));
                    assert!(!question.title.to_lowercase().contains("(medium"));
                    assert!(!question.title.to_lowercase().contains("(hard"));
                }
            }
        }
    }

    #[test]
    fn parse_fallback_rescan_does_not_duplicate_companies() {
        // A single-company parse triggers the rescan; re-registering the
        // same strict header must not duplicate it or invent questions.
        let raw = "\
intro prose about the sheet
1. GOOGLE
arrays and such
two sum, kadane
";
        let corpus = parse(raw);
        let names: Vec<&str> = corpus.company_names().collect();
        assert_eq!(names, vec!["GOOGLE"]);
        assert_eq!(corpus.question_count(), 0);
    }

    #[test]
    fn parse_empty_input_yields_empty_corpus() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn parse_round_trips_through_json() {
        let raw = "\
1. WIPRO
ARRAYS
1. Two Sum (Easy)
- Link: https://a
STRINGS
1. Anagrams (Hard)
2. ACCENTURE
GRAPHS
1. Course Schedule
";
        let corpus = parse(raw);
        let json = serde_json::to_string(&corpus).unwrap();
        let back = serde_json::from_str::<crate::model::Corpus>(&json).unwrap();
        assert_eq!(back, corpus);
    }
}
