mod bank;
mod corpus;
mod ids;
mod question;

pub use bank::{BankDomain, BankEntry, ParseDomainError};
pub use corpus::{Company, Corpus, Topic};
pub use ids::{ID_SEPARATOR, QuestionId};
pub use question::{Difficulty, Question};
