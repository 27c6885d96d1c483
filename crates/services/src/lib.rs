#![forbid(unsafe_code)]

pub mod app_services;
pub mod corpus_service;
pub mod error;
pub mod mentor_service;
pub mod progress_store;
pub mod transcript;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use corpus_service::CorpusService;
pub use error::{AppServicesError, CorpusError, MentorError};
pub use mentor_service::{
    InterviewQuestion, MentorConfig, MentorReply, MentorService, ResumeFeedback,
};
pub use progress_store::ProgressStore;
pub use transcript::{ChannelEvent, ChatMessage, Transcript, TranscriptUpdate};
