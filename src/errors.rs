//! Unified error type for the word-toll bot.
//!
//! Domain errors carry enough context to be shown to the user as-is. Infrastructure
//! errors (database, framework, environment) are logged and reported generically.

use poise::serenity_prelude as serenity;
use thiserror::Error;

/// Every error the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// No owner is registered under this id
    #[error("등록되지 않은 사용자입니다. (`{id}`)")]
    OwnerNotFound {
        /// Discord user id that was looked up
        id: String,
    },

    /// No live word has this text
    #[error("__{text}__ 단어를 찾을 수 없습니다.")]
    WordNotFound {
        /// Word text (or id rendered as text) that was looked up
        text: String,
    },

    /// A live word with the same text already exists
    #[error("__{text}__ 단어는 이미 등록되어 있습니다.")]
    DuplicateWord {
        /// The colliding text
        text: String,
    },

    /// The text is shorter than two syllables or contains non-Hangul characters
    #[error("__{text}__: 단어에는 완성형 한글만 사용할 수 있고, 두 글자 이상이어야 합니다.")]
    InvalidWord {
        /// The rejected text
        text: String,
    },

    /// The caller's balance cannot cover the requested debit
    #[error("소지금이 부족합니다. (보유: {current:.2}, 필요: {required:.2})")]
    InsufficientFunds {
        /// Balance at the time of the check
        current: f64,
        /// Amount that would have been debited
        required: f64,
    },

    /// Amount is not finite or out of the accepted range
    #[error("잘못된 금액입니다: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// The user is already registered
    #[error("이미 등록된 사용자입니다. (`{id}`)")]
    OwnerExists {
        /// Discord user id
        id: String,
    },

    /// The caller does not own the word they are trying to manage
    #[error("__{text}__ 단어를 소유하고 있지 않습니다.")]
    NotWordOwner {
        /// Word text
        text: String,
    },

    /// The word already has a market listing
    #[error("__{text}__ 단어는 이미 시장에 내놓여 있습니다.")]
    AlreadyListed {
        /// Word text
        text: String,
    },

    /// The word has no market listing
    #[error("__{text}__ 단어는 시장에 내놓지 않았습니다.")]
    NotListed {
        /// Word text
        text: String,
    },

    /// The word changed hands between looking it up and buying it
    #[error("__{text}__ 단어의 소유자가 바뀌었습니다. 다시 시도해 주세요.")]
    OwnerChanged {
        /// Word text
        text: String,
    },

    /// Remittance or purchase where both sides are the same user
    #[error("자기 자신과는 거래할 수 없습니다.")]
    SelfTransfer,

    /// Admin command invoked by a non-developer
    #[error("권한이 없습니다.")]
    Unauthorized,

    /// A stored record references something that must exist but does not
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// What was found to be inconsistent
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Integer conversion failure (e.g. limits, Discord ids)
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Writing a reply into a string buffer failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Serenity/Poise framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<serenity::Error>),
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Expected, locally handled rejections that are shown to the user verbatim.
    ///
    /// Everything else is an infrastructure failure or an invariant violation.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::OwnerNotFound { .. }
                | Self::WordNotFound { .. }
                | Self::DuplicateWord { .. }
                | Self::InvalidWord { .. }
                | Self::InsufficientFunds { .. }
                | Self::InvalidAmount { .. }
                | Self::OwnerExists { .. }
                | Self::NotWordOwner { .. }
                | Self::AlreadyListed { .. }
                | Self::NotListed { .. }
                | Self::OwnerChanged { .. }
                | Self::SelfTransfer
                | Self::Unauthorized
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
