pub mod error;
pub mod question;
pub mod utils;

pub use error::{ForgeError, Result};
pub use question::{
    BloomLevel, BloomQuota, Difficulty, DifficultyQuota, GeneratedQuestion, GenerationRequest,
    Marks, QuestionType, TypeQuota,
};
pub use utils::{coalesce_field, coerce_to_string};
