/// Errors from article construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArticleError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unable to derive a valid slug from title {title:?}")]
    UnderivableSlug { title: String },
}

pub type ArticleResult<T> = Result<T, ArticleError>;
