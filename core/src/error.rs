//! Error taxonomy for the denoiser core.
//!
//! Input rejection and data-invariant violations are typed and fatal for the
//! operation that hit them; a missing model artefact is *not* an error during
//! correction (the affected step is skipped, see the model modules).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DenoiseError>;

#[derive(Debug, Error)]
pub enum DenoiseError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("model store: {0}")]
    Store(#[from] redb::Error),

    #[error("artefact codec: {0}")]
    Codec(#[from] bincode::Error),

    #[error("dictionary index: {0}")]
    DictionaryIndex(#[from] fst::Error),

    #[error("unknown statistic key `{0}`")]
    UnknownStat(String),

    /// Two or more spellings survived every tie-break rule. The data no
    /// longer satisfies the uniqueness invariant; do not fabricate a choice.
    #[error("tie-break left {0} indistinguishable spellings")]
    UnresolvedTie(usize),

    #[error("training set has {features} feature rows but {labels} labels")]
    TrainingSetMismatch { features: usize, labels: usize },

    #[error("classifier artefact is missing or untrained")]
    MissingClassifier,
}
