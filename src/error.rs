use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid public key length: expected {expected} bytes, found {found} bytes")]
    InvalidKeyLength { expected: usize, found: usize },
    #[error("invalid key seed length: expected {expected} bytes, found {found} bytes")]
    InvalidSeedLength { expected: usize, found: usize },
    #[error("invalid signature length: expected {expected} bytes, found {found} bytes")]
    InvalidSignatureLength { expected: usize, found: usize },
    #[error("public key is not set")]
    PublicKeyNotSet,
    #[error("message is empty")]
    EmptyMessage,
    #[error("incorrect signature size {0} for LegRoast algorithm")]
    UnknownSignatureSize(usize),
    #[error("unknown LegRoast algorithm {0}")]
    UnknownAlgorithm(String),
    #[error("first commitment verification failed")]
    FirstCommitmentMismatch,
    #[error("second commitment verification failed")]
    SecondCommitmentMismatch,
    #[error("random generator failure: {0}")]
    Rng(String),
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::Rng(e.to_string())
    }
}
