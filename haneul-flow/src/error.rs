use thiserror::Error;

/// Infrastructure failures raised by the flows and their ports.
///
/// User input problems are never reported through this type; see [`ValidationError`].
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Package not found: {0}")]
    PackageNotFound(u32),

    #[error("Duplicate package id in catalog: {0}")]
    DuplicatePackage(u32),

    #[error("No package selected")]
    NothingSelected,

    #[error("Session flag is not set")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Input validation failures. The display text is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Preencha telefone e senha.")]
    MissingCredentials,

    #[error("Escolha o tipo de cadastro.")]
    PersonTypeNotChosen,

    #[error("Você precisa aceitar os termos de uso e privacidade.")]
    TermsNotAccepted,

    #[error("As senhas não coincidem.")]
    PasswordMismatch,

    #[error("Preencha todos os campos.")]
    IncompleteRegistration,

    #[error("Preencha este campo: {field}")]
    RequiredField { field: &'static str },
}
