use evscript_ir::IrError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FormatError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ir(#[from] IrError),
    #[error("Failed to write formatted output")]
    #[diagnostic(code(FormatError::Write))]
    Write(#[from] std::fmt::Error),
    #[error("Invalid formatter config: {0}")]
    #[diagnostic(code(FormatError::Config))]
    Config(#[from] toml::de::Error),
}
