use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArgs,
    Usage,
    StorageFailed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArgs | ExitCode::Usage => 1,
            ExitCode::StorageFailed => 10,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::StorageFailed.as_i32()
}

/// Usage errors are printed by clap together with the usage line before
/// they reach `main`.
pub fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ExitError>()
        .is_some_and(|exit| exit.code == ExitCode::Usage)
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn usage(err: clap::Error) -> anyhow::Error {
    ExitError::new(ExitCode::Usage, anyhow::Error::new(err)).into()
}

pub fn storage_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::StorageFailed, err).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_follows_tagged_error() {
        assert_eq!(exit_code(&invalid_args("bad flag")), 1);
        assert_eq!(exit_code(&storage_err(anyhow::anyhow!("no directory"))), 10);
        assert_eq!(exit_code(&anyhow::anyhow!("untagged")), 10);
    }

    #[test]
    fn tagging_keeps_the_cause_chain_without_repeating_the_head() {
        let inner = anyhow::anyhow!("permission denied").context("failed to create directory");
        let err = storage_err(inner);
        let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
        assert_eq!(chain, vec!["failed to create directory", "permission denied"]);
    }

    #[test]
    fn only_usage_errors_count_as_reported() {
        let err = clap::Error::new(clap::error::ErrorKind::UnknownArgument);
        assert!(already_reported(&usage(err)));
        assert!(!already_reported(&invalid_args("bad flag")));
        assert!(!already_reported(&anyhow::anyhow!("untagged")));
    }
}
