use std::process::ExitCode;

/// Outcome of a command: a process status plus an optional message for the
/// user.
#[derive(Debug)]
pub struct Exit {
    status: ExitStatus,
    message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitStatus {
    Success,
    Error,
}

impl Exit {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: ExitStatus::Success,
            message: None,
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            status: ExitStatus::Error,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the message, if any, and turn the status into a process code.
    /// Errors go to stderr so stdout stays machine-readable.
    pub fn report(self) -> ExitCode {
        match (self.status, self.message) {
            (ExitStatus::Success, Some(message)) => println!("{message}"),
            (ExitStatus::Error, Some(message)) => eprintln!("{message}"),
            (_, None) => {}
        }

        match self.status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Error => ExitCode::FAILURE,
        }
    }
}
