use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StatsResult<T> = Result<T, StatsError>;
pub type RunnerResult<T> = StatsResult<T>;

/// Failure classes of a verification run; each maps to a stable exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsErrorCategory {
    VerificationFailure,
    InputValidationError,
    IoSystemError,
    ReportFormatError,
    InternalError,
}

impl StatsErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::VerificationFailure => 1,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ReportFormatError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerificationFailure => "VerificationFailure",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ReportFormatError => "ReportFormatError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsError {
    category: StatsErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl StatsError {
    pub fn new(
        category: StatsErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn verification(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatsErrorCategory::VerificationFailure, placeholder, message)
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            StatsErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatsErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn report_format(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatsErrorCategory::ReportFormatError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatsErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> StatsErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for StatsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for StatsError {}
