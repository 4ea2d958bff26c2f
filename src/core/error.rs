use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,

    ValidationInvalidArgument,

    SourceNotFound,
    FileNotFound,
    FilePermissionDenied,
    FileInvalidEncoding,

    ManifestNotFound,
    ManifestParseError,

    StubNotFound,

    AutoloadCommandFailed,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::SourceNotFound => "file.source_not_found",
            ErrorCode::FileNotFound => "file.not_found",
            ErrorCode::FilePermissionDenied => "file.permission_denied",
            ErrorCode::FileInvalidEncoding => "file.invalid_encoding",

            ErrorCode::ManifestNotFound => "manifest.not_found",
            ErrorCode::ManifestParseError => "manifest.parse_error",

            ErrorCode::StubNotFound => "stub.not_found",

            ErrorCode::AutoloadCommandFailed => "autoload.command_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDetails {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDeniedDetails {
    pub path: String,
    pub operation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseErrorDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub output: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn source_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::SourceNotFound,
            format!("Source file not found: {}", path.display()),
            to_details(PathDetails {
                path: display(path),
            }),
        )
        .with_hint("Run setup against a freshly generated Laravel project")
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.display()),
            to_details(PathDetails {
                path: display(path),
            }),
        )
    }

    pub fn permission_denied(path: &Path, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::FilePermissionDenied,
            format!("Permission denied: {} ({})", path.display(), operation),
            to_details(PermissionDeniedDetails {
                path: display(path),
                operation,
            }),
        )
    }

    pub fn invalid_encoding(path: &Path) -> Self {
        Self::new(
            ErrorCode::FileInvalidEncoding,
            format!("File is not valid UTF-8 text: {}", path.display()),
            to_details(PathDetails {
                path: display(path),
            }),
        )
    }

    pub fn manifest_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::ManifestNotFound,
            "Project manifest not found",
            to_details(PathDetails {
                path: display(path),
            }),
        )
        .with_hint("Pass --project with the directory that contains composer.json")
    }

    pub fn manifest_parse(path: &Path, error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ManifestParseError,
            "Project manifest is malformed",
            to_details(ParseErrorDetails {
                path: display(path),
                error: error.into(),
            }),
        )
    }

    pub fn stub_not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::StubNotFound,
            format!("Stub not found: {}", name),
            serde_json::json!({ "stub": name }),
        )
    }

    pub fn autoload_command_failed(details: CommandFailedDetails) -> Self {
        Self::new(
            ErrorCode::AutoloadCommandFailed,
            format!("Autoload regeneration failed: {}", details.command),
            to_details(details),
        )
        .with_hint("Run 'composer dump-autoload' manually once the problem is fixed")
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem: problem.into(),
                value,
            }),
        )
    }

    pub fn config_invalid_json(path: &Path, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            to_details(ParseErrorDetails {
                path: display(path),
                error: err.to_string(),
            }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    /// Map a filesystem error on `path` to the matching error kind.
    ///
    /// Permission failures become `FilePermissionDenied` and undecodable text
    /// becomes `FileInvalidEncoding`; everything else is reported as an
    /// internal IO error carrying `operation` as context.
    pub fn from_io(err: std::io::Error, path: &Path, operation: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path, operation),
            std::io::ErrorKind::InvalidData => Self::invalid_encoding(path),
            _ => Self::internal_io(
                err.to_string(),
                Some(format!("{} {}", operation, path.display())),
            ),
        }
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
