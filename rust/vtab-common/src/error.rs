use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Access of `size` bytes at `pos` in a buffer of `len` bytes.
    pub fn out_of_range(pos: usize, size: usize, len: usize) -> Error {
        ErrorKind::OutOfRange { pos, size, len }.into()
    }

    pub fn malformed_vtable(table: usize, message: impl Into<String>) -> Error {
        ErrorKind::MalformedVTable {
            table,
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_format(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn field_kind_mismatch(
        table: &str,
        field: &str,
        expected: impl Into<String>,
        requested: impl Into<String>,
    ) -> Error {
        ErrorKind::FieldKindMismatch {
            table: table.to_string(),
            field: field.to_string(),
            expected: expected.into(),
            requested: requested.into(),
        }
        .into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    /// Returns `true` if the error is a bounds violation.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::OutOfRange { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("access of {size} bytes at {pos} is out of range (buffer length {len})")]
    OutOfRange { pos: usize, size: usize, len: usize },

    #[error("malformed vtable for the table at {table}: {message}")]
    MalformedVTable { table: usize, message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid buffer format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("field '{table}.{field}' is declared as {expected}, accessed as {requested}")]
    FieldKindMismatch {
        table: String,
        field: String,
        expected: String,
        requested: String,
    },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Self {
        Error::invalid_format("string", e.to_string())
    }
}
