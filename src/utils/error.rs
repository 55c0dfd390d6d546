// Error conversion helpers and wrapping macro for Snafu-based errors
use crate::error::Error;

/// Convert different error types into our unified Error type.
pub trait IntoStowError {
    fn into_error(self) -> Error;
}

impl IntoStowError for Error {
    fn into_error(self) -> Error {
        self
    }
}

impl IntoStowError for opendal::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl IntoStowError for std::io::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

/// Macro to wrap a Result-producing expression into a Snafu variant with `source: Box<Error>`.
/// Example:
/// wrap_err!(adapter.read(path).await, ReadFailed { path: path.to_string() })?
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e| {
            let src: $crate::error::Error = $crate::utils::error::IntoStowError::into_error(e);
            $crate::error::Error::$variant { $($field: $value),*, source: Box::new(src) }
        })
    }};
}
