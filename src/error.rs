use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The grid, page or product list cannot be laid out.
    InvalidConfig(String),
    /// The rasterizer could not encode a barcode value; the whole export fails.
    Barcode { text: String, reason: String },
    Pdf(String),
    ProductLookup { barcode: String, reason: String },
    Store(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "invalid JSON: {e}"),
            Error::InvalidConfig(msg) => write!(f, "invalid label configuration: {msg}"),
            Error::Barcode { text, reason } => {
                write!(f, "cannot render barcode {text:?}: {reason}")
            }
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
            Error::ProductLookup { barcode, reason } => {
                write!(f, "product lookup failed for {barcode:?}: {reason}")
            }
            Error::Store(msg) => write!(f, "config store: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
