use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("rendered html is not valid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
