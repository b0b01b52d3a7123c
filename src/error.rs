use thiserror::Error;

use crate::layout::LayoutError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("invalid color '{0}', expected #RRGGBB or R,G,B")]
    InvalidColor(String),
    #[error("nothing to draw: no records left after chromosome filtering")]
    EmptyFigure,
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
