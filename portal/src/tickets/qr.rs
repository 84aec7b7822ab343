//! QR module matrix for drawing onto a PDF page.

use qrcode::{Color, QrCode};

pub use qrcode::types::QrError;

/// Light modules kept around the symbol so scanners find its edge.
const QUIET_ZONE: usize = 2;

/// Square grid of dark/light modules, quiet zone included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `text` at the smallest version that fits.
    ///
    /// # Errors
    ///
    /// When the text is too long for any QR version.
    pub fn encode(text: &str) -> Result<Self, QrError> {
        let code = QrCode::new(text.as_bytes())?;
        let inner = code.width();
        let width = inner + 2 * QUIET_ZONE;
        let mut dark = vec![false; width * width];

        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color == Color::Dark {
                let (row, col) = (i / inner + QUIET_ZONE, i % inner + QUIET_ZONE);
                dark[row * width + col] = true;
            }
        }
        Ok(Self { width, dark })
    }

    /// Modules per side.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// `(row, col)` of every dark module, top-left origin.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dark
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(|(i, _)| (i / self.width, i % self.width))
    }
}
