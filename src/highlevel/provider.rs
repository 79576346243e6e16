//! The embedding capability supplied by the host.

use crate::error::Result;

/// Turns document texts into raw embedding vectors, one per text, in order.
///
/// Implemented for any closure `Fn(&[&str]) -> Result<Vec<Vec<f64>>>`, so a
/// host can plug in an HTTP client, a local model or a test stub without the
/// numerical core knowing which.
pub trait EmbeddingProvider {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>>;
}

impl<F> EmbeddingProvider for F
where
    F: Fn(&[&str]) -> Result<Vec<Vec<f64>>>,
{
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>> {
        self(texts)
    }
}

/// A document to embed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
