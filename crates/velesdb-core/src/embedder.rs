//! The text-to-vector boundary a collection can optionally bind to.
//!
//! A collection knows only that it has dimensions and a metric; turning text
//! into a vector of the right length is someone else's job. `Embedder` is
//! that someone, injected by the caller rather than chosen by this crate.


use crate::error::Result;

/// Produces fixed-length embeddings from text. Implementations decide the
/// model, batching strategy, and remote/local split; this crate only needs
/// the output to be `dimensions` long and stable across calls.
pub trait Embedder: Send + Sync {
    /// Embeds a single piece of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend fails or returns a vector of
    /// the wrong length.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, preserving order.
    ///
    /// The default forwards to [`Embedder::embed`] one at a time; batching
    /// backends should override this for throughput.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Embedder::embed`].
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The length every embedding this implementation produces must have.
    fn dimensions(&self) -> usize;
}
