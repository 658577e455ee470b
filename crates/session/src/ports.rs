use async_trait::async_trait;

/// Display surface for progress text.
///
/// The surface is a read-only multi-line text area owned by the host; the
/// session only ever replaces its whole content.
#[async_trait]
pub trait DisplaySink: Send + Sync {
    /// Replace the full text and move the read cursor back to the start.
    async fn replace_text(&self, text: &str);

    /// One-off status announcement outside the main text area.
    async fn announce(&self, message: &str);

    /// Whether the surface was closed externally (e.g. the user dismissed
    /// the window); polled before each refresh.
    fn is_closed(&self) -> bool {
        false
    }
}
