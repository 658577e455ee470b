//! The refresh/display state machine.
//!
//! Two states, `Closed` and `Open`. Opening pins the current candidate
//! set, shows a loading placeholder, refreshes once, and arms the periodic
//! timer; the timer is the only autonomous transition source. A refresh
//! that fails wholesale degrades to an inline error line in the display
//! and leaves the loop running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use ax_adapter::AccessTree;
use perceiver_progress::{extract, find_progress_indicators, message_for};

use crate::errors::SessionError;
use crate::model::SessionConfig;
use crate::ports::DisplaySink;
use crate::snapshot::PinnedSet;

/// Placeholder shown between opening the display and the first refresh.
pub const LOADING_PLACEHOLDER: &str = "Loading progress...";

/// Substituted when a refresh produces no readings at all.
pub const NO_PROGRESS_MESSAGE: &str = "No progress indicators found";

/// User-initiated inputs to the session event loop.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    /// Open the display if closed, close it if open.
    Toggle,
    /// Re-arm the timer with a new period; display content is untouched.
    ApplyInterval(Duration),
    /// Tear the session down.
    Shutdown,
}

pub struct ProgressSession {
    tree: Arc<dyn AccessTree>,
    display: Arc<dyn DisplaySink>,
    config: SessionConfig,
    pinned: PinnedSet,
    open: bool,
}

impl ProgressSession {
    pub fn new(
        tree: Arc<dyn AccessTree>,
        display: Arc<dyn DisplaySink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            tree,
            display,
            config,
            pinned: PinnedSet::new(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn refresh_interval(&self) -> Duration {
        self.config.refresh_interval()
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    pub async fn toggle(&mut self) {
        if self.open {
            self.close().await;
        } else {
            self.open().await;
        }
    }

    /// `Closed -> Open`: pin the current candidates, show the placeholder,
    /// refresh immediately. The timer is armed by the event loop.
    pub async fn open(&mut self) {
        if self.open {
            return;
        }

        match self.tree.foreground() {
            Ok(root) => {
                let candidates = find_progress_indicators(root);
                let pinned = self.pinned.replace_with(&candidates);
                if pinned > 0 {
                    self.display
                        .announce(&format!("{pinned} progress object(s) pinned"))
                        .await;
                } else {
                    self.display
                        .announce("No progress objects found to pin")
                        .await;
                }
            }
            Err(err) => {
                warn!(error = %err, "pinning walk failed");
                self.pinned.clear();
                self.display
                    .announce("No progress objects found to pin")
                    .await;
            }
        }

        self.open = true;
        info!(
            pinned = self.pinned.len(),
            interval = ?self.config.refresh_interval(),
            "progress display opened"
        );
        self.display.replace_text(LOADING_PLACEHOLDER).await;
        self.refresh_once().await;
    }

    /// `Open -> Closed`: release the display and drop the pinned set so a
    /// later open cannot announce stale objects.
    pub async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.pinned.clear();
        info!("progress display closed");
        self.display.announce("Progress display closed").await;
    }

    /// Update the refresh period (floored at one second). The event loop
    /// re-arms its timer; the displayed text stays until the next tick.
    pub fn apply_interval(&mut self, interval: Duration) {
        self.config.set_refresh_interval(interval);
        debug!(interval = ?self.config.refresh_interval(), "refresh interval applied");
    }

    /// One refresh cycle over the pinned set, or a fresh walk when no
    /// pinned entry is still live. Never propagates a failure.
    pub async fn refresh_once(&mut self) {
        if !self.open {
            return;
        }
        let text = match self.collect_text() {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "refresh cycle failed");
                format!("Error reading progress: {err}")
            }
        };
        self.display.replace_text(&text).await;
    }

    fn collect_text(&self) -> Result<String, SessionError> {
        let messages = self.collect_messages()?;
        if messages.is_empty() {
            Ok(NO_PROGRESS_MESSAGE.to_string())
        } else {
            Ok(messages.join("\n"))
        }
    }

    fn collect_messages(&self) -> Result<Vec<String>, SessionError> {
        let live = self.pinned.live();
        if !live.is_empty() {
            return Ok(live.iter().map(|node| extract(node).message()).collect());
        }

        let root = self.tree.foreground()?;
        Ok(find_progress_indicators(root)
            .iter()
            .map(message_for)
            .collect())
    }

    /// Event loop. Commands and ticks are processed strictly one at a
    /// time; each tick's refresh completes before the next can fire.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        let mut ticker = make_ticker(self.config.refresh_interval()).await;
        loop {
            tokio::select! {
                maybe_command = commands.recv() => match maybe_command {
                    Some(SessionCommand::Toggle) => {
                        self.toggle().await;
                        if self.open {
                            ticker = make_ticker(self.config.refresh_interval()).await;
                        }
                    }
                    Some(SessionCommand::ApplyInterval(interval)) => {
                        self.apply_interval(interval);
                        if self.open {
                            ticker = make_ticker(self.config.refresh_interval()).await;
                        }
                    }
                    Some(SessionCommand::Shutdown) | None => {
                        self.close().await;
                        break;
                    }
                },
                _ = ticker.tick(), if self.open => {
                    if self.display.is_closed() {
                        // The surface went away underneath us; same
                        // cleanup as an explicit close.
                        self.close().await;
                    } else {
                        self.refresh_once().await;
                    }
                }
            }
        }
    }
}

/// Build a timer whose first tick fires one full period from now; the
/// immediate refresh on open is handled by `open` itself.
async fn make_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;
    ticker
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::{Mutex, RwLock};

    use ax_adapter::{
        AccessTree, AdapterError, AttrValue, AxNodeHandle, FixtureNode, FixtureTree,
    };
    use axprogress_core_types::{Role, StateFlag};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        texts: Mutex<Vec<String>>,
        announcements: Mutex<Vec<String>>,
        closed: AtomicBool,
    }

    impl RecordingSink {
        fn texts(&self) -> Vec<String> {
            self.texts.lock().clone()
        }

        fn last_text(&self) -> Option<String> {
            self.texts.lock().last().cloned()
        }

        fn text_count(&self) -> usize {
            self.texts.lock().len()
        }

        fn announcements(&self) -> Vec<String> {
            self.announcements.lock().clone()
        }

        fn close_externally(&self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    #[async_trait]
    impl DisplaySink for RecordingSink {
        async fn replace_text(&self, text: &str) {
            self.texts.lock().push(text.to_string());
        }

        async fn announce(&self, message: &str) {
            self.announcements.lock().push(message.to_string());
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::Relaxed)
        }
    }

    /// Tree whose root can be swapped, simulating a changed foreground.
    struct SwappableTree {
        root: RwLock<Arc<FixtureNode>>,
    }

    impl SwappableTree {
        fn new(root: Arc<FixtureNode>) -> Self {
            Self {
                root: RwLock::new(root),
            }
        }

        fn swap(&self, root: Arc<FixtureNode>) {
            *self.root.write() = root;
        }
    }

    impl AccessTree for SwappableTree {
        fn foreground(&self) -> Result<AxNodeHandle, AdapterError> {
            Ok(Arc::clone(&*self.root.read()) as AxNodeHandle)
        }

        fn platform_name(&self) -> &str {
            "swappable-fixture"
        }
    }

    /// Tree that always fails its walk.
    struct BrokenTree;

    impl AccessTree for BrokenTree {
        fn foreground(&self) -> Result<AxNodeHandle, AdapterError> {
            Err(AdapterError::NoForeground)
        }

        fn platform_name(&self) -> &str {
            "broken"
        }
    }

    // Role-rule-only bar: no max_value, so the bounds heuristic stays
    // quiet and each bar yields exactly one candidate.
    fn bar(name: &str, value: f64) -> Arc<FixtureNode> {
        Arc::new(
            FixtureNode::new()
                .with_name(name)
                .with_role(Role::ProgressBar)
                .with_value(AttrValue::Number(value)),
        )
    }

    fn session_over(
        root: Arc<FixtureNode>,
    ) -> (ProgressSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let session = ProgressSession::new(
            Arc::new(FixtureTree::new(root)),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::default(),
        );
        (session, sink)
    }

    #[tokio::test]
    async fn open_pins_shows_placeholder_then_refreshes() {
        let root = Arc::new(FixtureNode::new().with_child(bar("copy", 40.0)));
        let (mut session, sink) = session_over(root);

        session.open().await;

        assert!(session.is_open());
        assert_eq!(session.pinned_count(), 1);
        let texts = sink.texts();
        assert_eq!(texts[0], LOADING_PLACEHOLDER);
        assert_eq!(texts[1], "40.0% complete");
        assert_eq!(
            sink.announcements(),
            vec!["1 progress object(s) pinned".to_string()]
        );
    }

    #[tokio::test]
    async fn open_deduplicates_pinned_candidates() {
        // Same (name, role, window class) twice plus one distinct bar.
        let root = Arc::new(
            FixtureNode::new()
                .with_child(bar("copy", 40.0))
                .with_child(bar("copy", 40.0))
                .with_child(bar("move", 10.0)),
        );
        let (mut session, _sink) = session_over(root);

        session.open().await;
        assert_eq!(session.pinned_count(), 2);
    }

    #[tokio::test]
    async fn open_with_empty_tree_reports_none_found() {
        let root = Arc::new(FixtureNode::new().with_role(Role::Window));
        let (mut session, sink) = session_over(root);

        session.open().await;

        assert!(session.is_open());
        assert_eq!(session.pinned_count(), 0);
        assert_eq!(sink.last_text().as_deref(), Some(NO_PROGRESS_MESSAGE));
        assert_eq!(
            sink.announcements(),
            vec!["No progress objects found to pin".to_string()]
        );
    }

    #[tokio::test]
    async fn dead_pinned_entry_is_skipped_without_error() {
        let doomed = bar("doomed", 20.0);
        let survivor = bar("survivor", 60.0);
        let root = Arc::new(
            FixtureNode::new()
                .with_child(Arc::clone(&doomed))
                .with_child(Arc::clone(&survivor)),
        );
        let (mut session, sink) = session_over(root);

        session.open().await;
        assert_eq!(session.pinned_count(), 2);

        doomed.kill();
        session.refresh_once().await;

        assert_eq!(sink.last_text().as_deref(), Some("60.0% complete"));
    }

    #[tokio::test]
    async fn all_dead_pins_fall_back_to_fresh_walk() {
        let doomed = bar("doomed", 20.0);
        let old_root = Arc::new(FixtureNode::new().with_child(Arc::clone(&doomed)));
        let tree = Arc::new(SwappableTree::new(Arc::clone(&old_root)));
        let sink = Arc::new(RecordingSink::default());
        let mut session = ProgressSession::new(
            Arc::clone(&tree) as Arc<dyn AccessTree>,
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::default(),
        );

        session.open().await;
        assert_eq!(session.pinned_count(), 1);

        // The pinned object dies and a new foreground appears.
        doomed.kill();
        tree.swap(Arc::new(FixtureNode::new().with_child(bar("fresh", 75.0))));
        session.refresh_once().await;

        assert_eq!(sink.last_text().as_deref(), Some("75.0% complete"));
    }

    #[tokio::test]
    async fn refresh_is_idempotent_over_unchanged_tree() {
        let root = Arc::new(
            FixtureNode::new()
                .with_child(bar("copy", 40.0))
                .with_child(bar("move", 10.0)),
        );
        let (mut session, sink) = session_over(root);

        session.open().await;
        session.refresh_once().await;
        session.refresh_once().await;

        let texts = sink.texts();
        let n = texts.len();
        assert_eq!(texts[n - 1], texts[n - 2]);
        assert_eq!(texts[n - 1], "40.0% complete\n10.0% complete");
    }

    #[tokio::test]
    async fn busy_suffix_reaches_the_display() {
        let root = Arc::new(
            FixtureNode::new().with_child(Arc::new(
                FixtureNode::new()
                    .with_role(Role::ProgressBar)
                    .with_value(AttrValue::Number(30.0))
                    .with_state(StateFlag::Busy),
            )),
        );
        let (mut session, sink) = session_over(root);

        session.open().await;
        assert_eq!(sink.last_text().as_deref(), Some("30.0% complete (busy)"));
    }

    #[tokio::test]
    async fn broken_tree_degrades_to_inline_error() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = ProgressSession::new(
            Arc::new(BrokenTree),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::default(),
        );

        session.open().await;

        assert!(session.is_open());
        let last = sink.last_text().unwrap();
        assert!(last.starts_with("Error reading progress:"), "got: {last}");

        // The loop survives: a later refresh still writes to the display.
        session.refresh_once().await;
        assert!(sink.text_count() >= 3);
    }

    #[tokio::test]
    async fn close_clears_pins_and_further_refreshes_are_noops() {
        let root = Arc::new(FixtureNode::new().with_child(bar("copy", 40.0)));
        let (mut session, sink) = session_over(root);

        session.open().await;
        session.close().await;

        assert!(!session.is_open());
        assert_eq!(session.pinned_count(), 0);
        let after_close = sink.text_count();
        session.refresh_once().await;
        assert_eq!(sink.text_count(), after_close);
        assert!(sink
            .announcements()
            .contains(&"Progress display closed".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_refreshes_and_close_stops_them() {
        let root = Arc::new(FixtureNode::new().with_child(bar("copy", 40.0)));
        let sink = Arc::new(RecordingSink::default());
        let session = ProgressSession::new(
            Arc::new(FixtureTree::new(root)),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::new(Duration::from_secs(2)),
        );

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx));

        tx.send(SessionCommand::Toggle).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        let after_open = sink.text_count();
        assert!(after_open >= 2, "placeholder plus first refresh expected");

        time::sleep(Duration::from_secs(5)).await;
        assert!(sink.text_count() > after_open, "timer ticks should refresh");

        tx.send(SessionCommand::Toggle).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        let after_close = sink.text_count();

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.text_count(), after_close, "no ticks after close");

        tx.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_restarts_timer_and_keeps_text() {
        let root = Arc::new(FixtureNode::new().with_child(bar("copy", 40.0)));
        let sink = Arc::new(RecordingSink::default());
        let session = ProgressSession::new(
            Arc::new(FixtureTree::new(root)),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::new(Duration::from_secs(120)),
        );

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx));

        tx.send(SessionCommand::Toggle).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        let after_open = sink.text_count();
        let shown = sink.last_text();

        tx.send(SessionCommand::ApplyInterval(Duration::from_secs(1)))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(100)).await;
        // Applying an interval does not touch the displayed text.
        assert_eq!(sink.text_count(), after_open);
        assert_eq!(sink.last_text(), shown);

        // The re-armed one-second timer ticks long before the original
        // two-minute period would have.
        time::sleep(Duration::from_secs(3)).await;
        assert!(sink.text_count() > after_open);

        tx.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn externally_closed_display_stops_the_session() {
        let root = Arc::new(FixtureNode::new().with_child(bar("copy", 40.0)));
        let sink = Arc::new(RecordingSink::default());
        let session = ProgressSession::new(
            Arc::new(FixtureTree::new(root)),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
            SessionConfig::new(Duration::from_secs(1)),
        );

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx));

        tx.send(SessionCommand::Toggle).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;

        sink.close_externally();
        time::sleep(Duration::from_secs(3)).await;
        let after_close = sink.text_count();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.text_count(), after_close);
        assert!(sink
            .announcements()
            .contains(&"Progress display closed".to_string()));

        tx.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }
}
