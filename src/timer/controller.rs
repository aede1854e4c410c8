use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::{audio::Chime, dom::Document, log_debug, log_info};

use super::{PomodoroConfig, PomodoroState, TickOutcome};

const ENABLE_LOGS: bool = false;

/// Node the countdown text is written into.
pub const TIMER_ID: &str = "lumen-pomodoro-timer";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSnapshot {
    pub state: PomodoroState,
    pub display: String,
}

/// Owns the one-second ticker of the active focus session.
///
/// At most one ticker exists at a time: `start` aborts whatever was running
/// before spawning, and `cancel` aborts and releases the handle.
#[derive(Clone)]
pub struct PomodoroTimer {
    state: Arc<Mutex<Option<PomodoroState>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    doc: Arc<Mutex<Document>>,
    chime: Arc<dyn Chime>,
    tick_interval: Duration,
}

impl PomodoroTimer {
    pub fn new(doc: Arc<Mutex<Document>>, chime: Arc<dyn Chime>) -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
            ticker: Arc::new(Mutex::new(None)),
            doc,
            chime,
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn start(&self, config: PomodoroConfig) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            log_debug!("Replacing running Pomodoro ticker");
            handle.abort();
        }

        *self.state.lock().await = Some(PomodoroState::new(config));
        log_info!(
            "Pomodoro started: {}m work / {}m break",
            config.work_minutes,
            config.break_minutes
        );

        let state = self.state.clone();
        let doc = self.doc.clone();
        let chime = self.chime.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            // The first interval tick completes immediately, which renders the
            // full duration before any second is counted.
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;

                let (outcome, display) = {
                    let mut guard = state.lock().await;
                    let Some(pomodoro) = guard.as_mut() else {
                        break;
                    };
                    (pomodoro.tick(), pomodoro.display())
                };

                {
                    let mut doc = doc.lock().await;
                    if let Some(node) = doc.get_element_by_id_mut(TIMER_ID) {
                        node.text = display;
                    }
                }

                if let TickOutcome::PhaseChanged(phase) = outcome {
                    log_debug!("Pomodoro switched to {:?}", phase);
                    chime.play();
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    pub async fn cancel(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        *self.state.lock().await = None;
    }

    pub async fn snapshot(&self) -> Option<PomodoroSnapshot> {
        self.state.lock().await.as_ref().map(|state| PomodoroSnapshot {
            display: state.display(),
            state: state.clone(),
        })
    }

    /// Number of live ticker tasks owned by this timer (zero or one).
    pub async fn active_tickers(&self) -> usize {
        self.ticker
            .lock()
            .await
            .as_ref()
            .map_or(0, |handle| usize::from(!handle.is_finished()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{audio::SilentChime, dom::Element, timer::Phase};

    fn page_with_timer_node() -> Arc<Mutex<Document>> {
        let body = Element::new("body").with_child(Element::new("div").with_id(TIMER_ID));
        Arc::new(Mutex::new(Document::new(body)))
    }

    async fn timer_text(doc: &Arc<Mutex<Document>>) -> String {
        doc.lock()
            .await
            .get_element_by_id(TIMER_ID)
            .map(|el| el.text.clone())
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn renders_then_counts_down() {
        let doc = page_with_timer_node();
        let timer = PomodoroTimer::new(doc.clone(), Arc::new(SilentChime::new()));

        timer.start(PomodoroConfig::default()).await;
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(timer_text(&doc).await, "Work: 25:00");

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(timer_text(&doc).await, "Work: 24:59");
    }

    #[tokio::test(start_paused = true)]
    async fn chimes_on_phase_change() {
        let doc = page_with_timer_node();
        let chime = SilentChime::new();
        let timer = PomodoroTimer::new(doc.clone(), Arc::new(chime.clone()));

        timer
            .start(PomodoroConfig {
                work_minutes: 1,
                break_minutes: 1,
            })
            .await;
        time::sleep(Duration::from_millis(60_500)).await;

        assert_eq!(chime.played(), 1);
        let snapshot = timer.snapshot().await.unwrap();
        assert_eq!(snapshot.state.phase, Phase::Break);
        assert_eq!(timer_text(&doc).await, "Break: 1:00");
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_previous_ticker() {
        let doc = page_with_timer_node();
        let timer = PomodoroTimer::new(doc.clone(), Arc::new(SilentChime::new()));

        timer.start(PomodoroConfig::default()).await;
        time::sleep(Duration::from_millis(2_500)).await;
        timer.start(PomodoroConfig::default()).await;
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(timer.active_tickers().await, 1);
        assert_eq!(timer_text(&doc).await, "Work: 25:00");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_ticker() {
        let doc = page_with_timer_node();
        let timer = PomodoroTimer::new(doc.clone(), Arc::new(SilentChime::new()));

        timer.start(PomodoroConfig::default()).await;
        time::sleep(Duration::from_millis(1_500)).await;
        timer.cancel().await;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(timer.active_tickers().await, 0);
        assert!(timer.snapshot().await.is_none());
        assert_eq!(timer_text(&doc).await, "Work: 24:59");
    }
}
