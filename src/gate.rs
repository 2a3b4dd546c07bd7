//! Asset readiness bookkeeping.
//!
//! The browser layer joins the underlying promises; this tracks which named
//! signals have settled so progress can be logged and the join checked.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    Font(String),
    Images(usize),
    Overlay(String),
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Font(family) => write!(f, "font {family:?}"),
            Signal::Images(count) => write!(f, "{count} images"),
            Signal::Overlay(url) => write!(f, "overlay texture {url}"),
        }
    }
}

/// How the join over every signal ended.
#[derive(Debug)]
pub enum Join {
    Ready,
    TimedOut { after_ms: u32 },
    Failed(anyhow::Error),
}

impl Join {
    /// Whether some signal sources may still settle after this outcome.
    /// Their callbacks must then stay alive.
    pub fn leaves_pending(&self) -> bool {
        !matches!(self, Join::Ready)
    }
}

/// All-or-nothing barrier over a fixed set of signals.
#[derive(Clone, Debug, Default)]
pub struct ReadinessGate {
    signals: Vec<(Signal, bool)>,
}

impl ReadinessGate {
    pub fn new(signals: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            signals: signals.into_iter().map(|s| (s, false)).collect(),
        }
    }

    /// Mark signal `index` as settled. Returns false if it already was.
    pub fn settle(&mut self, index: usize) -> bool {
        match self.signals.get_mut(index) {
            Some((_, done)) if !*done => *done = true,
            _ => return false,
        }
        log::debug!(
            "asset gate: {} ready ({}/{})",
            self.signals[index].0,
            self.settled(),
            self.len()
        );
        true
    }

    pub fn settled(&self) -> usize {
        self.signals.iter().filter(|(_, done)| *done).count()
    }

    fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_open(&self) -> bool {
        self.signals.iter().all(|(_, done)| *done)
    }

    pub fn pending(&self) -> Vec<&Signal> {
        self.signals.iter().filter(|(_, done)| !*done).map(|(s, _)| s).collect()
    }

    /// Turn the join outcome into the gate's final verdict.
    pub fn conclude(&self, join: Join) -> anyhow::Result<()> {
        match join {
            Join::Ready => {
                debug_assert!(self.is_open());
                Ok(())
            }
            Join::TimedOut { after_ms } => {
                let waiting: Vec<String> = self.pending().iter().map(|s| s.to_string()).collect();
                anyhow::bail!(
                    "assets not ready after {after_ms} ms, still waiting on {}",
                    waiting.join(", ")
                )
            }
            Join::Failed(e) => {
                Err(e.context(format!("{} of {} asset signals settled", self.settled(), self.len())))
            }
        }
    }
}
