//! Progress reporting for long-running dataset operations.
//!
//! Library code stays silent by default; callers that want feedback hand
//! a callback to the workflow functions and render the events however
//! they like (the bundled CLI draws indicatif bars from them).

#[derive(Debug, Clone)]
pub enum Progress {
    /// A named stage begins, duration unknown.
    StageStart { name: &'static str },
    StageFinish,

    /// A counted loop over items begins.
    ItemsStart { total: u64 },
    ItemsAdvance,
    ItemsFinish,

    /// Free-form status line.
    Note(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
