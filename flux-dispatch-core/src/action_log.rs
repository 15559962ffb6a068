//! Action logging with pattern-based filtering and in-memory storage
//!
//! [`ActionLoggerMiddleware`] sits on a [`Dispatcher`](crate::Dispatcher)
//! and reports every delivered action through `tracing`. With a log
//! attached it also keeps the latest actions in a ring buffer, shared
//! through [`SharedActionLog`] so a view can show them while the
//! dispatcher owns the middleware.
//!
//! # Example
//!
//! ```ignore
//! use flux_dispatch_core::{ActionLogConfig, ActionLoggerMiddleware, Dispatcher};
//!
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::with_capacity(20));
//! let log = middleware.shared_log().expect("log attached");
//! let dispatcher = Dispatcher::with_middleware(middleware);
//!
//! for entry in log.borrow().recent(5) {
//!     println!("#{} {}", entry.sequence, entry.summary);
//! }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use crate::action::ActionSummary;
use crate::middleware::Middleware;

/// Which action names get logged.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `Images*` matches ImagesLoad, ImagesDidLoad, ...
/// - `*Did*` matches every completion action
/// - `*Fail` matches ImagesDidFail
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Create a config from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use flux_dispatch_core::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("Images*"), Some("*Fail"));
    /// assert!(config.should_log("ImagesLoad"));
    /// assert!(!config.should_log("ImagesDidFail"));
    /// assert!(!config.should_log("Quit"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Create a config with specific pattern vectors
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check an action name against the include and exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action name (from Action::name())
    pub name: &'static str,
    /// Summary representation (from ActionSummary::summary())
    pub summary: String,
    /// When the action reached the dispatcher
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Callbacks that saw the action, filled in once delivery finished
    pub callbacks: Option<usize>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, summary: String, sequence: u64) -> Self {
        Self {
            name,
            summary,
            timestamp: Instant::now(),
            sequence,
            callbacks: None,
        }
    }

    /// Format the elapsed time for display (e.g., "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.timestamp.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Configuration for the action log ring buffer
#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// In-memory ring buffer of recent actions
///
/// Older entries are discarded once capacity is reached.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

/// Action log shared between the middleware and whoever displays it
pub type SharedActionLog = Rc<RefCell<ActionLog>>;

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Log an action (if it passes the filter)
    ///
    /// Returns the entry if it was logged, None if filtered out.
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if !self.config.filter.should_log(name) || self.config.capacity == 0 {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Record how many callbacks saw the newest entry
    pub fn update_last_callbacks(&mut self, callbacks: usize) {
        if let Some(entry) = self.entries.back_mut() {
            entry.callbacks = Some(callbacks);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The most recent `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

/// Middleware that logs actions with configurable pattern filtering.
///
/// Supports two modes:
/// - **Tracing only** (default): logs via `tracing::debug!()`
/// - **With storage**: also keeps a [`SharedActionLog`] ring buffer
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<SharedActionLog>,
    /// Whether the current action made it into the log
    last_action_logged: bool,
    active: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
            active: true,
        }
    }

    /// Tracing plus an in-memory log using the same filter
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(Rc::new(RefCell::new(ActionLog::new(config)))),
            last_action_logged: false,
            active: true,
        }
    }

    /// Log everything, tracing only
    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::default())
    }

    /// Turn the middleware on or off.
    ///
    /// ```ignore
    /// let middleware = ActionLoggerMiddleware::log_all().active(args.debug_actions);
    /// ```
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle to the in-memory log, if storage is enabled
    pub fn shared_log(&self) -> Option<SharedActionLog> {
        self.log.clone()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, summary = %action.summary(), "action");
        }

        self.last_action_logged = false;
        if let Some(log) = &self.log {
            // A listener may be reading the log while it renders
            if let Ok(mut log) = log.try_borrow_mut() {
                self.last_action_logged = log.log(action).is_some();
            }
        }
    }

    fn after(&mut self, _action: &A, invoked: usize) {
        if !self.active || !self.last_action_logged {
            return;
        }

        if let Some(log) = &self.log {
            if let Ok(mut log) = log.try_borrow_mut() {
                log.update_last_callbacks(invoked);
            }
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(spi) = star_pi {
            // Backtrack: let the last star swallow one more character
            pi = spi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
