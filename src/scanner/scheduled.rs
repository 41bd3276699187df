use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Declaration;

/// One handler registered with the periodic-task registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledHandler {
    pub frequency: String,
    pub path: String,
}

impl ScheduledHandler {
    pub fn new(frequency: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            frequency: frequency.into(),
            path: path.into(),
        }
    }
}

/// External periodic-task registry, consumed only to build scheduled
/// catalog entries.
pub trait ScheduledTaskRegistry: Send + Sync {
    fn scheduled_handlers(&self, target: &str) -> Vec<ScheduledHandler>;
}

/// Registry with no scheduled work.
pub struct NoScheduledTasks;

impl ScheduledTaskRegistry for NoScheduledTasks {
    fn scheduled_handlers(&self, _target: &str) -> Vec<ScheduledHandler> {
        Vec::new()
    }
}

/// Fixed registry, built from the `[scheduled]` config table or by hand
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticScheduledRegistry {
    handlers: HashMap<String, Vec<ScheduledHandler>>,
}

impl StaticScheduledRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// From the config-file shape: target → frequency → handler paths.
    pub fn from_config(table: &HashMap<String, HashMap<String, Vec<String>>>) -> Self {
        let mut handlers: HashMap<String, Vec<ScheduledHandler>> = HashMap::new();
        for (target, frequencies) in table {
            let entry = handlers.entry(target.clone()).or_default();
            for (frequency, paths) in frequencies {
                for path in paths {
                    entry.push(ScheduledHandler::new(frequency.clone(), path.clone()));
                }
            }
        }
        Self { handlers }
    }

    pub fn add(&mut self, target: impl Into<String>, handler: ScheduledHandler) {
        self.handlers.entry(target.into()).or_default().push(handler);
    }
}

impl ScheduledTaskRegistry for StaticScheduledRegistry {
    fn scheduled_handlers(&self, target: &str) -> Vec<ScheduledHandler> {
        self.handlers.get(target).cloned().unwrap_or_default()
    }
}

/// Builds scheduled catalog entries from registry handlers: the name is
/// the last path segment, parameters are empty, and the frequency label
/// rides along in place of a signature.
pub fn scheduled_declarations(handlers: &[ScheduledHandler], max: usize) -> Vec<Declaration> {
    handlers
        .iter()
        .take(max)
        .map(|handler| {
            let name = handler
                .path
                .rsplit('.')
                .next()
                .unwrap_or(handler.path.as_str());
            Declaration::new(name, handler.path.clone())
                .with_docstring(format!("Scheduled task: {}", handler.frequency))
                .with_frequency(handler.frequency.clone())
        })
        .collect()
}
