use std::time::Duration;

/// Static description of a command, message handler or task.
///
/// The name identifies the module within its kind: commands are invoked by it,
/// and every log line emitted by the module carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    /// Time between the end of one task cycle and the start of the next. Required
    /// for tasks, ignored for other kinds.
    pub interval: Option<Duration>,
    /// Run the first task cycle as soon as the task is queued instead of after one
    /// interval.
    pub run_on_startup: bool,
}

impl Manifest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            interval: None,
            run_on_startup: false,
        }
    }

    /// Sets the task interval.
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Marks the task to run once immediately when queued.
    pub fn on_startup(mut self) -> Self {
        self.run_on_startup = true;
        self
    }
}

/// The three kinds of modules the registry knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Command,
    MessageHandler,
    Task,
}

impl ModuleKind {
    /// Short label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Command => "cmd",
            ModuleKind::MessageHandler => "msg",
            ModuleKind::Task => "task",
        }
    }
}
