//! Registry of loaded modules.
//!
//! Candidates are validated when they are loaded: a module that does not describe
//! itself properly is left out with a debug message, and a module whose name is
//! already taken by another module of the same kind is left out with a warning.
//! Neither case is an error; the bot starts with whatever loaded.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::all::CreateCommand;
use tracing::Span;

use crate::module::{
    hash::calc_command_hash, Command, Manifest, MessageHandler, ModuleKind, Task,
};

/// A command that passed validation.
pub struct LoadedCommand {
    pub manifest: Manifest,
    pub definition: CreateCommand,
    pub command: Box<dyn Command>,
    pub span: Span,
}

/// A message handler that passed validation.
pub struct LoadedHandler {
    pub manifest: Manifest,
    pub handler: Box<dyn MessageHandler>,
    pub span: Span,
}

/// A task that passed validation.
pub struct LoadedTask {
    pub manifest: Manifest,
    /// Validated to be present at load time.
    pub interval: Duration,
    pub task: Box<dyn Task>,
    pub span: Span,
    pub run_state: TaskRunState,
}

/// Scheduling state of a loaded task.
#[derive(Debug, Default)]
pub struct TaskRunState {
    queued: AtomicBool,
    cycles: AtomicU64,
}

impl TaskRunState {
    /// Marks the task as queued.
    ///
    /// Returns `true` only for the first call, so that a task is scheduled once.
    pub fn mark_queued(&self) -> bool {
        !self.queued.swap(true, Ordering::SeqCst)
    }

    pub fn is_queued(&self) -> bool {
        self.queued.load(Ordering::SeqCst)
    }

    /// Returns the number of the cycle about to start and increments the counter.
    pub fn next_cycle(&self) -> u64 {
        self.cycles.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of cycles started so far.
    #[cfg(test)]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }
}

/// Number of loaded modules per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCounts {
    pub commands: usize,
    pub handlers: usize,
    pub tasks: usize,
}

/// All loaded modules, in load order.
#[derive(Default)]
pub struct ModuleRegistry {
    commands: Vec<Arc<LoadedCommand>>,
    handlers: Vec<Arc<LoadedHandler>>,
    tasks: Vec<Arc<LoadedTask>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all built-in modules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.load_commands(crate::commands::all());
        registry.load_handlers(crate::handlers::all());
        registry.load_tasks(crate::tasks::all());
        registry
    }

    /// Loads command candidates.
    ///
    /// # Arguments
    /// - `candidates` - Commands to validate and load, in order
    ///
    /// # Returns
    /// - `usize` - Number of commands actually loaded
    pub fn load_commands(&mut self, candidates: Vec<Box<dyn Command>>) -> usize {
        let mut names = self.command_names();
        let mut loaded = 0;

        for command in candidates {
            let Some(manifest) = validate(ModuleKind::Command, command.manifest(), &mut names)
            else {
                continue;
            };

            let definition = command.definition(&manifest);
            let span = module_span(ModuleKind::Command, &manifest.name);
            self.commands.push(Arc::new(LoadedCommand {
                manifest,
                definition,
                command,
                span,
            }));
            loaded += 1;
        }

        loaded
    }

    /// Loads message handler candidates.
    ///
    /// Handlers run in the order they are loaded.
    pub fn load_handlers(&mut self, candidates: Vec<Box<dyn MessageHandler>>) -> usize {
        let mut names: HashSet<String> = self
            .handlers
            .iter()
            .map(|handler| handler.manifest.name.clone())
            .collect();
        let mut loaded = 0;

        for handler in candidates {
            let Some(manifest) =
                validate(ModuleKind::MessageHandler, handler.manifest(), &mut names)
            else {
                continue;
            };

            let span = module_span(ModuleKind::MessageHandler, &manifest.name);
            self.handlers.push(Arc::new(LoadedHandler {
                manifest,
                handler,
                span,
            }));
            loaded += 1;
        }

        loaded
    }

    /// Loads task candidates. Tasks without an interval are skipped.
    pub fn load_tasks(&mut self, candidates: Vec<Box<dyn Task>>) -> usize {
        let mut names: HashSet<String> = self
            .tasks
            .iter()
            .map(|task| task.manifest.name.clone())
            .collect();
        let mut loaded = 0;

        for task in candidates {
            let Some(manifest) = validate(ModuleKind::Task, task.manifest(), &mut names) else {
                continue;
            };
            let Some(interval) = manifest.interval else {
                tracing::debug!("Skipping task {} without an interval", manifest.name);
                names.remove(&manifest.name);
                continue;
            };

            let span = module_span(ModuleKind::Task, &manifest.name);
            self.tasks.push(Arc::new(LoadedTask {
                manifest,
                interval,
                task,
                span,
                run_state: TaskRunState::default(),
            }));
            loaded += 1;
        }

        loaded
    }

    pub fn commands(&self) -> &[Arc<LoadedCommand>] {
        &self.commands
    }

    pub fn handlers(&self) -> &[Arc<LoadedHandler>] {
        &self.handlers
    }

    pub fn tasks(&self) -> &[Arc<LoadedTask>] {
        &self.tasks
    }

    /// Finds a command by exact name.
    pub fn find_command(&self, name: &str) -> Option<&Arc<LoadedCommand>> {
        self.commands
            .iter()
            .find(|command| command.manifest.name == name)
    }

    /// Command definitions in deployment order (by name).
    pub fn command_definitions(&self) -> Vec<CreateCommand> {
        let mut commands: Vec<&Arc<LoadedCommand>> = self.commands.iter().collect();
        commands.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
        commands
            .into_iter()
            .map(|command| command.definition.clone())
            .collect()
    }

    /// Hash of the current command set.
    pub fn command_hash(&self) -> Result<String, serde_json::Error> {
        calc_command_hash(&self.command_definitions())
    }

    pub fn counts(&self) -> ModuleCounts {
        ModuleCounts {
            commands: self.commands.len(),
            handlers: self.handlers.len(),
            tasks: self.tasks.len(),
        }
    }

    fn command_names(&self) -> HashSet<String> {
        self.commands
            .iter()
            .map(|command| command.manifest.name.clone())
            .collect()
    }
}

/// Checks a candidate's manifest and claims its name.
///
/// Returns the manifest if the candidate should be loaded.
fn validate(
    kind: ModuleKind,
    manifest: Option<Manifest>,
    names: &mut HashSet<String>,
) -> Option<Manifest> {
    let Some(manifest) = manifest else {
        tracing::debug!("Skipping {} module without a manifest", kind.label());
        return None;
    };

    if manifest.name.trim().is_empty() {
        tracing::debug!("Skipping {} module without a name", kind.label());
        return None;
    }

    if !names.insert(manifest.name.clone()) {
        tracing::warn!(
            "Skipping duplicate {} module {}",
            kind.label(),
            manifest.name
        );
        return None;
    }

    Some(manifest)
}

/// Creates the span every log line of a module is emitted in.
fn module_span(kind: ModuleKind, name: &str) -> Span {
    match kind {
        ModuleKind::Command => tracing::info_span!("cmd", name = %name),
        ModuleKind::MessageHandler => tracing::info_span!("msg", name = %name),
        ModuleKind::Task => tracing::info_span!("task", name = %name),
    }
}
