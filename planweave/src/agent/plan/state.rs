//! Plan agent state: subtask queue, result store, lifecycle history.
//!
//! Every step takes `&PlanState` and returns a new `PlanState`; nothing here is
//! shared between runs.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::transition::LoopPhase;

/// Default cap on refine cycles.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Opaque per-run subtask identifier, assigned in generation order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(u64);

impl SubtaskId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of work produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub text: String,
}

impl Subtask {
    pub fn new(id: SubtaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// FIFO of pending subtasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskQueue {
    items: VecDeque<Subtask>,
}

impl SubtaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, subtask: Subtask) {
        self.items.push_back(subtask);
    }

    pub fn front(&self) -> Option<&Subtask> {
        self.items.front()
    }

    pub fn pop_front(&mut self) -> Option<Subtask> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subtask> {
        self.items.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|s| s.text.as_str()).collect()
    }
}

impl Extend<Subtask> for SubtaskQueue {
    fn extend<T: IntoIterator<Item = Subtask>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl FromIterator<Subtask> for SubtaskQueue {
    fn from_iter<T: IntoIterator<Item = Subtask>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A solved subtask and the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedSubtask {
    pub subtask: Subtask,
    pub result: String,
}

/// Results keyed by subtask text, in first-solve order.
///
/// Recording a text that is already present replaces its result (and id) in
/// place, so each text appears once and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultStore {
    entries: Vec<SolvedSubtask>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, subtask: Subtask, result: impl Into<String>) {
        let result = result.into();
        match self
            .entries
            .iter_mut()
            .find(|e| e.subtask.text == subtask.text)
        {
            Some(entry) => {
                entry.subtask = subtask;
                entry.result = result;
            }
            None => self.entries.push(SolvedSubtask { subtask, result }),
        }
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.subtask.text == text)
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.subtask.text == text)
            .map(|e| e.result.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SolvedSubtask> {
        self.entries.iter()
    }

    /// Subtask texts in solve order.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.subtask.text.as_str()).collect()
    }
}

/// What happened to subtasks during one iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub generated: Vec<Subtask>,
    pub solved: Vec<Subtask>,
    pub refined: Vec<Subtask>,
}

impl IterationRecord {
    pub fn opened_with(generated: Vec<Subtask>) -> Self {
        Self {
            generated,
            ..Self::default()
        }
    }
}

/// Append-only list of iteration records; the last one is the open record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifecycleHistory {
    records: Vec<IterationRecord>,
}

impl LifecycleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new record; it becomes the target of later solve/refine updates.
    pub fn open(&mut self, generated: Vec<Subtask>) {
        self.records.push(IterationRecord::opened_with(generated));
    }

    /// The open record, opening an empty one first when the history is empty.
    pub fn open_record_mut(&mut self) -> &mut IterationRecord {
        if self.records.is_empty() {
            self.records.push(IterationRecord::default());
        }
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    pub fn open_record(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// State of one plan → solve → refine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    pub query: String,
    pub queue: SubtaskQueue,
    pub results: ResultStore,
    pub history: LifecycleHistory,
    /// Number of non-no-op refine steps so far.
    pub iteration_count: u32,
    pub max_iterations: u32,
    /// Last subtask handed to the model by the solve step.
    pub current_subtask: Option<Subtask>,
    pub final_result: Option<String>,
    pub phase: LoopPhase,
    next_id: u64,
}

impl PlanState {
    /// Fresh state for `query`, in the `Planning` phase.
    pub fn new(query: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            query: query.into(),
            queue: SubtaskQueue::new(),
            results: ResultStore::new(),
            history: LifecycleHistory::new(),
            iteration_count: 0,
            max_iterations,
            current_subtask: None,
            final_result: None,
            phase: LoopPhase::Planning,
            next_id: 1,
        }
    }

    /// Wraps each text in a `Subtask` with the next free ids.
    pub fn allocate_subtasks<I, T>(&mut self, texts: I) -> Vec<Subtask>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        texts
            .into_iter()
            .map(|text| {
                let id = SubtaskId::new(self.next_id);
                self.next_id += 1;
                Subtask::new(id, text)
            })
            .collect()
    }

    /// Iteration cap reached; no further refine cycles.
    pub fn iterations_exhausted(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }
}
