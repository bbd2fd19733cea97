//! Record save lifecycle
//!
//! A save runs the before-update hook, the primary row write, and the after
//! hook, in that order. Which after hook the LOB flush is attached to depends
//! on the host framework version; the pairing is chosen once, when the
//! [`SavePipeline`] is built, rather than on every save.
//!
//! Each save walks a fresh state machine:
//!
//! ```text
//! NotStarted -> LobsCaptured -> PrimaryWriteDone -> LobsFlushed
//!                                                 \-> Skipped
//! ```
//!
//! Inserts have no before-update phase and go straight from `NotStarted` to
//! `PrimaryWriteDone`. Every save that reaches `PrimaryWriteDone` goes on to
//! a terminal state: under the after-update pairing the after hook never sees
//! inserts, so the insert path carries their LOB write itself.

use std::fmt;

use crate::adapter::ConnectionAdapter;
use crate::config::HostVersion;
use crate::error::Result;
use crate::lob_writeback::{capture_changed_lobs, flush_changed_lobs, LobFlush};
use crate::record::Record;
use crate::schema_cache::SchemaCatalog;

/// Kind of primary write a save performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// INSERT of a new record
    Insert,
    /// UPDATE of a persisted record
    Update,
}

/// Host hook the LOB flush is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterHook {
    /// Fires after updates only
    AfterUpdate,
    /// Fires after inserts and updates
    AfterSave,
}

/// Hook pairing used by a [`SavePipeline`]
///
/// The changed-LOB capture is always attached to the before-update hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookStrategy {
    after: AfterHook,
}

impl HookStrategy {
    /// Pick the hook pairing for a host framework version
    ///
    /// Hosts 3.1 and later in the 3.x series flush after updates; every other
    /// version flushes after saves.
    pub fn for_version(version: HostVersion) -> Self {
        let after = if version.major == 3 && version.minor >= 1 {
            AfterHook::AfterUpdate
        } else {
            AfterHook::AfterSave
        };
        Self { after }
    }

    /// The after hook carrying the flush
    pub fn after_hook(&self) -> AfterHook {
        self.after
    }

    /// Check if the before-update capture runs for this kind of write
    pub fn captures_before(&self, kind: WriteKind) -> bool {
        kind == WriteKind::Update
    }

    /// Check if the after hook fires for this kind of write
    pub fn flushes_after(&self, kind: WriteKind) -> bool {
        match self.after {
            AfterHook::AfterSave => true,
            AfterHook::AfterUpdate => kind == WriteKind::Update,
        }
    }

    /// Check if the insert path writes the LOBs of this kind of write
    ///
    /// True exactly when the after hook does not fire for an insert.
    pub fn flushes_on_insert_path(&self, kind: WriteKind) -> bool {
        kind == WriteKind::Insert && !self.flushes_after(kind)
    }
}

/// Progress of one save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing has run yet
    NotStarted,
    /// Changed LOB columns were snapshotted
    LobsCaptured,
    /// The row write completed
    PrimaryWriteDone,
    /// LOB content was handed to the adapter
    LobsFlushed,
    /// The flush was skipped (custom path or emulation adapter)
    Skipped,
}

impl SaveState {
    /// Check if a transition to `next` is allowed
    pub fn can_transition_to(self, next: SaveState) -> bool {
        use SaveState::*;
        matches!(
            (self, next),
            (NotStarted, LobsCaptured)
                | (NotStarted, PrimaryWriteDone)
                | (LobsCaptured, PrimaryWriteDone)
                | (PrimaryWriteDone, LobsFlushed)
                | (PrimaryWriteDone, Skipped)
        )
    }

    /// Check if no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, SaveState::LobsFlushed | SaveState::Skipped)
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveState::NotStarted => "not started",
            SaveState::LobsCaptured => "LOBs captured",
            SaveState::PrimaryWriteDone => "primary write done",
            SaveState::LobsFlushed => "LOBs flushed",
            SaveState::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// What a save did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Kind of primary write
    pub kind: WriteKind,
    /// State the save ended in
    pub state: SaveState,
    /// Rows written by the primary write
    pub rows_affected: u64,
    /// LOB columns handed to the adapter
    pub flushed_columns: Vec<String>,
}

struct SaveCycle {
    state: SaveState,
}

impl SaveCycle {
    fn new() -> Self {
        Self {
            state: SaveState::NotStarted,
        }
    }

    fn advance(&mut self, next: SaveState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid save transition: {} -> {}",
            self.state,
            next
        );
        tracing::trace!(from = %self.state, to = %next, "Save state transition");
        self.state = next;
    }
}

/// Runs record saves against an adapter and a schema catalog
pub struct SavePipeline<'a, A, C> {
    adapter: &'a A,
    catalog: &'a C,
    strategy: HookStrategy,
}

impl<'a, A, C> SavePipeline<'a, A, C>
where
    A: ConnectionAdapter,
    C: SchemaCatalog,
{
    /// Create a pipeline with the hook pairing for a host version
    pub fn new(adapter: &'a A, catalog: &'a C, host_version: HostVersion) -> Self {
        Self::with_strategy(adapter, catalog, HookStrategy::for_version(host_version))
    }

    /// Create a pipeline with an explicit hook pairing
    pub fn with_strategy(adapter: &'a A, catalog: &'a C, strategy: HookStrategy) -> Self {
        tracing::debug!(after_hook = ?strategy.after_hook(), "Save hooks wired");
        Self {
            adapter,
            catalog,
            strategy,
        }
    }

    /// The hook pairing in use
    pub fn strategy(&self) -> HookStrategy {
        self.strategy
    }

    /// Save a record: insert when new, update otherwise
    ///
    /// Fails with a configuration error, before anything is written, when
    /// the catalog has no usable schema for the record's table. A failure of
    /// the LOB flush is returned after the row write has already happened.
    pub async fn save(&self, record: &mut Record) -> Result<SaveOutcome> {
        let schema = self.catalog.schema(record.table_name())?;
        let kind = if record.is_new_record() {
            WriteKind::Insert
        } else {
            WriteKind::Update
        };
        let mut cycle = SaveCycle::new();

        // a snapshot left by an earlier failed save belongs to that save
        record.take_changed_lob_columns();

        if self.strategy.captures_before(kind) {
            capture_changed_lobs(&schema, record);
            cycle.advance(SaveState::LobsCaptured);
        }

        let rows_affected = match kind {
            WriteKind::Insert => self.adapter.insert_row(&schema, record).await?,
            WriteKind::Update => self.adapter.update_row(&schema, record).await?,
        };
        record.changes_applied();
        cycle.advance(SaveState::PrimaryWriteDone);
        tracing::debug!(
            table = schema.table_name(),
            kind = ?kind,
            rows = rows_affected,
            "Primary write done"
        );

        if self.strategy.flushes_on_insert_path(kind) {
            tracing::debug!(table = schema.table_name(), "Writing insert LOBs on the insert path");
        }
        let flushed_columns = match flush_changed_lobs(self.adapter, &schema, record).await? {
            LobFlush::Written(columns) => {
                cycle.advance(SaveState::LobsFlushed);
                columns
            }
            LobFlush::Skipped(_) => {
                cycle.advance(SaveState::Skipped);
                Vec::new()
            }
        };

        Ok(SaveOutcome {
            kind,
            state: cycle.state,
            rows_affected,
            flushed_columns,
        })
    }
}
