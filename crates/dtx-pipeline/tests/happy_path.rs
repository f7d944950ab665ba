//! Integration tests for transactions that complete without failures.

use std::sync::{Arc, Mutex};

use dtx_pipeline::{
    Context, Handler, HandlerError, MemStore, Message, Pipeline, Store, Task, TxState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BookRoom {
    hotel: String,
    nights: u32,
}

impl Message for BookRoom {
    const TYPE_NAME: &'static str = "travel.BookRoom";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CancelRoom {
    hotel: String,
}

impl Message for CancelRoom {
    const TYPE_NAME: &'static str = "travel.CancelRoom";
}

#[derive(Default)]
struct Journal {
    calls: Mutex<Vec<String>>,
}

struct Booking {
    journal: Arc<Journal>,
}

impl Handler for Booking {
    fn commit(&self, ctx: &Context) -> Result<(), HandlerError> {
        let booking = ctx.payload::<BookRoom>().ok_or("missing BookRoom payload")?;
        self.journal
            .calls
            .lock()
            .expect("journal lock")
            .push(format!("book {} x{}", booking.hotel, booking.nights));
        Ok(())
    }

    fn rollback(&self, ctx: &Context) -> Result<(), HandlerError> {
        let cancel = ctx.payload::<CancelRoom>().ok_or("missing CancelRoom payload")?;
        self.journal
            .calls
            .lock()
            .expect("journal lock")
            .push(format!("cancel {}", cancel.hotel));
        Ok(())
    }
}

fn booking(id: &str, hotel: &str, journal: &Arc<Journal>) -> Task {
    Task::new(
        id,
        BookRoom {
            hotel: hotel.to_string(),
            nights: 2,
        },
        CancelRoom {
            hotel: hotel.to_string(),
        },
        Booking {
            journal: Arc::clone(journal),
        },
    )
}

#[test]
fn completed_transaction_records_begin_commits_end() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::new());
    let journal = Arc::new(Journal::default());
    let mut pipeline = Pipeline::new("trip-1", store.clone());

    pipeline
        .begin()?
        .exec(booking("step-a", "Alpine", &journal))?
        .exec(booking("step-b", "Harbour", &journal))?
        .end()?;

    let history = store.load("trip-1")?;
    let summary: Vec<(TxState, &str)> = history
        .iter()
        .map(|e| (e.state, e.task.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (TxState::Begin, ""),
            (TxState::Commit, "step-a"),
            (TxState::Commit, "step-b"),
            (TxState::End, ""),
        ]
    );
    assert!(history.iter().all(|e| e.error_message.is_empty()));
    Ok(())
}

#[test]
fn handlers_see_commit_payloads_in_order() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::new());
    let journal = Arc::new(Journal::default());
    let mut pipeline = Pipeline::new("trip-2", store);

    pipeline
        .begin()?
        .exec(booking("step-a", "Alpine", &journal))?
        .exec(booking("step-b", "Harbour", &journal))?
        .end()?;

    let calls = journal.calls.lock().expect("journal lock");
    assert_eq!(*calls, vec!["book Alpine x2", "book Harbour x2"]);
    Ok(())
}

#[test]
fn commit_entries_carry_type_tag_and_payload() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::new());
    let journal = Arc::new(Journal::default());
    let mut pipeline = Pipeline::new("trip-3", store.clone());

    pipeline
        .begin()?
        .exec(booking("step-a", "Alpine", &journal))?
        .end()?;

    let history = store.load("trip-3")?;
    let commit = &history[1];
    assert_eq!(commit.type_name, BookRoom::TYPE_NAME);
    assert_eq!(
        commit.decode_payload::<BookRoom>(pipeline.options().codec())?,
        BookRoom {
            hotel: "Alpine".to_string(),
            nights: 2,
        }
    );
    assert!(!history[0].has_payload());
    assert!(!history[2].has_payload());
    Ok(())
}

#[test]
fn pipelines_sharing_a_store_keep_separate_histories() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::new());
    let journal = Arc::new(Journal::default());
    let mut first = Pipeline::new("trip-a", store.clone());
    let mut second = Pipeline::new("trip-b", store.clone());

    first.begin()?;
    second.begin()?;
    first.exec(booking("step-a", "Alpine", &journal))?;
    second.exec(booking("step-a", "Harbour", &journal))?;
    first.end()?;
    second.end()?;

    assert_eq!(store.load("trip-a")?.len(), 3);
    assert_eq!(store.load("trip-b")?.len(), 3);
    assert_eq!(store.list_ids()?, vec!["trip-a", "trip-b"]);
    Ok(())
}

#[test]
fn pipeline_can_run_a_second_sequence_after_end() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::new());
    let journal = Arc::new(Journal::default());
    let mut pipeline = Pipeline::new("trip-4", store.clone());

    pipeline
        .begin()?
        .exec(booking("step-a", "Alpine", &journal))?
        .end()?;
    pipeline
        .begin()?
        .exec(booking("step-b", "Harbour", &journal))?
        .end()?;

    let states: Vec<TxState> = store.load("trip-4")?.iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![
            TxState::Begin,
            TxState::Commit,
            TxState::End,
            TxState::Begin,
            TxState::Commit,
            TxState::End,
        ]
    );
    assert_eq!(pipeline.history()?.len(), 6);
    Ok(())
}
