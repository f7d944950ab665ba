//! Integration tests for the `debug` option's transition events.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use dtx_pipeline::{
    Context, HandlerError, MemStore, Message, Options, Pipeline, Store, Task, handler_fn,
};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines_matching(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().expect("capture lock poisoned");
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("capture lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Parcel(u32);

impl Message for Parcel {
    const TYPE_NAME: &'static str = "test.Parcel";
}

fn ok_task(id: &str) -> Task {
    Task::new(
        id,
        Parcel(1),
        Parcel(0),
        handler_fn(|_ctx: &Context| Ok(()), |_ctx: &Context| Ok(())),
    )
}

fn failing_task(id: &str) -> Task {
    Task::new(
        id,
        Parcel(1),
        Parcel(0),
        handler_fn(
            |_ctx: &Context| -> Result<(), HandlerError> { Err("rejected".into()) },
            |_ctx: &Context| Ok(()),
        ),
    )
}

/// Runs `drive` against a fresh pipeline with a capturing subscriber installed.
fn capture(
    debug: bool,
    drive: impl FnOnce(&mut Pipeline) -> anyhow::Result<()>,
) -> anyhow::Result<(Captured, usize)> {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .finish();
    let store = Arc::new(MemStore::new());
    let mut pipeline = Pipeline::with_options(
        "tx",
        store.clone(),
        Options::new().with_debug(debug),
    );

    tracing::subscriber::with_default(subscriber, || drive(&mut pipeline))?;

    Ok((captured, store.load("tx")?.len()))
}

#[test]
fn debug_emits_one_event_per_persisted_entry() -> anyhow::Result<()> {
    let (captured, persisted) = capture(true, |pipeline| {
        pipeline.begin()?.exec(ok_task("a"))?.exec(ok_task("b"))?;
        pipeline.end()?;
        Ok(())
    })?;

    let lines = captured.lines_matching("transition recorded");
    assert_eq!(persisted, 4);
    assert_eq!(lines.len(), persisted);
    assert!(lines.iter().all(|line| line.contains("INFO dtx:")));
    assert!(lines[0].contains("state=BEGIN"));
    assert!(lines[3].contains("state=END"));
    Ok(())
}

#[test]
fn debug_covers_abort_and_rollback_entries() -> anyhow::Result<()> {
    let (captured, persisted) = capture(true, |pipeline| {
        pipeline.begin()?.exec(ok_task("a"))?.exec(failing_task("b"))?;
        Ok(())
    })?;

    let lines = captured.lines_matching("transition recorded");
    assert_eq!(persisted, 4);
    assert_eq!(lines.len(), persisted);
    assert!(lines[2].contains("state=ABOUT"));
    assert!(lines[2].contains("error=rejected"));
    assert!(lines[3].contains("state=ROLLBACK"));
    Ok(())
}

#[test]
fn no_transition_events_without_debug() -> anyhow::Result<()> {
    let (captured, persisted) = capture(false, |pipeline| {
        pipeline.begin()?.exec(ok_task("a"))?.exec(failing_task("b"))?;
        Ok(())
    })?;

    assert_eq!(persisted, 4);
    assert!(captured.lines_matching("transition recorded").is_empty());
    Ok(())
}
