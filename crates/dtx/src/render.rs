use std::fmt::Write as _;

use dtx_core::{Codec, TxLog};

/// One display line for a log entry.
pub(crate) fn entry_line(entry: &TxLog, codec: Codec) -> String {
    let mut line = format!("{:>12}  {:<8}", entry.timestamp, entry.state);
    if !entry.task.is_empty() {
        let _ = write!(line, "  {}", entry.task);
    }
    if entry.has_payload() {
        let _ = write!(line, "  {} {}", entry.type_name, payload(entry, codec));
    }
    if !entry.error_message.is_empty() {
        let _ = write!(line, "  error: {}", entry.error_message);
    }
    line
}

fn payload(entry: &TxLog, codec: Codec) -> String {
    match codec {
        Codec::Json => match std::str::from_utf8(&entry.data) {
            Ok(text) => text.to_string(),
            Err(_) => byte_count(entry),
        },
        Codec::Binary => byte_count(entry),
    }
}

fn byte_count(entry: &TxLog) -> String {
    format!("<{} bytes>", entry.data.len())
}
