//! Line input from stdin for the console loops.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Read stdin line by line on a background task.
///
/// The receiver yields `None` on EOF (Ctrl+D).
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}
