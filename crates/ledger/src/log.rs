use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::LedgerError;
use crate::types::Block;

/// Append-only JSON-lines file holding one block per line.
///
/// A failed append is truncated back to the last complete line. If that
/// truncation fails too, the log stops accepting appends so the file never
/// holds a block the in-memory chain does not.
#[derive(Debug)]
pub struct BlockLog {
    path: PathBuf,
    file: File,
    unusable: bool,
}

impl BlockLog {
    /// Open (creating if needed) the log at `path` and read back every block in it.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<Block>), LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut blocks = Vec::new();
        for line in BufReader::new(&file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let block = serde_json::from_str::<Block>(&line)
                .map_err(|e| LedgerError::Serialization(e.to_string()))?;
            blocks.push(block);
        }

        tracing::debug!(path = %path.display(), blocks = blocks.len(), "opened ledger log");
        Ok((
            Self {
                path,
                file,
                unusable: false,
            },
            blocks,
        ))
    }

    /// Write a block and flush it to disk.
    ///
    /// On error the file is left as it was before the call.
    pub fn append(&mut self, block: &Block) -> Result<(), LedgerError> {
        if self.unusable {
            return Err(LedgerError::LogUnavailable);
        }

        let mut line =
            serde_json::to_string(block).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        line.push('\n');

        let committed = self.file.metadata()?.len();
        if let Err(e) = self.write_line(line.as_bytes()) {
            tracing::warn!(error = %e, path = %self.path.display(), "ledger append failed; rolling back");
            if let Err(rollback) = self.truncate(committed) {
                tracing::error!(error = %rollback, path = %self.path.display(), "ledger log rollback failed");
                self.unusable = true;
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.sync_data()
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        self.file.set_len(len)?;
        self.file.sync_data()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::genesis_block;

    #[test]
    fn truncate_drops_a_partial_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ledger.jsonl");

        let (mut log, _) = BlockLog::open(&path).expect("open failed");
        log.append(&genesis_block(1000)).expect("append failed");
        let committed = log.file.metadata().expect("metadata").len();

        log.file.write_all(b"{\"index\":1,\"times").expect("write");
        log.truncate(committed).expect("truncate failed");
        drop(log);

        let (_, blocks) = BlockLog::open(&path).expect("reopen failed");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn unusable_log_refuses_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ledger.jsonl");

        let (mut log, _) = BlockLog::open(&path).expect("open failed");
        log.unusable = true;

        assert!(matches!(
            log.append(&genesis_block(1000)),
            Err(LedgerError::LogUnavailable)
        ));
        assert_eq!(fs::read_to_string(&path).expect("read log"), "");
    }
}
