//! Fixture source serving the checked-in sample telegram.

use p1_common::sample_lines;

use super::SourceError;

/// Serves the sample telegram on every read. Used by `--mock` runs and
/// by tests; can be scripted to fail its first reads.
#[derive(Debug, Default)]
pub struct MockSource {
    fail_reads: u32,
    reads: u32,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose first `n` reads fail with an I/O error, then serve
    /// the sample normally.
    pub fn failing_first(n: u32) -> Self {
        Self {
            fail_reads: n,
            reads: 0,
        }
    }

    /// A mock that never delivers a telegram.
    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    /// Reads attempted so far, successful or not.
    pub fn reads(&self) -> u32 {
        self.reads
    }

    pub async fn read_lines(&mut self) -> Result<Vec<String>, SourceError> {
        self.reads += 1;
        if self.reads <= self.fail_reads {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted mock failure",
            )));
        }
        Ok(sample_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_sample_telegram() {
        let mut source = MockSource::new();
        let lines = source.read_lines().await.unwrap();
        assert!(lines[0].starts_with('/'));
        assert!(lines.last().unwrap().starts_with('!'));
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_failing_first_recovers() {
        let mut source = MockSource::failing_first(2);
        assert!(source.read_lines().await.is_err());
        assert!(source.read_lines().await.is_err());
        assert!(source.read_lines().await.is_ok());
        assert_eq!(source.reads(), 3);
    }
}
