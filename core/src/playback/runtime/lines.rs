use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::playback::constants::MAX_DIAGNOSTIC_LINE_BYTES;

/// 按 `\n` 或 `\r` 切分诊断输出。播放器常用 `\r` 覆盖同一行的状态信息。
///
/// `next_line` 可安全地被取消：只有一次完整的 `read` 返回后才会写入缓冲区。
pub(crate) struct DiagnosticLines<R> {
    reader: R,
    pending: Vec<u8>,
    chunk: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> DiagnosticLines<R> {
    pub(crate) fn new(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            chunk: vec![0; chunk_bytes.max(1)],
            eof: false,
        }
    }

    pub(crate) async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }

            if self.eof {
                let rest = std::mem::take(&mut self.pending);
                let text = String::from_utf8_lossy(&rest).trim().to_string();
                return Ok(if text.is_empty() { None } else { Some(text) });
            }

            let read = self.reader.read(&mut self.chunk).await?;
            if read == 0 {
                self.eof = true;
                continue;
            }
            self.pending.extend_from_slice(&self.chunk[..read]);

            if self.pending.len() > MAX_DIAGNOSTIC_LINE_BYTES
                && !self.pending.iter().any(|byte| is_separator(*byte))
            {
                let overflow = std::mem::take(&mut self.pending);
                return Ok(Some(String::from_utf8_lossy(&overflow).into_owned()));
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        loop {
            let position = self.pending.iter().position(|byte| is_separator(*byte))?;
            let raw: Vec<u8> = self.pending.drain(..=position).collect();
            let text = String::from_utf8_lossy(&raw[..position]).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
}

fn is_separator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_on_carriage_returns_and_newlines() {
        let input: &[u8] = b"first\rsecond\r\nthird\n\n  \rtail";
        let mut lines = DiagnosticLines::new(input, 3);

        let mut collected = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            collected.push(line);
        }

        assert_eq!(collected, vec!["first", "second", "third", "tail"]);
    }

    #[tokio::test]
    async fn empty_stream_yields_none() {
        let input: &[u8] = b"";
        let mut lines = DiagnosticLines::new(input, 16);
        assert_eq!(lines.next_line().await.unwrap(), None);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"time=00:00:01.00 \xff\n";
        let mut lines = DiagnosticLines::new(input, 64);
        let line = lines.next_line().await.unwrap().unwrap();
        assert!(line.starts_with("time=00:00:01.00"));
    }
}
