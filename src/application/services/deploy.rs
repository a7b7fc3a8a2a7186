//! Streaming a deploy subprocess' output

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use crate::infrastructure::traits::StreamingChild;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Forward every stdout/stderr line of `child` to `on_line`, then wait for it.
///
/// Both pipes are drained concurrently so a chatty stderr cannot block stdout.
/// `on_line` runs on the calling thread. Bytes that are not UTF-8 are replaced
/// with U+FFFD. The child is waited for even when reading a pipe fails.
/// Returns the child's exit code (`None` when killed by a signal).
pub fn stream_child<F>(child: &mut dyn StreamingChild, mut on_line: F) -> io::Result<Option<i32>>
where
    F: FnMut(OutputStream, &str),
{
    let stdout = child.take_stdout();
    let stderr = child.take_stderr();
    let (tx, rx) = mpsc::channel();

    let pumped = thread::scope(|s| {
        let out_tx = tx.clone();
        let out = s.spawn(move || pump(stdout, OutputStream::Stdout, out_tx));
        let err = s.spawn(move || pump(stderr, OutputStream::Stderr, tx));
        for (stream, line) in rx {
            on_line(stream, &line);
        }
        let out = out.join().unwrap_or_else(|_| Err(reader_panicked()));
        let err = err.join().unwrap_or_else(|_| Err(reader_panicked()));
        out.and(err)
    });

    let code = child.wait()?;
    pumped?;
    Ok(code)
}

fn pump(
    reader: Option<Box<dyn BufRead + Send>>,
    stream: OutputStream,
    tx: Sender<(OutputStream, String)>,
) -> io::Result<()> {
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if tx.send((stream, line)).is_err() {
            return Ok(());
        }
    }
}

fn reader_panicked() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "output reader thread panicked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct CannedChild {
        stdout: Option<&'static [u8]>,
        stderr: Option<&'static [u8]>,
        code: Option<i32>,
    }

    impl StreamingChild for CannedChild {
        fn take_stdout(&mut self) -> Option<Box<dyn BufRead + Send>> {
            self.stdout
                .take()
                .map(|s| Box::new(Cursor::new(s)) as Box<dyn BufRead + Send>)
        }

        fn take_stderr(&mut self) -> Option<Box<dyn BufRead + Send>> {
            self.stderr
                .take()
                .map(|s| Box::new(Cursor::new(s)) as Box<dyn BufRead + Send>)
        }

        fn wait(&mut self) -> io::Result<Option<i32>> {
            Ok(self.code)
        }
    }

    fn lines_of(lines: &[(OutputStream, String)], stream: OutputStream) -> Vec<&str> {
        lines
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, l)| l.as_str())
            .collect()
    }

    #[test]
    fn given_output_on_both_pipes_when_stream_then_forwards_every_line() {
        let mut child = CannedChild {
            stdout: Some(b"sending incremental file list\nindex.html\n".as_slice()),
            stderr: Some(b"rsync: permission denied\n".as_slice()),
            code: Some(23),
        };
        let mut lines = Vec::new();

        let code = stream_child(&mut child, |stream, line| {
            lines.push((stream, line.to_string()))
        })
        .unwrap();

        assert_eq!(code, Some(23));
        assert_eq!(
            lines_of(&lines, OutputStream::Stdout),
            vec!["sending incremental file list", "index.html"]
        );
        assert_eq!(
            lines_of(&lines, OutputStream::Stderr),
            vec!["rsync: permission denied"]
        );
    }

    #[test]
    fn given_latin1_file_name_when_stream_then_later_lines_and_code_still_arrive() {
        // Arrange
        let mut child = CannedChild {
            stdout: Some(b"sending incremental file list\ncaf\xe9.html\r\nindex.html\n".as_slice()),
            stderr: None,
            code: Some(0),
        };
        let mut lines = Vec::new();

        // Act
        let code = stream_child(&mut child, |stream, line| {
            lines.push((stream, line.to_string()))
        })
        .unwrap();

        // Assert
        assert_eq!(code, Some(0));
        assert_eq!(
            lines_of(&lines, OutputStream::Stdout),
            vec!["sending incremental file list", "caf\u{FFFD}.html", "index.html"]
        );
    }

    #[test]
    fn given_last_line_without_newline_when_stream_then_forwarded() {
        let mut child = CannedChild {
            stdout: Some(b"total size is 0".as_slice()),
            stderr: None,
            code: Some(0),
        };
        let mut lines = Vec::new();

        stream_child(&mut child, |stream, line| lines.push((stream, line.to_string()))).unwrap();

        assert_eq!(lines_of(&lines, OutputStream::Stdout), vec!["total size is 0"]);
    }

    #[test]
    fn given_no_pipes_when_stream_then_only_waits() {
        let mut child = CannedChild {
            stdout: None,
            stderr: None,
            code: None,
        };

        let code = stream_child(&mut child, |_, _| panic!("no lines expected")).unwrap();

        assert_eq!(code, None);
    }

    #[cfg(unix)]
    #[test]
    fn given_real_child_with_latin1_output_when_stream_then_exit_code_arrives() {
        use crate::infrastructure::traits::{CommandRunner, RealCommandRunner};

        // Arrange
        let mut child = RealCommandRunner
            .spawn_piped(
                "sh",
                &["-c", r"printf 'sending incremental file list\ncaf\351.html\nindex.html\n'; exit 4"],
            )
            .unwrap();
        let mut lines = Vec::new();

        // Act
        let code = stream_child(child.as_mut(), |stream, line| {
            lines.push((stream, line.to_string()))
        })
        .unwrap();

        // Assert
        assert_eq!(code, Some(4));
        assert_eq!(
            lines_of(&lines, OutputStream::Stdout),
            vec!["sending incremental file list", "caf\u{FFFD}.html", "index.html"]
        );
    }
}
