// util.rs

use std::io::{self, IsTerminal, Write};

pub fn writeln_ignore_broken_pipe<W: Write, S: AsRef<str>>(mut w: W, s: S) -> io::Result<()> {
    match writeln!(w, "{}", s.as_ref()) {
        Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Prints a line to stdout, treating a closed pipe as success.
pub fn say<S: AsRef<str>>(s: S) -> io::Result<()> {
    writeln_ignore_broken_pipe(io::stdout().lock(), s)
}

/// ANSI clear only when stdout is a terminal, so piped output stays clean.
pub fn clear_screen() -> io::Result<()> {
    let mut out = io::stdout().lock();
    if out.is_terminal() {
        write!(out, "\x1b[2J\x1b[H")?;
        out.flush()?;
    }
    Ok(())
}

pub fn header(title: &str) -> io::Result<()> {
    let rule = "=".repeat(70);
    say(&rule)?;
    say(title)?;
    say(&rule)
}

/// Comma separated list with blanks dropped.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cuts `s` to at most `width` chars, ending in `...` when shortened.
pub fn shorten(s: &str, width: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        return flat;
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = flat.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_pipe_is_ignored() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        assert!(writeln_ignore_broken_pipe(Closed, "x").is_ok());
        let mut buf = Vec::new();
        writeln_ignore_broken_pipe(&mut buf, "hi").unwrap();
        assert_eq!(buf, b"hi\n");
    }

    #[test]
    fn list_splitting() {
        assert_eq!(split_list(" a, b ,,c "), ["a", "b", "c"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn shortening() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("a  b\nc", 10), "a b c");
        assert_eq!(shorten("abcdefghij", 6), "abc...");
    }
}
