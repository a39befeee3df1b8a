mod builtins;
mod config;
mod error;
mod foreground;
mod job;
mod job_table;
mod parser;
mod pipeline;
mod redirect;
mod shell;
mod signal;
mod status;
mod terminal;

use std::io::{self, BufRead, Write};

use config::Limits;
use shell::Shell;

fn main() {
    env_logger::init();

    let limits = Limits::default();
    let mut sh = match Shell::bootstrap(limits) {
        Ok(sh) => sh,
        Err(err) => {
            eprintln!("tsh: failed to start: {err}");
            std::process::exit(1);
        }
    };

    // SAFETY: `sh` lives until the end of `main`, outliving every signal
    // that can arrive once handlers are installed below.
    unsafe {
        shell::set_global(&mut sh);
    }
    if let Err(err) = signal::install_handlers() {
        eprintln!("tsh: failed to install signal handlers: {err}");
        std::process::exit(1);
    }

    run(&mut sh);
}

/// The command-line I/O loop: print the prompt, read up to
/// `max_line_bytes`, parse, and dispatch. Exits on EOF or the `exit`
/// built-in.
fn run(sh: &mut Shell) {
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    loop {
        print!("{}", sh.limits.prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut raw = Vec::new();
        match read_line_bounded(&mut handle, sh.limits.max_line_bytes, &mut raw) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                log::error!("stdin read failed: {err}");
                break;
            }
        }

        let line = String::from_utf8_lossy(&raw);
        let cmdline = line.trim_end_matches(['\r', '\n']).to_string();

        // Built-ins are recognized on the line's first word before the line
        // is ever split into pipeline stages, so e.g. `jobs | cat` still
        // dispatches as the `jobs` built-in rather than exec'ing it.
        let words = parser::tokenize(&line);
        if let Some(first) = words.first() {
            if let Some(builtin) = builtins::lookup(first) {
                if builtins::run(builtin, &words[1..], sh) {
                    break;
                }
                continue;
            }
        }

        let parsed = match parser::parse(&line, &sh.limits) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        if let Err(err) = pipeline::run(sh, parsed, &cmdline) {
            println!("{err}");
        }
    }

    sh.restore_terminal();
}

/// Read one line (terminated by `\n` or EOF), capped at `limit` bytes.
/// Excess bytes on an over-long line are discarded rather than fed to the
/// parser, matching the shell's fixed input-buffer size.
fn read_line_bounded(
    reader: &mut impl BufRead,
    limit: usize,
    out: &mut Vec<u8>,
) -> io::Result<usize> {
    let mut total = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(total);
        }

        let newline_at = buf.iter().position(|&b| b == b'\n');
        let consume_to = newline_at.map(|pos| pos + 1).unwrap_or(buf.len());

        let room = limit.saturating_sub(out.len());
        let take = consume_to.min(room);
        out.extend_from_slice(&buf[..take]);

        total += consume_to;
        reader.consume(consume_to);

        if newline_at.is_some() {
            return Ok(total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_up_to_and_including_newline() {
        let mut cursor = Cursor::new(b"ls -l\nnext line".to_vec());
        let mut out = Vec::new();
        let n = read_line_bounded(&mut cursor, 1024, &mut out).unwrap();
        assert_eq!(n, 6);
        assert_eq!(out, b"ls -l\n");
    }

    #[test]
    fn eof_with_no_trailing_newline_returns_what_was_read() {
        let mut cursor = Cursor::new(b"no newline here".to_vec());
        let mut out = Vec::new();
        let n = read_line_bounded(&mut cursor, 1024, &mut out).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(out, b"no newline here");
    }

    #[test]
    fn immediate_eof_returns_zero() {
        let mut cursor = Cursor::new(Vec::new());
        let mut out = Vec::new();
        let n = read_line_bounded(&mut cursor, 1024, &mut out).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn over_long_line_is_truncated_to_the_limit() {
        let mut line = vec![b'a'; 50];
        line.push(b'\n');
        let mut cursor = Cursor::new(line);
        let mut out = Vec::new();
        let n = read_line_bounded(&mut cursor, 10, &mut out).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(n, 51);
    }
}
