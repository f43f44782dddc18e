//! `skipkv`: an interactive front end for the skip list store.
//!
//! Reads one command per line from stdin and prints one reply per command.
//! Configuration comes from `SKIPKV_*` environment variables (see
//! [`config`]); an optional first argument overrides the snapshot path.

mod command;
mod config;
mod store;

use anyhow::Result;
use log::{error, info};
use skiplist::{DeleteResult, InsertResult};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use command::{Command, HELP};
use config::StoreConfig;
use store::Store;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = StoreConfig::from_env()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.snapshot_path = PathBuf::from(path);
    }
    let store = Store::open(config)?;
    info!(
        "store ready (max_level {}, snapshot {})",
        store.config().max_level,
        store.config().snapshot_path.display()
    );
    if !store.is_empty() {
        info!("{} entries restored from snapshot", store.len());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&store, stdin.lock(), stdout.lock())
}

/// Runs the command loop until `EXIT` or end of input.
fn run<R: BufRead, W: Write>(store: &Store, input: R, mut out: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Exit)) => break,
            Ok(Some(cmd)) => execute(store, cmd, &mut out)?,
            Err(e) => writeln!(out, "ERR {}", e)?,
        }
        out.flush()?;
    }
    Ok(())
}

/// Executes one command and writes its reply. Snapshot failures are reported
/// to the user; only failures writing the reply itself are returned.
fn execute<W: Write>(store: &Store, cmd: Command, out: &mut W) -> Result<()> {
    match cmd {
        Command::Set { key, value } => match store.set(key, value) {
            InsertResult::Inserted => writeln!(out, "OK")?,
            InsertResult::AlreadyExists => writeln!(out, "EXISTS")?,
        },
        Command::Get { key } => match store.get(&key) {
            Some(value) => writeln!(out, "{}", value)?,
            None => writeln!(out, "(nil)")?,
        },
        Command::Del { key } => match store.del(&key) {
            DeleteResult::Deleted => writeln!(out, "DELETED")?,
            DeleteResult::NotFound => writeln!(out, "NOT FOUND")?,
        },
        Command::Size => writeln!(out, "{}", store.len())?,
        Command::Show => write!(out, "{}", store.show())?,
        Command::Dump => match store.dump() {
            Ok(n) => writeln!(out, "DUMPED {}", n)?,
            Err(e) => {
                error!("dump failed: {:#}", e);
                writeln!(out, "ERR {:#}", e)?
            }
        },
        Command::Load => match store.load() {
            Ok(stats) => writeln!(
                out,
                "LOADED {} (duplicates {}, skipped {})",
                stats.inserted, stats.duplicates, stats.skipped
            )?,
            Err(e) => {
                error!("load failed: {:#}", e);
                writeln!(out, "ERR {:#}", e)?
            }
        },
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Exit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn session(store: &Store, script: &str) -> Result<String> {
        let mut out = Vec::new();
        run(store, Cursor::new(script.as_bytes()), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn store_in(dir: &std::path::Path) -> Result<Store> {
        Store::open(StoreConfig {
            max_level: 6,
            snapshot_path: dir.join("store").join("dumpFile"),
            load_on_start: false,
        })
    }

    #[test]
    fn basic_session() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;

        let out = session(
            &store,
            "SET 1 a\nSET 1 b\nGET 1\nGET 2\nSIZE\nDEL 1\nDEL 1\nSIZE\n",
        )?;
        assert_eq!(out, "OK\nEXISTS\na\n(nil)\n1\nDELETED\nNOT FOUND\n0\n");
        Ok(())
    }

    #[test]
    fn exit_stops_processing() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;

        let out = session(&store, "SET k v\nexit\nSET j w\n")?;
        assert_eq!(out, "OK\n");
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn bad_lines_report_errors_and_continue() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;

        let out = session(&store, "\nBOGUS\nSET onlykey\nSIZE\n")?;
        assert_eq!(
            out,
            "ERR unknown command: BOGUS\nERR usage: SET <key> <value>\n0\n"
        );
        Ok(())
    }

    #[test]
    fn dump_and_load_through_the_loop() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;
        let out = session(&store, "SET 1 a\nSET 2 b\nDUMP\n")?;
        assert_eq!(out, "OK\nOK\nDUMPED 2\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("store").join("dumpFile"))?,
            "1:a\n2:b\n"
        );

        let fresh = store_in(dir.path())?;
        let out = session(&fresh, "LOAD\nGET 1\nGET 2\nSIZE\n")?;
        assert_eq!(out, "LOADED 2 (duplicates 0, skipped 0)\na\nb\n2\n");
        Ok(())
    }

    #[test]
    fn failed_load_is_reported_not_fatal() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;
        let out = session(&store, "LOAD\nSIZE\n")?;
        assert!(out.starts_with("ERR loading snapshot from"));
        assert!(out.ends_with("0\n"));
        Ok(())
    }

    #[test]
    fn show_prints_level_zero_last() -> Result<()> {
        let dir = tempdir()?;
        let store = store_in(dir.path())?;
        let out = session(&store, "SET b 2\nSET a 1\nSHOW\n")?;
        assert!(out.ends_with("Level 0: a:1;b:2;\n"));
        Ok(())
    }
}
