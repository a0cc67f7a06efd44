use acorndb::error::DbError;
use acorndb::executor::{Executor, QueryResult, Row};
use acorndb::storage::{MemStore, SledStore, Store};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SQL over an ordered key-value store.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Database directory. Omit for an in-memory session.
    #[arg(value_name = "DATABASE")]
    database: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    match args.database {
        Some(path) => match SledStore::open(&path) {
            Ok(store) => {
                let exec = Executor::new(store);
                repl(&exec);
                if let Err(e) = exec.store().flush() {
                    eprintln!("failed to flush store: {}", e);
                }
            }
            Err(e) => eprintln!("{}", DbError::from(e)),
        },
        None => {
            println!("No database given, running in memory.");
            repl(&Executor::new(MemStore::new()));
        }
    }
}

fn repl<S: Store>(exec: &Executor<S>) {
    println!("acorndb REPL (type '.exit' or '.quit' to stop)");
    let mut buffer = String::new();
    loop {
        if buffer.is_empty() {
            print!("sql> ");
        } else {
            print!("...  ");
        }
        io::stdout().flush().unwrap();
        let line = io::stdin().lock().lines().next();
        if let Some(Ok(input)) = line {
            if input.trim() == ".exit" || input.trim() == ".quit" {
                break;
            } else if input.trim() == ".dump" {
                if let Err(e) = exec.dump() {
                    eprintln!("{}", e);
                }
            } else if !input.trim().ends_with(";") {
                buffer.push_str(&input);
                buffer.push('\n');
            } else {
                buffer.push_str(&input);
                let src = std::mem::take(&mut buffer);
                match exec.run(&src) {
                    Ok(QueryResult::Success) => println!("SUCCESS"),
                    Ok(QueryResult::Rows(rows)) => print_rows(&rows),
                    Err(e) => eprintln!("ERROR: {}", e),
                }
            }
        } else {
            println!("Failed to read line.");
            break;
        }
    }
}

fn print_rows(rows: &[Row]) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells.iter().map(|(v, _)| v.to_string()).collect())
        .collect();
    let mut widths = vec![0usize; cells[0].len()];
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    for row in &cells {
        let line: Vec<String> = widths
            .iter()
            .zip(row)
            .map(|(w, cell)| format!(" {:<1$} ", cell, w))
            .collect();
        println!("|{}|", line.join("|"));
    }
    println!("({} rows)", rows.len());
}
