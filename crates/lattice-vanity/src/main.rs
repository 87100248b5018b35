//! Vanity account ID search tool.
//!
//! Draws random private keys across worker threads and derives account IDs
//! until one contains (or starts with) the requested phrase. Expect the
//! search time to grow steeply with phrase length.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use lattice_core::nbase32::ALPHABET;
use lattice_core::{get_account_id, AccountPrefix, KeySource};
use rand::rngs::OsRng;
use rand::RngCore;

/// Find an account ID containing the given phrase.
#[derive(Parser, Debug)]
#[command(name = "lattice-vanity")]
#[command(about = "Search for a vanity account ID")]
struct Args {
    /// Worker threads used for searching
    #[arg(short, long, default_value = "1")]
    threads: usize,

    /// Only accept account IDs whose data part starts with the phrase.
    /// Increases search time dramatically.
    #[arg(long)]
    only_prefix: bool,

    /// Phrase to search for
    phrase: String,
}

struct Found {
    private_key: String,
    account_id: String,
}

/// Map characters the alphabet excludes to their stand-ins and reject
/// anything else outside the alphabet.
fn convert_phrase(phrase: &str) -> Result<String, char> {
    let phrase = phrase
        .to_lowercase()
        .replace('v', "w")
        .replace('l', "1")
        .replace('2', "");

    for c in phrase.chars() {
        if !c.is_ascii() || !ALPHABET.contains(&(c as u8)) {
            return Err(c);
        }
    }

    Ok(phrase)
}

fn search_worker(
    phrase: String,
    only_prefix: bool,
    attempts: Arc<AtomicU64>,
    results: mpsc::Sender<Found>,
) {
    let mut key = [0u8; 32];
    loop {
        OsRng.fill_bytes(&mut key);
        let private_key = hex::encode(key);
        let account_id =
            match get_account_id(KeySource::PrivateKey(&private_key), AccountPrefix::default()) {
                Ok(account_id) => account_id,
                Err(_) => continue,
            };
        attempts.fetch_add(1, Ordering::Relaxed);

        // The leading data digit is constrained to 1 or 3, so a prefix
        // search matches right after it
        let matched = if only_prefix {
            account_id[5..].starts_with(&phrase)
        } else {
            account_id.contains(&phrase)
        };

        if matched {
            let _ = results.send(Found {
                private_key,
                account_id,
            });
            return;
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.phrase.len() > 57 {
        eprintln!("Phrase can be 57 characters long at most");
        std::process::exit(1);
    }

    let phrase = match convert_phrase(&args.phrase) {
        Ok(phrase) => phrase,
        Err(c) => {
            eprintln!("Forbidden character {:?} found in phrase", c);
            std::process::exit(1);
        }
    };

    let threads = args.threads.max(1);
    let attempts = Arc::new(AtomicU64::new(0));
    let (results_tx, results_rx) = mpsc::channel();

    for _ in 0..threads {
        let phrase = phrase.clone();
        let attempts = Arc::clone(&attempts);
        let results_tx = results_tx.clone();
        thread::spawn(move || search_worker(phrase, args.only_prefix, attempts, results_tx));
    }

    println!(
        "Searching for an account ID {} '{}' with {} thread(s), press Ctrl+C to stop",
        if args.only_prefix {
            "starting with"
        } else {
            "containing"
        },
        phrase,
        threads
    );

    let start = Instant::now();
    let mut last_report = Instant::now();

    loop {
        match results_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(found) => {
                println!("Found a match.");
                println!("Account ID:  {}", found.account_id);
                println!("Private key: {}", found.private_key);
                // Remaining workers are detached and die with the process
                return;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if last_report.elapsed() >= Duration::from_secs(5) {
                    last_report = Instant::now();
                    let total = attempts.load(Ordering::Relaxed);
                    log::info!(
                        "current search rate: {:.0} IDs/s",
                        total as f64 / start.elapsed().as_secs_f64()
                    );
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_phrase() {
        assert_eq!(convert_phrase("nano").unwrap(), "nano");
        assert_eq!(convert_phrase("Vale2").unwrap(), "wa1e");
        assert!(convert_phrase("pot@to").is_err());
    }
}
