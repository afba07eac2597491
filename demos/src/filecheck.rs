// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! filecheck: probabilistic file existence checks backed by a persisted Bloom filter.
//!
//! Every command works on a filter file plus its `<filter>.elements` side file.
//!
//! ```text
//! filecheck create --filter files.bloom --expected 10000 --fpp 0.01
//! filecheck add --filter files.bloom --list names.txt
//! filecheck check --filter files.bloom report.pdf
//! filecheck test-fpr --filter files.bloom --trials 100000
//! ```

mod elements;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use anyhow::bail;
use bloomcheck::bloom::BloomFilter;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rand::Rng;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::elements::ElementList;

#[derive(Parser, Debug)]
#[command(name = "filecheck", version)]
#[command(about = "Probabilistic file existence checks backed by a Bloom filter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new empty filter, replacing any existing one
    Create {
        #[command(flatten)]
        target: FilterArg,
        #[command(flatten)]
        params: FilterParams,
    },
    /// Add every non-empty line of a file to the filter
    Add {
        #[command(flatten)]
        target: FilterArg,
        /// File containing one name per line
        #[arg(long)]
        list: PathBuf,
    },
    /// Check whether a name might be in the filter
    Check {
        #[command(flatten)]
        target: FilterArg,
        /// Name to look up
        name: String,
    },
    /// Display filter statistics
    Stats {
        #[command(flatten)]
        target: FilterArg,
    },
    /// Measure the false positive rate with random names that were never inserted
    TestFpr {
        #[command(flatten)]
        target: FilterArg,
        /// Number of random names to query
        #[arg(long, default_value_t = 10_000)]
        trials: usize,
    },
    /// Time inserts and lookups on a fresh filter with the same parameters
    Bench {
        #[command(flatten)]
        target: FilterArg,
        /// Number of operations of each kind
        #[arg(long, default_value_t = 100_000)]
        ops: usize,
    },
    /// Zero every bit and forget the inserted names
    Clear {
        #[command(flatten)]
        target: FilterArg,
    },
}

#[derive(Args, Debug)]
struct FilterArg {
    /// Path of the persisted filter
    #[arg(long)]
    filter: PathBuf,
}

#[derive(Args, Debug)]
struct FilterParams {
    /// Expected number of names (with --fpp)
    #[arg(long, requires = "fpp", conflicts_with_all = ["bits", "hashes"])]
    expected: Option<u64>,
    /// Target false positive rate, e.g. 0.01 for 1% (with --expected)
    #[arg(long, requires = "expected")]
    fpp: Option<f64>,
    /// Filter size in bits (with --hashes)
    #[arg(long, requires = "hashes")]
    bits: Option<u64>,
    /// Number of hash functions (with --bits)
    #[arg(long, requires = "bits")]
    hashes: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Create { target, params } => create(&target.filter, &params),
        Command::Add { target, list } => add(&target.filter, &list),
        Command::Check { target, name } => check(&target.filter, &name),
        Command::Stats { target } => stats(&target.filter),
        Command::TestFpr { target, trials } => test_fpr(&target.filter, trials),
        Command::Bench { target, ops } => bench(&target.filter, ops),
        Command::Clear { target } => clear(&target.filter),
    }
}

fn create(path: &Path, params: &FilterParams) -> anyhow::Result<()> {
    let filter = match (params.expected, params.fpp, params.bits, params.hashes) {
        (Some(expected), Some(fpp), None, None) => BloomFilter::new_optimal(expected, fpp)?,
        (None, None, Some(bits), Some(hashes)) => BloomFilter::new(bits, hashes)?,
        _ => bail!("pass either --expected and --fpp, or --bits and --hashes"),
    };

    filter.save(path)?;
    save_elements(path, &ElementList::default());

    println!("Created filter {}", path.display());
    println!(
        "Size: {} bits ({} KB)",
        filter.size(),
        filter.size() / 8 / 1024
    );
    println!("Hash functions: {}", filter.hash_count());
    if let Some(fpp) = params.fpp {
        println!("Target FPR: {:.4}%", fpp * 100.0);
    }
    Ok(())
}

fn add(path: &Path, list: &Path) -> anyhow::Result<()> {
    let mut filter = BloomFilter::load(path)?;
    let mut elements = load_elements(path)?;

    let text = fs::read_to_string(list)
        .with_context(|| format!("failed to read name list {}", list.display()))?;

    let mut added = 0usize;
    for line in text.lines().filter(|line| !line.is_empty()) {
        filter.insert(line);
        elements.push(line);
        added += 1;
    }

    filter.save(path)?;
    save_elements(path, &elements);
    info!(added, distinct = elements.len(), "updated filter");
    println!("Added {added} names to the filter.");
    Ok(())
}

fn check(path: &Path, name: &str) -> anyhow::Result<()> {
    let filter = BloomFilter::load(path)?;
    let elements = load_elements(path)?;

    if !filter.might_contain(name) {
        println!("{name}: definitely does not exist");
    } else if elements.contains(name) {
        println!("{name}: exists in filter (true positive)");
    } else {
        let fpr = filter.estimate_false_positive_rate(elements.len() as u64);
        println!("{name}: might exist (false positive)");
        println!("Current false positive probability: {:.4}%", fpr * 100.0);
    }
    Ok(())
}

fn stats(path: &Path) -> anyhow::Result<()> {
    let filter = BloomFilter::load(path)?;
    let elements = load_elements(path)?;
    let inserted = elements.len() as u64;
    let capacity = filter.size() as f64 / f64::from(filter.hash_count());

    println!("===== Filter Statistics =====");
    println!("Size: {} bits ({} bytes)", filter.size(), filter.size().div_ceil(8));
    println!("Hash functions: {}", filter.hash_count());
    println!("Elements inserted: {inserted}");
    println!(
        "Current false positive rate: {:.4}%",
        filter.estimate_false_positive_rate(inserted) * 100.0
    );
    println!("Bit density: {:.2}%", filter.density() * 100.0);
    println!("Filter utilization: {:.2}%", inserted as f64 / capacity * 100.0);
    Ok(())
}

fn test_fpr(path: &Path, trials: usize) -> anyhow::Result<()> {
    let filter = BloomFilter::load(path)?;
    let elements = load_elements(path)?;
    if elements.is_empty() {
        bail!("no elements in the filter to test, add some first");
    }

    info!(trials, "generating random test names");
    let mut rng = rand::thread_rng();
    let mut generated = HashSet::with_capacity(trials);
    let mut false_positives = 0usize;
    while generated.len() < trials {
        let name = random_name(&mut rng, "test_");
        if elements.contains(&name) || !generated.insert(name.clone()) {
            continue;
        }
        if filter.might_contain(&name) {
            false_positives += 1;
        }
    }

    let empirical = false_positives as f64 / trials as f64;
    let theoretical = filter.estimate_false_positive_rate(elements.len() as u64);

    println!("===== False Positive Rate Test Results =====");
    println!("Elements in filter: {}", elements.len());
    println!("Test cases run: {trials}");
    println!("False positives: {false_positives}");
    println!("Empirical false positive rate: {:.6}%", empirical * 100.0);
    println!("Theoretical false positive rate: {:.6}%", theoretical * 100.0);
    println!(
        "Difference: {:.6}%",
        (empirical - theoretical).abs() * 100.0
    );
    Ok(())
}

fn bench(path: &Path, ops: usize) -> anyhow::Result<()> {
    let template = BloomFilter::load(path)?;

    info!(ops, "generating random benchmark names");
    let mut rng = rand::thread_rng();
    let names: Vec<String> = (0..ops).map(|_| random_name(&mut rng, "bench_")).collect();

    let start = Instant::now();
    let mut filter = BloomFilter::new(template.size(), template.hash_count())?;
    for name in &names {
        filter.insert(name);
    }
    let insert_time = start.elapsed();

    let start = Instant::now();
    let hits = names.iter().filter(|name| filter.might_contain(name)).count();
    let lookup_time = start.elapsed();

    // Every benchmark name was inserted, so every lookup must hit.
    debug_assert_eq!(hits, names.len());

    println!("Insertion time: {:.6} seconds", insert_time.as_secs_f64());
    println!("Lookup time: {:.6} seconds", lookup_time.as_secs_f64());
    Ok(())
}

fn clear(path: &Path) -> anyhow::Result<()> {
    let mut filter = BloomFilter::load(path)?;
    filter.clear();
    filter.save(path)?;
    save_elements(path, &ElementList::default());
    println!("Filter cleared.");
    Ok(())
}

/// `<prefix>` followed by 5 to 20 random lowercase letters and `.txt`.
fn random_name(rng: &mut impl Rng, prefix: &str) -> String {
    let len = rng.gen_range(5..=20);
    let mut name = String::with_capacity(prefix.len() + len + 4);
    name.push_str(prefix);
    for _ in 0..len {
        name.push(char::from(rng.gen_range(b'a'..=b'z')));
    }
    name.push_str(".txt");
    name
}

fn load_elements(filter_path: &Path) -> anyhow::Result<ElementList> {
    let path = ElementList::path_for(filter_path);
    let list = ElementList::read(&path)
        .with_context(|| format!("failed to read element list {}", path.display()))?;
    Ok(list.unwrap_or_else(|| {
        warn!(path = %path.display(), "element list not found, true and false positives cannot be told apart");
        ElementList::default()
    }))
}

/// The filter is already saved at this point, so a failure here is only a warning.
fn save_elements(filter_path: &Path, elements: &ElementList) {
    let path = ElementList::path_for(filter_path);
    if let Err(err) = elements.write(&path) {
        warn!(path = %path.display(), %err, "filter was saved, but the element list was not");
    }
}
