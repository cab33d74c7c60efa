#![cfg(not(tarpaulin_include))]

use env_logger::Env;
use service_dashboard::cycle::{FormSnapshot, Trigger, run_cycle};
use service_dashboard::record::{Dataset, clamp_rating};
use service_dashboard::saving::FileStore;
use service_dashboard::store::{DatasetStore, MemoryStore};
use std::env;
use std::io::{self, Write};

fn print_table(dataset: &Dataset) {
    println!(
        "{:<24} {:>8} {:>10} {:>12} {:>12}",
        "Service", "Urgency", "Resources", "Regulations", "Uncertainty"
    );
    for record in dataset {
        println!(
            "{:<24} {:>8} {:>10} {:>12} {:>12}",
            record.name, record.urgency, record.resources, record.regulations, record.uncertainty
        );
    }
}

/// Splits `<name words...> <u> <r> <g> <c>` into a name and four ratings.
fn parse_named_ratings(args: &[&str]) -> Option<(String, [u8; 4])> {
    if args.len() < 5 {
        return None;
    }
    let (name, values) = args.split_at(args.len() - 4);
    let mut ratings = [0u8; 4];
    for (slot, value) in ratings.iter_mut().zip(values) {
        *slot = clamp_rating(value.parse().ok()?);
    }
    Some((name.join(" "), ratings))
}

fn parse_command(line: &str) -> Result<(Trigger, FormSnapshot), String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or("");
    let rest: Vec<&str> = words.collect();

    match command {
        "show" | "" => Ok((Trigger::None, FormSnapshot::default())),
        "add" => {
            let (name, ratings) = parse_named_ratings(&rest)
                .ok_or("usage: add <name> <urgency> <resources> <regulations> <uncertainty>")?;
            Ok((Trigger::Add, FormSnapshot::default().naming(name).with_ratings(ratings)))
        }
        "update" => {
            let (name, ratings) = parse_named_ratings(&rest)
                .ok_or("usage: update <name> <urgency> <resources> <regulations> <uncertainty>")?;
            Ok((
                Trigger::Update,
                FormSnapshot::default().selecting(name).with_ratings(ratings),
            ))
        }
        "remove" => {
            if rest.is_empty() {
                return Err("usage: remove <name>".to_string());
            }
            Ok((Trigger::Remove, FormSnapshot::default().selecting(rest.join(" "))))
        }
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let mut store: Box<dyn DatasetStore> = match args.get(1) {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    let mut status = String::from("ok");
    let mut outcome = run_cycle(&mut store, Trigger::None, &FormSnapshot::default())?;
    loop {
        print_table(&outcome.records);
        print!("({}) > ", status);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "q" {
            break;
        }

        match parse_command(line) {
            Ok((trigger, form)) => {
                outcome = run_cycle(&mut store, trigger, &form)?;
                status = "ok".to_string();
            }
            Err(e) => status = e,
        }
    }

    Ok(())
}
