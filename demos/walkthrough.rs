//! Scripted tour of the ProbeMap API.
//!
//! Run with `RUST_LOG=debug` to also see growth and compaction events.

use log::LevelFilter;
use probe_map::{MapError, ProbeMap};

fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

fn main() -> Result<(), MapError> {
    init_logging();

    let mut map: ProbeMap<i32, String> = ProbeMap::new();

    println!("Adding 5 entries...");
    for i in 1..=5 {
        map.add(i, format!("Value {i}"))?;
        println!("added: [{i}] = Value {i}");
    }

    println!("\nKeys:");
    for key in map.keys() {
        println!("key: {key}");
    }

    println!("\nValues:");
    for value in map.values() {
        println!("value: {value}");
    }

    println!("\ncontains_key(3): {}", map.contains_key(&3));
    println!(
        "contains_value(\"Value 4\"): {}",
        map.contains_value(&"Value 4".to_string())
    );

    println!("\nmap[2] = {}", map.get(&2)?);

    println!("\nAll entries:");
    for (k, v) in &map {
        println!("{k} => {v}");
    }

    println!("\nRemoving key 3...");
    map.remove(&3);
    println!("contains_key(3): {}", map.contains_key(&3));

    println!("\nRemoving absent key 999...");
    println!("removed: {}", map.remove(&999));

    println!("\nRe-adding key 3...");
    map.add(3, "New value for key 3".to_string())?;
    println!("map[3] = {}", map.get(&3)?);
    println!("contains_key(3): {}", map.contains_key(&3));

    match map.add(3, "again".to_string()) {
        Err(e) => println!("second add of key 3: {e}"),
        Ok(()) => println!("second add of key 3 unexpectedly succeeded"),
    }

    println!("\nClearing...");
    map.clear();
    println!("len after clear: {}", map.len());

    Ok(())
}
