use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use gamebox::data::catalog::load_content_catalog;
use gamebox::prefs::{MemoryPreferences, PreferenceRepository, PrefsDb};
use gamebox::{Session, Snapshot};

const COMMANDS: &str =
    "Commands: list | factions | items | maps | toggle <code> | help | quit";

fn main() {
    let (content_path, prefs_path) = parse_paths(env::args().collect());

    let catalog = match load_content_catalog(&content_path) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!(
                "Failed to load content catalog from {}: {}. Use --content <path> to point at a valid catalog.",
                content_path.display(),
                err
            );
            std::process::exit(1);
        }
    };

    let prefs: Box<dyn PreferenceRepository> = match PrefsDb::open(&prefs_path) {
        Ok(db) => Box::new(db),
        Err(err) => {
            eprintln!(
                "Failed to open preference store at {}: {}. Toggles will not survive this session.",
                prefs_path.display(),
                err
            );
            Box::new(MemoryPreferences::new())
        }
    };

    let mut session = Session::new(catalog, prefs);
    print_expansions(&session.snapshot());

    println!("{}", COMMANDS);
    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", COMMANDS),
            "list" => print_expansions(&session.snapshot()),
            "factions" => print_factions(&session.snapshot()),
            "items" => print_items(&session.snapshot()),
            "maps" => print_maps(&session.snapshot()),
            "toggle" => {
                if let Some(code) = parts.next() {
                    let before = session.expansions();
                    let snapshot = session.toggle(code);
                    if before == snapshot.expansions {
                        println!("Nothing to toggle for {}", code);
                    } else {
                        print_expansions(&snapshot);
                    }
                } else {
                    println!("Usage: toggle <code>");
                }
            }
            other => println!("Unknown command: {}", other),
        }
    }
}

fn parse_paths(args: Vec<String>) -> (PathBuf, PathBuf) {
    let mut iter = args.iter();
    let mut content_path = PathBuf::from("./assets/data/content.json");
    let mut prefs_path = PathBuf::from("./assets/data/prefs.db");
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--content" => {
                if let Some(value) = iter.next() {
                    content_path = PathBuf::from(value);
                }
            }
            "--prefs" => {
                if let Some(value) = iter.next() {
                    prefs_path = PathBuf::from(value);
                }
            }
            _ => {}
        }
    }
    (content_path, prefs_path)
}

fn print_expansions(snapshot: &Snapshot) {
    println!("Expansions:");
    for expansion in &snapshot.expansions {
        let mark = if expansion.enabled { "x" } else { " " };
        let suffix = if expansion.base { " (base)" } else { "" };
        println!("  [{}] {}{}", mark, expansion.code, suffix);
    }
}

fn print_factions(snapshot: &Snapshot) {
    println!("Active factions:");
    for faction in &snapshot.factions {
        println!(
            "  {} ({}) complexity={} wealth={} aggression={} crafting={}",
            faction.name,
            faction.expansion_code,
            faction.complexity,
            faction.wealth,
            faction.aggression,
            faction.crafting
        );
    }
}

fn print_items(snapshot: &Snapshot) {
    println!("Active items:");
    for item in &snapshot.items {
        println!("  {} ({}) x{}", item.name, item.expansion_code, item.count);
    }
}

fn print_maps(snapshot: &Snapshot) {
    println!("Active maps:");
    for map in &snapshot.maps {
        println!(
            "  {} ({}) {} clearings",
            map.name, map.expansion_code, map.clearings
        );
    }
}
