//! Parse one or more files (or glob patterns) and print the merged result.
//!
//! cargo run --example inidump -- 'conf.d/*.ini'
use std::env;
use std::process;

type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

fn dump(section: &rawini::Section) {
    for (property, values) in section.iter() {
        for value in values {
            println!("{} = {}", property, value);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let patterns: Vec<String> = env::args().skip(1).collect();
    if patterns.is_empty() {
        eprintln!("usage: inidump <file-or-pattern>...");
        process::exit(1);
    }

    let mut parser = rawini::Parser::new();
    for pattern in &patterns {
        parser.feed_glob(pattern)?;
    }
    let config = parser.finish()?;

    dump(config.global_section());
    for (name, section) in config.sections() {
        println!();
        println!("[{}]", name);
        dump(section);
    }

    Ok(())
}
