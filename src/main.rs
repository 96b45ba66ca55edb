use colored::Colorize;
use std::process;

fn main() {
    if let Err(e) = spritemig::run() {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        process::exit(1);
    }
}
