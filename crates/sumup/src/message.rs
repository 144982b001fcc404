//! One-line status messages

use colored::Colorize;

pub fn success(msg: &str) {
    println!("{}", format!("✓ {msg}").green());
}

pub fn warn(msg: &str) {
    println!("{}", format!("⚠ {msg}").yellow());
}

pub fn notify(msg: &str) {
    println!("{}", format!("ℹ {msg}").blue());
}
