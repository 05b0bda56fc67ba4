use colored::Colorize;

const RULE_WIDTH: usize = 60;

pub fn banner(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", title.bold());
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn ok(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", "[INFO]".cyan(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "[WARN]".yellow(), msg);
}

/// Errors go to stderr so stdout stays usable for verse output.
pub fn error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}
