use regex::Regex;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    let ansi = Regex::new("\x1b\\[[0-9;]*m").unwrap();
    let visible_len = |s: &str| ansi.replace_all(s, "").chars().count();

    let width = lines
        .iter()
        .map(|s| visible_len(s.as_str()))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    println_pad!("{}", border);
    for line in lines {
        let pad = width - visible_len(line.as_str());
        println_pad!("| {}{} |", line, " ".repeat(pad));
    }
    println_pad!("{}", border);
}

/// Formats a byte count the way sizes appear in the catalog, e.g. `32 KiB`.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
