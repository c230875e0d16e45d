//! Raw terminal output. Everything goes through the `lenscout::print`
//! tracing target so the spinner layer can keep it above the progress line.

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::format::Detail;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;

#[macro_export]
macro_rules! lprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// Fill needed on the left and right of something `width` columns wide.
fn padding(width: usize) -> (usize, usize) {
    let fill: usize = TOTAL_WIDTH.saturating_sub(width);
    (fill / 2, fill - fill / 2)
}

/// `title` centered on a line of `fill`.
fn titled(title: &str, fill: &str, style: impl Fn(&str) -> ColoredString) {
    let (left, right) = padding(UnicodeWidthStr::width(title));
    print(&format!(
        "{}{}{}",
        fill.repeat(left).color(colors::SEPARATOR),
        style(title),
        fill.repeat(right).color(colors::SEPARATOR),
    ));
}

pub fn banner(quiet: u8) {
    if quiet == 0 {
        let title = format!("⟦ LENSCOUT v{} ⟧", env!("CARGO_PKG_VERSION"));
        titled(&title, "═", |t| t.bright_green().bold());
    }
}

pub fn header(msg: &str, quiet: u8) {
    if quiet == 0 {
        let title = format!("⟦ {} ⟧", msg.to_uppercase());
        titled(&title, "─", |t| t.bright_green());
    }
}

pub fn rule() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

pub fn status<T: AsRef<str>>(msg: T) {
    print(&format!("{} {}", ">".color(colors::SEPARATOR), msg.as_ref()));
}

/// `> key.....: value`, with dots padding `key` to `key_width`.
pub fn field(key: &str, value: ColoredString, key_width: usize) {
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    status(format!(
        "{}{}{} {value}",
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
    ));
}

/// `[idx] name` followed by one branch per detail.
pub fn tree(idx: usize, name: &str, details: &[Detail]) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));

    let key_width: usize = details.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (i, (key, value)) in details.iter().enumerate() {
        let branch: &str = if i + 1 == details.len() { "└─" } else { "├─" };
        print(&format!(
            " {} {}{}{} {value}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(key_width + 1 - key.len()).color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
        ));
    }
}

pub fn centered(msg: &str) {
    let (left, _) = padding(console::measure_text_width(msg));
    print(&format!("{}{msg}", " ".repeat(left)));
}

const NO_PEERS: &str = r#"
         _   _  ___    ____  _____ _____ ____  ____
        | \ | |/ _ \  |  _ \| ____| ____|  _ \/ ___|
        |  \| | | | | | |_) |  _| |  _| | |_) \___ \
        | |\  | |_| | |  __/| |___| |___|  _ < ___) |
        |_| \_|\___/  |_|   |_____|_____|_| \_\____/
"#;

pub fn no_results() {
    print(&NO_PEERS.red().bold().to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_fill_goes_to_the_right() {
        assert_eq!(padding(TOTAL_WIDTH - 5), (2, 3));
        assert_eq!(padding(TOTAL_WIDTH - 4), (2, 2));
    }

    #[test]
    fn oversized_titles_get_no_fill() {
        assert_eq!(padding(TOTAL_WIDTH + 10), (0, 0));
    }
}
