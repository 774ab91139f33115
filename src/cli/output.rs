use colored::{ColoredString, Colorize};

use certlist::core::models::key::Key;
use certlist::core::models::match_context::MatchContexts;
use certlist::core::services::key_filter_manager::KeyFilterManager;

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Apply the appearance `manager` resolves for `key` to `text`.
pub fn styled(text: &str, key: &Key, manager: &KeyFilterManager) -> ColoredString {
    let mut out: ColoredString = text.normal();
    let font = manager.font(key);
    if font.bold {
        out = out.bold();
    }
    if font.italic {
        out = out.italic();
    }
    if font.strikeout {
        out = out.strikethrough();
    }
    if let Some(fg) = manager.fg_color(key) {
        out = out.truecolor(fg.r, fg.g, fg.b);
    }
    if let Some(bg) = manager.bg_color(key) {
        out = out.on_truecolor(bg.r, bg.g, bg.b);
    }
    out
}

/// One display line for `key`: fingerprint, primary user ID and class.
pub fn key_line(key: &Key, manager: &KeyFilterManager) -> String {
    let label = match key.primary_user_id() {
        Some(uid) => format!("{}  {}", key.fingerprint, uid),
        None => key.fingerprint.to_string(),
    };
    let class = manager
        .filter_matching(key, MatchContexts::ANY)
        .map(|f| format!("  [{}]", f.name()))
        .unwrap_or_default();
    let icon = manager
        .icon(key)
        .map(|icon| format!("{icon} "))
        .unwrap_or_default();
    format!("{icon}{}{}", styled(&label, key, manager), class.dimmed())
}
