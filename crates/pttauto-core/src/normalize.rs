//! Terminal output normalization.
//!
//! The remote redraws its screens with vt100 escape sequences; prompt
//! matching works on plain text, so every read is stripped of cursor
//! movement, charset shifts, title-set sequences and stray control
//! bytes before it reaches the state machine.

use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences: cursor movement, erase, attribute changes.
static CSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid regex"));

/// Charset-shift sequences (`ESC ( A` / `ESC ( B`).
static CHARSET_SHIFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\([AB]").expect("valid regex"));

/// OSC title-set sequences (`ESC ] 0 ; ... BEL`).
static TITLE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\]0;[^\x07]*\x07").expect("valid regex"));

/// Remaining non-printable control bytes. Newline, carriage return and
/// tab survive; everything else below 0x20 plus DEL is dropped.
static CONTROL_BYTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]").expect("valid regex"));

/// Strip terminal escape sequences and control bytes from decoded text.
///
/// Pure and idempotent: normalizing already-normalized text is a no-op.
pub fn normalize(raw: &str) -> String {
    let text = CSI.replace_all(raw, "");
    let text = CHARSET_SHIFT.replace_all(&text, "");
    let text = TITLE_SET.replace_all(&text, "");
    CONTROL_BYTES.replace_all(&text, "").into_owned()
}
