//! Prompt signatures and screen classification.
//!
//! The remote has no structured protocol: every known state is
//! identified by exact substring containment against a fixed
//! vocabulary of native-language phrases. That vocabulary is the de
//! facto protocol surface and is reproduced verbatim here.
//!
//! Classification is an explicit ordered table, not ad hoc
//! conditionals: each obstacle row carries its signature set and (for
//! the recoverable ones) the corrective keystroke and settle delay
//! that resolve it.

use std::time::Duration;

/// Phrases indicating the login prompt is on screen.
pub const LOGIN_PROMPTS: &[&str] = &["請輸入代號", "代號", "guest", "new", "輸入代號"];

/// Bad credentials: wrong password or unknown account. Terminal.
pub const BAD_CREDENTIALS: &[&str] = &["密碼不對"];

/// Another session is logged in under the same account.
pub const DUPLICATE_LOGIN: &[&str] = &["您想刪除其他重複登入"];

/// Informational page waiting for any key.
pub const INFO_PAGE: &[&str] = &["請按任意鍵繼續"];

/// Stale failed-login-attempt record waiting for confirmation.
pub const STALE_ERROR: &[&str] = &["您要刪除以上錯誤嘗試"];

/// An unfinished article draft from an earlier session.
pub const UNFINISHED_DRAFT: &[&str] = &["您有一篇文章尚未完成"];

/// The server is shedding load; abandon this host.
pub const OVERLOADED: &[&str] = &["系統過載"];

/// Phrases indicating the authenticated main menu.
pub const MAIN_MENU: &[&str] = &[
    "主功能表",
    "(M)ail",
    "(A)nnounce",
    "(F)avorite",
    "(T)alk",
    "(U)ser",
    "(C)hat",
    "(P)lay",
    "(N)amelist",
    "(G)oodbye",
];

/// A corrective keystroke sequence and the settle delay after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    /// Keys written to resolve the obstacle.
    pub keys: &'static str,
    /// Pause before the next read is meaningful.
    pub settle: Duration,
}

/// A known blocking screen observed between credential entry and the
/// main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    /// Wrong password or no such account. Terminal, no correction.
    BadCredentials,
    /// Duplicate login confirmation.
    DuplicateLogin,
    /// Informational page.
    InfoPage,
    /// Stale failed-attempt record.
    StaleError,
    /// Unfinished draft from an earlier session.
    UnfinishedDraft,
}

impl Obstacle {
    /// The corrective keystroke for this obstacle, or `None` for the
    /// terminal bad-credentials state.
    pub fn correction(self) -> Option<Correction> {
        match self {
            Obstacle::BadCredentials => None,
            Obstacle::DuplicateLogin => Some(Correction {
                keys: "y\r\n",
                settle: Duration::from_secs(10),
            }),
            Obstacle::InfoPage => Some(Correction {
                keys: "\r\n",
                settle: Duration::from_secs(6),
            }),
            Obstacle::StaleError => Some(Correction {
                keys: "y\r\n",
                settle: Duration::from_secs(6),
            }),
            Obstacle::UnfinishedDraft => Some(Correction {
                keys: "q\r\n",
                settle: Duration::from_secs(6),
            }),
        }
    }
}

/// The obstacle table in its fixed evaluation priority. Bad
/// credentials outrank every recoverable state.
const OBSTACLES: &[(Obstacle, &[&str])] = &[
    (Obstacle::BadCredentials, BAD_CREDENTIALS),
    (Obstacle::DuplicateLogin, DUPLICATE_LOGIN),
    (Obstacle::InfoPage, INFO_PAGE),
    (Obstacle::StaleError, STALE_ERROR),
    (Obstacle::UnfinishedDraft, UNFINISHED_DRAFT),
];

fn contains_any(text: &str, signatures: &[&str]) -> bool {
    signatures.iter().any(|needle| text.contains(needle))
}

/// Classify the highest-priority obstacle present in the buffer, if
/// any. "No obstacle" is the distinct outcome that hands control to
/// the final menu check.
pub fn classify_obstacle(text: &str) -> Option<Obstacle> {
    OBSTACLES
        .iter()
        .find(|(_, signatures)| contains_any(text, signatures))
        .map(|(obstacle, _)| *obstacle)
}

/// Whether the buffer shows a login prompt.
pub fn has_login_prompt(text: &str) -> bool {
    contains_any(text, LOGIN_PROMPTS)
}

/// Whether the buffer shows the authenticated main menu.
pub fn is_main_menu(text: &str) -> bool {
    contains_any(text, MAIN_MENU)
}

/// Whether the buffer signals server overload.
pub fn is_overloaded(text: &str) -> bool {
    contains_any(text, OVERLOADED)
}
