//! # Foreground Window Classification
//!
//! Maps a foreground-window snapshot to an [`ApplicationCategory`] using a
//! known-process table, window-class patterns, and title heuristics, in that
//! order. Every step is a pure lookup, so classification is idempotent for a
//! fixed window and always yields exactly one category; processes nothing
//! matches resolve to [`ApplicationCategory::Generic`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Read-only snapshot of the currently focused window.
///
/// Fetched fresh per injection request and discarded immediately after; the
/// handle is owned by the OS and opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Opaque OS window handle.
    pub handle: u64,
    /// Short name of the owning process (e.g. `chrome.exe`, `konsole`).
    pub process_name: String,
    /// Window class reported by the windowing system.
    pub window_class: String,
    /// Window title at snapshot time.
    pub title: String,
}

impl WindowInfo {
    /// Process name lowered for table lookups.
    pub fn process_key(&self) -> String {
        self.process_name.to_lowercase()
    }
}

/// Closed set of input-handling behavior classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationCategory {
    Browser,
    Ide,
    OfficeSuite,
    Terminal,
    PlainTextEditor,
    Generic,
}

impl std::fmt::Display for ApplicationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationCategory::Browser => write!(f, "browser"),
            ApplicationCategory::Ide => write!(f, "ide"),
            ApplicationCategory::OfficeSuite => write!(f, "office-suite"),
            ApplicationCategory::Terminal => write!(f, "terminal"),
            ApplicationCategory::PlainTextEditor => write!(f, "plain-text-editor"),
            ApplicationCategory::Generic => write!(f, "generic"),
        }
    }
}

/// Known process names, matched exactly (case-insensitive).
const PROCESS_TABLE: &[(&str, ApplicationCategory)] = &[
    // Browsers
    ("chrome.exe", ApplicationCategory::Browser),
    ("chrome", ApplicationCategory::Browser),
    ("chromium", ApplicationCategory::Browser),
    ("msedge.exe", ApplicationCategory::Browser),
    ("firefox.exe", ApplicationCategory::Browser),
    ("firefox", ApplicationCategory::Browser),
    ("brave.exe", ApplicationCategory::Browser),
    ("opera.exe", ApplicationCategory::Browser),
    ("vivaldi.exe", ApplicationCategory::Browser),
    // IDEs
    ("code.exe", ApplicationCategory::Ide),
    ("code", ApplicationCategory::Ide),
    ("devenv.exe", ApplicationCategory::Ide),
    ("idea64.exe", ApplicationCategory::Ide),
    ("pycharm64.exe", ApplicationCategory::Ide),
    ("clion64.exe", ApplicationCategory::Ide),
    ("rider64.exe", ApplicationCategory::Ide),
    ("studio64.exe", ApplicationCategory::Ide),
    ("sublime_text.exe", ApplicationCategory::Ide),
    ("sublime_text", ApplicationCategory::Ide),
    // Office suites
    ("winword.exe", ApplicationCategory::OfficeSuite),
    ("excel.exe", ApplicationCategory::OfficeSuite),
    ("powerpnt.exe", ApplicationCategory::OfficeSuite),
    ("outlook.exe", ApplicationCategory::OfficeSuite),
    ("soffice.bin", ApplicationCategory::OfficeSuite),
    // Terminals
    ("windowsterminal.exe", ApplicationCategory::Terminal),
    ("wt.exe", ApplicationCategory::Terminal),
    ("cmd.exe", ApplicationCategory::Terminal),
    ("powershell.exe", ApplicationCategory::Terminal),
    ("pwsh.exe", ApplicationCategory::Terminal),
    ("conhost.exe", ApplicationCategory::Terminal),
    ("alacritty.exe", ApplicationCategory::Terminal),
    ("alacritty", ApplicationCategory::Terminal),
    ("kitty", ApplicationCategory::Terminal),
    ("konsole", ApplicationCategory::Terminal),
    ("wezterm-gui.exe", ApplicationCategory::Terminal),
    ("gnome-terminal-server", ApplicationCategory::Terminal),
    // Plain text editors
    ("notepad.exe", ApplicationCategory::PlainTextEditor),
    ("notepad++.exe", ApplicationCategory::PlainTextEditor),
    ("gedit", ApplicationCategory::PlainTextEditor),
    ("kate", ApplicationCategory::PlainTextEditor),
    ("kwrite", ApplicationCategory::PlainTextEditor),
    ("mousepad", ApplicationCategory::PlainTextEditor),
];

/// Window-class patterns, tried when the process name is unknown. Patterns
/// are regexes when the `regex` feature is enabled, substrings otherwise.
const CLASS_PATTERNS: &[(&str, ApplicationCategory)] = &[
    ("Chrome_WidgetWin", ApplicationCategory::Browser),
    ("MozillaWindowClass", ApplicationCategory::Browser),
    ("CASCADIA_HOSTING_WINDOW_CLASS", ApplicationCategory::Terminal),
    ("ConsoleWindowClass", ApplicationCategory::Terminal),
    ("mintty", ApplicationCategory::Terminal),
    ("OpusApp", ApplicationCategory::OfficeSuite),
    ("XLMAIN", ApplicationCategory::OfficeSuite),
    ("PPTFrameClass", ApplicationCategory::OfficeSuite),
    ("SunAwtFrame", ApplicationCategory::Ide),
    ("Notepad", ApplicationCategory::PlainTextEditor),
];

/// Title suffixes many applications append to their window titles; the last
/// resort before defaulting to Generic.
const TITLE_SUFFIXES: &[(&str, ApplicationCategory)] = &[
    (" - Google Chrome", ApplicationCategory::Browser),
    (" - Mozilla Firefox", ApplicationCategory::Browser),
    (" - Microsoft Edge", ApplicationCategory::Browser),
    (" - Brave", ApplicationCategory::Browser),
    (" - Visual Studio Code", ApplicationCategory::Ide),
    (" - Visual Studio", ApplicationCategory::Ide),
    (" - IntelliJ IDEA", ApplicationCategory::Ide),
    (" - Word", ApplicationCategory::OfficeSuite),
    (" - Excel", ApplicationCategory::OfficeSuite),
    (" - PowerPoint", ApplicationCategory::OfficeSuite),
    (" - LibreOffice Writer", ApplicationCategory::OfficeSuite),
    (" - Notepad", ApplicationCategory::PlainTextEditor),
];

/// Classifies foreground windows into application categories.
pub struct WindowClassifier {
    processes: HashMap<&'static str, ApplicationCategory>,
    #[cfg(feature = "regex")]
    class_patterns: Vec<(regex::Regex, ApplicationCategory)>,
}

impl Default for WindowClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowClassifier {
    pub fn new() -> Self {
        let processes = PROCESS_TABLE.iter().copied().collect();

        #[cfg(feature = "regex")]
        let class_patterns = CLASS_PATTERNS
            .iter()
            .filter_map(|(pattern, category)| match regex::Regex::new(pattern) {
                Ok(re) => Some((re, *category)),
                Err(e) => {
                    tracing::warn!("Invalid window-class pattern '{}': {}, skipping", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            processes,
            #[cfg(feature = "regex")]
            class_patterns,
        }
    }

    /// Map a window snapshot to its category. Total: never fails.
    pub fn classify(&self, window: &WindowInfo) -> ApplicationCategory {
        if let Some(category) = self.processes.get(window.process_key().as_str()) {
            trace!(
                process = %window.process_name,
                category = %category,
                "Classified by process table"
            );
            return *category;
        }

        if let Some(category) = self.match_window_class(&window.window_class) {
            trace!(
                class = %window.window_class,
                category = %category,
                "Classified by window class"
            );
            return category;
        }

        for (suffix, category) in TITLE_SUFFIXES {
            if window.title.ends_with(suffix) {
                trace!(
                    title = %window.title,
                    category = %category,
                    "Classified by title suffix"
                );
                return *category;
            }
        }

        trace!(process = %window.process_name, "Unmatched process, defaulting to generic");
        ApplicationCategory::Generic
    }

    fn match_window_class(&self, class: &str) -> Option<ApplicationCategory> {
        if class.is_empty() {
            return None;
        }

        #[cfg(feature = "regex")]
        return self
            .class_patterns
            .iter()
            .find(|(re, _)| re.is_match(class))
            .map(|(_, category)| *category);

        #[cfg(not(feature = "regex"))]
        return CLASS_PATTERNS
            .iter()
            .find(|(pattern, _)| class.contains(pattern))
            .map(|(_, category)| *category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(process: &str, class: &str, title: &str) -> WindowInfo {
        WindowInfo {
            handle: 0x4242,
            process_name: process.to_string(),
            window_class: class.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn classifies_chrome_by_process_name() {
        let classifier = WindowClassifier::new();
        let category = classifier.classify(&window("chrome.exe", "", ""));
        assert_eq!(category, ApplicationCategory::Browser);
    }

    #[test]
    fn process_lookup_is_case_insensitive() {
        let classifier = WindowClassifier::new();
        let category = classifier.classify(&window("WindowsTerminal.exe", "", ""));
        assert_eq!(category, ApplicationCategory::Terminal);
    }

    #[test]
    fn falls_back_to_window_class() {
        let classifier = WindowClassifier::new();
        let category = classifier.classify(&window(
            "some_embedded_shell",
            "CASCADIA_HOSTING_WINDOW_CLASS",
            "",
        ));
        assert_eq!(category, ApplicationCategory::Terminal);
    }

    #[test]
    fn falls_back_to_title_suffix() {
        let classifier = WindowClassifier::new();
        let category = classifier.classify(&window(
            "renamed_binary",
            "UnknownClass",
            "Inbox (42) - Google Chrome",
        ));
        assert_eq!(category, ApplicationCategory::Browser);
    }

    #[test]
    fn unknown_process_is_generic_not_error() {
        let classifier = WindowClassifier::new();
        let category = classifier.classify(&window("frobnicator.exe", "FrobWnd", "Frobnicator"));
        assert_eq!(category, ApplicationCategory::Generic);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = WindowClassifier::new();
        let w = window("idea64.exe", "SunAwtFrame", "project - IntelliJ IDEA");
        assert_eq!(classifier.classify(&w), classifier.classify(&w));
        assert_eq!(classifier.classify(&w), ApplicationCategory::Ide);
    }
}
