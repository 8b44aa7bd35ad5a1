//! Foreground-window metadata queries.
//!
//! Shells out to desktop tooling (`xprop`, `qdbus`, `swaymsg`) rather than
//! linking display-server libraries directly. This is brittle but keeps the
//! dependency surface small; the engine only needs a read-only snapshot per
//! request, so a failed query degrades to a detection error instead of a
//! crash.

use async_trait::async_trait;
use skald_text_injection::classify::WindowInfo;
use skald_text_injection::error::InjectionError;
use skald_text_injection::WindowProvider;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DesktopWindowProvider;

impl DesktopWindowProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WindowProvider for DesktopWindowProvider {
    async fn foreground_window(&self) -> Result<WindowInfo, InjectionError> {
        #[cfg(target_os = "linux")]
        {
            if let Ok(info) = x11_window().await {
                return Ok(info);
            }
            if let Ok(info) = kde_window().await {
                return Ok(info);
            }
            if let Ok(info) = sway_window().await {
                return Ok(info);
            }
        }

        Err(InjectionError::WindowNotFound {
            reason: "could not determine the foreground window".into(),
        })
    }
}

#[cfg(target_os = "linux")]
async fn run(cmd: &str, args: &[&str]) -> Result<String, InjectionError> {
    let output = tokio::process::Command::new(cmd)
        .args(args)
        .output()
        .await
        .map_err(|e| InjectionError::Other(format!("{} failed: {}", cmd, e)))?;

    if !output.status.success() {
        return Err(InjectionError::Other(format!(
            "{} exited with {}",
            cmd, output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(target_os = "linux")]
async fn x11_window() -> Result<WindowInfo, InjectionError> {
    let active = run("xprop", &["-root", "_NET_ACTIVE_WINDOW"]).await?;
    let window_id = parse_active_window_id(&active).ok_or_else(|| {
        InjectionError::Other("no active window id in xprop output".to_string())
    })?;

    let class_out = run("xprop", &["-id", &window_id, "WM_CLASS"]).await?;
    let window_class = parse_quoted_field(&class_out, 3).unwrap_or_default();

    let title_out = run("xprop", &["-id", &window_id, "_NET_WM_NAME"])
        .await
        .unwrap_or_default();
    let title = parse_quoted_field(&title_out, 1).unwrap_or_default();

    let pid_out = run("xprop", &["-id", &window_id, "_NET_WM_PID"])
        .await
        .unwrap_or_default();
    let pid = parse_cardinal(&pid_out);
    let process_name = pid.and_then(process_name_for_pid).unwrap_or_default();

    let handle = u64::from_str_radix(window_id.trim_start_matches("0x"), 16).unwrap_or(0);

    debug!(
        handle,
        class = %window_class,
        process = %process_name,
        "Foreground window via X11"
    );

    Ok(WindowInfo {
        handle,
        process_name,
        window_class,
        title,
    })
}

#[cfg(target_os = "linux")]
async fn kde_window() -> Result<WindowInfo, InjectionError> {
    let window_id = run("qdbus", &["org.kde.KWin", "/KWin", "org.kde.KWin.activeClient"]).await?;
    let window_id = window_id.trim().to_string();
    if window_id.is_empty() {
        return Err(InjectionError::Other("KWin reported no active client".into()));
    }

    let class = run(
        "qdbus",
        &[
            "org.kde.KWin",
            &format!("/Windows/{}", window_id),
            "org.kde.KWin.Window.resourceClass",
        ],
    )
    .await?;

    Ok(WindowInfo {
        handle: 0,
        process_name: class.trim().to_string(),
        window_class: class.trim().to_string(),
        title: String::new(),
    })
}

#[cfg(target_os = "linux")]
async fn sway_window() -> Result<WindowInfo, InjectionError> {
    let tree = run("swaymsg", &["-t", "get_tree"]).await?;
    let json: serde_json::Value = serde_json::from_str(&tree)
        .map_err(|e| InjectionError::Other(format!("swaymsg tree parse failed: {}", e)))?;

    focused_sway_node(&json).ok_or_else(|| {
        InjectionError::Other("no focused node in sway tree".to_string())
    })
}

/// Depth-first search for the focused node of a sway/i3 layout tree.
fn focused_sway_node(node: &serde_json::Value) -> Option<WindowInfo> {
    if node.get("focused").and_then(|v| v.as_bool()).unwrap_or(false) {
        let app_id = node
            .get("app_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let pid = node.get("pid").and_then(|v| v.as_u64()).map(|p| p as u32);
        let process_name = pid
            .and_then(process_name_for_pid)
            .unwrap_or_else(|| app_id.clone());
        return Some(WindowInfo {
            handle: node.get("id").and_then(|v| v.as_u64()).unwrap_or(0),
            process_name,
            window_class: app_id,
            title: node
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }
    for key in ["nodes", "floating_nodes"] {
        if let Some(children) = node.get(key).and_then(|v| v.as_array()) {
            for child in children {
                if let Some(found) = focused_sway_node(child) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Extract the window id from `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x...`.
fn parse_active_window_id(output: &str) -> Option<String> {
    let id = output.split("# ").nth(1)?.trim();
    if id.is_empty() || id == "0x0" {
        return None;
    }
    // Multiple ids can be listed; the first is the active one.
    Some(id.split(',').next()?.trim().to_string())
}

/// Extract the n-th double-quoted field from an xprop line.
/// `WM_CLASS(STRING) = "instance", "Class"` keeps the class at index 3.
fn parse_quoted_field(output: &str, index: usize) -> Option<String> {
    output.split('"').nth(index).map(str::to_string)
}

/// Extract the numeric value of a CARDINAL xprop line.
fn parse_cardinal(output: &str) -> Option<u32> {
    output.split('=').nth(1)?.trim().parse().ok()
}

/// Resolve a pid to its short process name.
fn process_name_for_pid(pid: u32) -> Option<String> {
    std::fs::read_to_string(format!("/proc/{}/comm", pid))
        .ok()
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_active_window_id() {
        let out = "_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3400007\n";
        assert_eq!(parse_active_window_id(out).as_deref(), Some("0x3400007"));
    }

    #[test]
    fn rejects_null_window_id() {
        let out = "_NET_ACTIVE_WINDOW(WINDOW): window id # 0x0\n";
        assert_eq!(parse_active_window_id(out), None);
    }

    #[test]
    fn parses_wm_class_and_title() {
        let class = "WM_CLASS(STRING) = \"navigator\", \"firefox\"\n";
        assert_eq!(parse_quoted_field(class, 3).as_deref(), Some("firefox"));

        let title = "_NET_WM_NAME(UTF8_STRING) = \"Issue tracker - Mozilla Firefox\"\n";
        assert_eq!(
            parse_quoted_field(title, 1).as_deref(),
            Some("Issue tracker - Mozilla Firefox")
        );
    }

    #[test]
    fn parses_pid_cardinal() {
        let out = "_NET_WM_PID(CARDINAL) = 4242\n";
        assert_eq!(parse_cardinal(out), Some(4242));
    }

    #[test]
    fn finds_focused_node_in_sway_tree() {
        let tree = serde_json::json!({
            "focused": false,
            "nodes": [
                { "focused": false, "nodes": [] },
                {
                    "focused": true,
                    "id": 17,
                    "app_id": "org.wezfurlong.wezterm",
                    "name": "wezterm",
                    "nodes": []
                }
            ]
        });
        let info = focused_sway_node(&tree).unwrap();
        assert_eq!(info.handle, 17);
        assert_eq!(info.window_class, "org.wezfurlong.wezterm");
        assert_eq!(info.title, "wezterm");
    }

    #[test]
    fn unfocused_tree_yields_nothing() {
        let tree = serde_json::json!({ "focused": false, "nodes": [] });
        assert!(focused_sway_node(&tree).is_none());
    }
}
