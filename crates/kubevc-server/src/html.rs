//! Server-rendered pages

use kubevc_core::DashboardEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    fn colors(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Theme::Light => ("#f0f4f8", "#fff", "#0f172a"),
            Theme::Dark => ("#0f172a", "#1e293b", "#e2e8f0"),
        }
    }
}

/// Escape text for element content and single- or double-quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn page(title: &str, body: &str, theme: Theme) -> String {
    let (bg, card_bg, text) = theme.colors();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>{title}</title>
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <style>
    body {{ font-family: Inter, sans-serif; background:{bg}; color:{text}; }}
    .wrap {{ max-width:1040px; margin:0 auto; padding:20px; }}
    .card {{ background:{card_bg}; border-radius:12px; padding:16px; margin-bottom:16px; box-shadow:0 4px 12px rgba(0,0,0,0.3); }}
    .card h3 {{ margin-top:0; }}
    .card.degraded {{ opacity:0.7; }}
    .diagram img {{ max-width:100%; height:auto; border-radius:8px; margin-top:8px; }}
    a {{ color:#38bdf8; text-decoration:none; }}
    a:hover {{ text-decoration:underline; }}
  </style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        bg = bg,
        card_bg = card_bg,
        text = text,
        body = body,
    )
}

pub fn home_page() -> String {
    page(
        "KubeVC",
        "<h1>Welcome to KubeVC</h1><p>Go to <a href='/dashboard'>Dashboard</a> to see cluster state</p>",
        Theme::Light,
    )
}

pub fn dashboard_page(entries: &[DashboardEntry]) -> String {
    let cards: String = entries.iter().map(card).collect();
    let content = if cards.is_empty() {
        "<p>No diagrams found in the snapshot store yet.</p>".to_string()
    } else {
        cards
    };
    page(
        "K8s Git Cluster State",
        &format!(
            "<div class='wrap'><h1>K8s Git Cluster State</h1>{}</div>",
            content
        ),
        Theme::Dark,
    )
}

pub fn unavailable_page(message: &str) -> String {
    page(
        "K8s Git Cluster State",
        &format!(
            "<div class='wrap'><h1>K8s Git Cluster State</h1><p>Snapshot store unavailable: {}</p></div>",
            escape(message)
        ),
        Theme::Dark,
    )
}

fn card(entry: &DashboardEntry) -> String {
    let class = if entry.degraded { "card degraded" } else { "card" };
    format!(
        r#"
<div class='{class}'>
  <h3>Repo: {repo}</h3>
  <p><b>Commit:</b> {commit}</p>
  <p><b>Timestamp:</b> {timestamp}</p>
  <p><b>Changed YAMLs:</b> {changed}</p>
  <div class='diagram'><img src='{img}' alt='Cluster Diagram' /></div>
</div>
"#,
        class = class,
        repo = escape(&entry.repository),
        commit = escape(&entry.commit_id),
        timestamp = escape(&entry.timestamp),
        changed = escape(&entry.changed_manifest_paths.join(", ")),
        img = escape(&entry.image_locator),
    )
}
