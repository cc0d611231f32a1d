use crate::query::{display_time, HistoryView};
use std::fmt::Write;

/// Escape text for inclusion in HTML element content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the history dashboard. Rows appear in the view's order.
pub fn history_page(view: &HistoryView, refresh_seconds: u64) -> Result<String, std::fmt::Error> {
    let mut html = String::with_capacity(1024 + view.entries.len() * 64);

    write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="{refresh}">
    <title>Zgodovina stanja škatle</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; background-color: #f4f7f6; }}
        h1 {{ color: #004d99; border-bottom: 2px solid #004d99; padding-bottom: 10px; }}
        table {{ width: 75%; border-collapse: collapse; margin-top: 25px; background-color: white; }}
        th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
        th {{ background-color: #cce6ff; }}
        tr:nth-child(even) {{ background-color: #f9f9f9; }}
        .status-ok {{ color: #28a745; font-weight: bold; }}
        .refresh {{ margin-top: 20px; font-style: italic; color: #6c757d; }}
    </style>
</head>
<body>
    <h1>Zgodovina stanja škatle</h1>
    <h2>Trenutno stanje: <span class="status-ok">{current}</span></h2>
    <table>
        <thead>
            <tr><th>Čas dejanja</th><th>Stanje škatle</th></tr>
        </thead>
        <tbody>
"#,
        refresh = refresh_seconds,
        current = escape_html(&view.current.label),
    )?;

    for entry in &view.entries {
        writeln!(
            html,
            "            <tr><td>{}</td><td>{}</td></tr>",
            display_time(&entry.timestamp),
            escape_html(&entry.label)
        )?;
    }

    write!(
        html,
        r#"        </tbody>
    </table>
    <p class="refresh">Stran se samodejno osveži vsakih {refresh} sekund.</p>
</body>
</html>
"#,
        refresh = refresh_seconds,
    )?;

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::HistoryOrder;
    use crate::state::{CurrentState, HistoryEntry};
    use chrono::Utc;

    fn view(labels: &[&str]) -> HistoryView {
        let now = Utc::now();
        HistoryView {
            current: CurrentState {
                label: labels.first().copied().unwrap_or("NI_PODATKOV").to_string(),
                observed_at: now,
            },
            order: HistoryOrder::NewestFirst,
            entries: labels
                .iter()
                .map(|l| HistoryEntry {
                    timestamp: now,
                    label: l.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_html("Zaprta škatla"), "Zaprta škatla");
    }

    #[test]
    fn test_page_rows_follow_view_order() {
        let page = history_page(&view(&["Zaklenjena", "Prispelo"]), 5).unwrap();

        let newest = page.find("<td>Zaklenjena</td>").unwrap();
        let oldest = page.find("<td>Prispelo</td>").unwrap();
        assert!(newest < oldest);
        assert!(page.contains(r#"<span class="status-ok">Zaklenjena</span>"#));
    }

    #[test]
    fn test_page_refresh_interval() {
        let page = history_page(&view(&[]), 7).unwrap();
        assert!(page.contains(r#"content="7""#));
        assert!(page.contains("vsakih 7 sekund"));
    }

    #[test]
    fn test_page_escapes_labels() {
        let page = history_page(&view(&["<script>"]), 5).unwrap();
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
