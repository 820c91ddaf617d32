//! Minimal markdown to HTML conversion for classifier replies.
//!
//! Handles bold spans, bullet lists, headers written as bold lines and pipe
//! tables. Input text is HTML-escaped before any markup is added.

const TABLE_CLASS: &str = "table table-striped table-bordered";

/// Render classifier markdown as an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let escaped = html_escape::encode_text(markdown);

    let mut html = String::new();
    let mut table: Vec<String> = Vec::new();
    let mut in_list = false;

    for raw_line in escaped.lines() {
        let line = render_bold(raw_line.trim());

        if is_table_line(&line) {
            table.push(line);
            continue;
        }

        if !table.is_empty() {
            close_list(&mut html, &mut in_list);
            html.push_str(&render_table(&table));
            table.clear();
        }

        if line.is_empty() {
            continue;
        }

        if let Some(item) = line.strip_prefix("- ") {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            html.push_str(&format!("<li>{}</li>", item));
            continue;
        }

        close_list(&mut html, &mut in_list);
        if line.starts_with("<strong>") {
            html.push_str(&format!("<p class=\"seo-header\">{}</p>", line));
        } else {
            html.push_str(&format!("<p>{}</p>", line));
        }
    }

    if !table.is_empty() {
        close_list(&mut html, &mut in_list);
        html.push_str(&render_table(&table));
    }
    close_list(&mut html, &mut in_list);

    html
}

fn close_list(html: &mut String, in_list: &mut bool) {
    if *in_list {
        html.push_str("</ul>");
        *in_list = false;
    }
}

fn is_table_line(line: &str) -> bool {
    line.starts_with('|') && line.ends_with('|')
}

/// Pair `**` markers left to right; an unmatched trailing marker stays literal
fn render_bold(line: &str) -> String {
    let parts: Vec<&str> = line.split("**").collect();
    let paired = (parts.len() - 1) / 2 * 2;

    let mut out = String::with_capacity(line.len());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            let marker = match (i <= paired, i % 2 == 1) {
                (true, true) => "<strong>",
                (true, false) => "</strong>",
                (false, _) => "**",
            };
            out.push_str(marker);
        }
        out.push_str(part);
    }
    out
}

fn render_table(lines: &[String]) -> String {
    if lines.len() < 2 {
        return lines.concat();
    }

    let mut html = format!("<table class=\"{}\">", TABLE_CLASS);

    for (i, line) in lines.iter().enumerate() {
        let cells: Vec<&str> = line.trim_matches('|').split('|').map(str::trim).collect();

        if i == 0 {
            html.push_str("<thead><tr>");
            for cell in &cells {
                html.push_str(&format!("<th>{}</th>", cell));
            }
            html.push_str("</tr></thead>");
        } else if i == 1 && cells.iter().all(|cell| cell.starts_with('-') && cell.ends_with('-')) {
            continue;
        } else {
            html.push_str("<tr>");
            for cell in &cells {
                html.push_str(&format!("<td>{}</td>", cell));
            }
            html.push_str("</tr>");
        }
    }

    html.push_str("</table>");
    html
}
