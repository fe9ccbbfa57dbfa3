//! HTML rendering for the single page.
//!
//! The page is small and fixed, so it is assembled with `format!` rather than
//! a template engine. Every piece of dynamic text (model output, error
//! messages, the configured title) goes through [`escape_html`].

use crate::prompts::TaskType;
use std::fmt::Write as _;

/// Everything the page shows for one render.
#[derive(Debug, Clone, Default)]
pub struct PageView<'a> {
    pub title: &'a str,
    /// Task pre-selected in the form.
    pub task: TaskType,
    pub result: Option<&'a str>,
    pub error: Option<&'a str>,
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Render the full HTML document.
pub fn render_page(view: &PageView<'_>) -> String {
    let title = escape_html(view.title);

    let mut options = String::new();
    for task in TaskType::ALL {
        let selected = if task == view.task { " selected" } else { "" };
        let _ = writeln!(
            options,
            r#"          <option value="{}"{}>{}</option>"#,
            task.as_str(),
            selected,
            escape_html(task.label())
        );
    }

    let mut blocks = String::new();
    if let Some(error) = view.error {
        let _ = writeln!(
            blocks,
            r#"    <div class="error" role="alert">{}</div>"#,
            escape_html(error)
        );
    }
    if let Some(result) = view.result {
        let _ = writeln!(
            blocks,
            r#"    <section class="result">
      <h2>Result</h2>
      <pre>{}</pre>
    </section>"#,
            escape_html(result)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #222; }}
    form {{ display: grid; gap: .75rem; padding: 1rem; border: 1px solid #ddd; border-radius: 8px; }}
    button {{ justify-self: start; padding: .5rem 1.25rem; }}
    .error {{ margin-top: 1rem; padding: .75rem; background: #fee; border: 1px solid #f99; border-radius: 6px; color: #a00; }}
    .result pre {{ white-space: pre-wrap; background: #f6f8fa; padding: 1rem; border-radius: 6px; }}
  </style>
</head>
<body>
  <main>
    <h1>{title}</h1>
    <form method="post" action="/" enctype="multipart/form-data">
      <label>Image
        <input type="file" name="image" accept="image/*" required>
      </label>
      <label>Task
        <select name="task_type">
{options}        </select>
      </label>
      <button type="submit">Analyze</button>
    </form>
{blocks}  </main>
</body>
</html>
"#
    )
}
