//! Server-rendered dashboard page.
//!
//! The page is a single HTML document with inline styles and a small script
//! that posts the upload to `/api/analyze` and fills in the result tabs.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::UploadConfig;
use crate::extraction::SchemaTable;

/// Generate the HTML shell for the application.
#[must_use]
pub fn html_shell(title: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="AI-powered document data extraction">
    <title>{title} - DocuMind</title>
    <style>{STYLES}</style>
</head>
<body>
    <header class="topbar">
        <a href="/" class="brand">📄 DocuMind</a>
        <span class="tagline">Extract structured data from unstructured documents</span>
    </header>
    <main id="app">
        {content}
    </main>
    <footer class="footer">Powered by Axum + OpenAI-compatible models</footer>
    <script>{SCRIPT}</script>
</body>
</html>"#)
}

/// The dashboard: mode sidebar, requirements, upload form and result tabs.
#[must_use]
pub fn dashboard_page(schemas: &SchemaTable, upload: &UploadConfig, model: &str) -> String {
    let mut modes = String::new();
    for (index, (mode, schema)) in schemas.iter().enumerate() {
        let checked = if index == 0 { " checked" } else { "" };
        let _ = write!(
            modes,
            r#"
            <label class="mode">
                <input type="radio" name="mode" value="{key}"{checked}>
                <span class="mode-label">{label}</span>
                <span class="mode-desc">{description}</span>
                <span class="mode-fields">{fields}</span>
            </label>"#,
            key = encode_double_quoted_attribute(mode.key()),
            label = encode_text(mode.label()),
            description = encode_text(mode.description()),
            fields = encode_text(&schema.expected_fields.join(", ")),
        );
    }

    let accept = upload.allowed_extensions.join(",");
    let formats = upload
        .allowed_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let content = format!(
        r#"
    <div class="layout">
        <aside class="sidebar">
            <h2>Extraction Mode</h2>
            <form id="analyze-form">
                <input type="hidden" name="session_id" id="session-id">
                <div class="modes">{modes}
                </div>

                <h2>Requirements</h2>
                <ul class="requirements">
                    <li>Supported formats: {formats}</li>
                    <li>Max size: {max_mb}MB</li>
                    <li>Model: {model}</li>
                </ul>

                <h2>Upload Document</h2>
                <input type="file" name="file" id="file-input" accept="{accept}" required>
                <button type="submit" id="analyze-button">Analyze Document</button>
            </form>
        </aside>

        <section class="results">
            <div id="status" class="status" hidden></div>
            <div id="empty" class="empty">Select a mode and upload a document to get started.</div>
            <div id="output" hidden>
                <h2 id="result-title"></h2>
                <nav class="tabs">
                    <button type="button" data-tab="table" class="active">Table</button>
                    <button type="button" data-tab="json">JSON</button>
                    <button type="button" data-tab="download">Download</button>
                    <button type="button" data-tab="text">Extracted Text</button>
                </nav>
                <div class="tab" id="tab-table"><table><thead><tr><th>Field</th><th>Value</th></tr></thead><tbody id="result-table"></tbody></table></div>
                <div class="tab" id="tab-json" hidden><pre id="result-json"></pre></div>
                <div class="tab" id="tab-download" hidden>
                    <a id="download-json" class="download">Download JSON</a>
                    <a id="download-csv" class="download">Download CSV</a>
                </div>
                <div class="tab" id="tab-text" hidden><pre id="result-text"></pre></div>
            </div>
        </section>
    </div>
    "#,
        formats = encode_text(&formats),
        max_mb = upload.max_file_size_mb,
        model = encode_text(model),
        accept = encode_double_quoted_attribute(&accept),
    );

    html_shell("Dashboard", &content)
}

const STYLES: &str = r"
body { margin: 0; font-family: system-ui, sans-serif; background: #f6f7f9; color: #1f2328; }
.topbar { display: flex; gap: 1rem; align-items: baseline; padding: 1rem 2rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.brand { font-weight: 700; font-size: 1.25rem; color: inherit; text-decoration: none; }
.tagline { color: #656d76; }
.layout { display: grid; grid-template-columns: 320px 1fr; gap: 1.5rem; padding: 1.5rem 2rem; }
.sidebar, .results { background: #fff; border-radius: 12px; padding: 1.25rem; box-shadow: 0 1px 3px rgba(0,0,0,.06); }
.sidebar h2 { font-size: 1rem; margin: 1rem 0 .5rem; }
.mode { display: grid; grid-template-columns: auto 1fr; gap: .25rem .5rem; padding: .5rem; border-radius: 8px; cursor: pointer; }
.mode:hover { background: #f0f3f6; }
.mode-desc, .mode-fields { grid-column: 2; font-size: .85rem; color: #656d76; }
.mode-fields { font-family: monospace; font-size: .75rem; }
.requirements { padding-left: 1.25rem; color: #656d76; font-size: .9rem; }
button[type=submit] { margin-top: 1rem; width: 100%; padding: .6rem; border: 0; border-radius: 8px; background: #2f6feb; color: #fff; font-weight: 600; cursor: pointer; }
button[disabled] { opacity: .6; cursor: progress; }
.status { padding: .75rem 1rem; border-radius: 8px; margin-bottom: 1rem; }
.status.error { background: #ffebe9; color: #a40e26; }
.status.info { background: #ddf4ff; color: #0a3069; }
.status.success { background: #dafbe1; color: #116329; }
.empty { color: #656d76; }
.tabs { display: flex; gap: .25rem; border-bottom: 1px solid #d0d7de; margin-bottom: 1rem; }
.tabs button { border: 0; background: none; padding: .5rem 1rem; cursor: pointer; }
.tabs button.active { border-bottom: 2px solid #2f6feb; font-weight: 600; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .5rem; border-bottom: 1px solid #eaeef2; vertical-align: top; }
pre { background: #f6f8fa; padding: 1rem; border-radius: 8px; overflow: auto; white-space: pre-wrap; max-height: 60vh; }
.download { display: inline-block; margin-right: 1rem; padding: .5rem 1rem; border-radius: 8px; background: #2f6feb; color: #fff; text-decoration: none; }
.footer { text-align: center; color: #8c959f; font-size: .8rem; padding: 1rem; }
";

const SCRIPT: &str = r#"
(function () {
  const form = document.getElementById('analyze-form');
  const button = document.getElementById('analyze-button');
  const status = document.getElementById('status');
  const sessionInput = document.getElementById('session-id');
  sessionInput.value = sessionStorage.getItem('documind.session') || '';

  function showStatus(kind, message) {
    status.className = 'status ' + kind;
    status.textContent = message;
    status.hidden = false;
  }

  document.querySelectorAll('.tabs button').forEach(function (tab) {
    tab.addEventListener('click', function () {
      document.querySelectorAll('.tabs button').forEach(function (b) { b.classList.remove('active'); });
      document.querySelectorAll('.tab').forEach(function (t) { t.hidden = true; });
      tab.classList.add('active');
      document.getElementById('tab-' + tab.dataset.tab).hidden = false;
    });
  });

  function render(data) {
    const body = document.getElementById('result-table');
    body.replaceChildren();
    data.table.forEach(function (row) {
      const tr = document.createElement('tr');
      const field = document.createElement('td');
      const value = document.createElement('td');
      field.textContent = row.field;
      value.textContent = row.value;
      tr.append(field, value);
      body.append(tr);
    });
    document.getElementById('result-title').textContent = data.mode_label + ': ' + data.file_name;
    document.getElementById('result-json').textContent = JSON.stringify(data.display, null, 2);
    document.getElementById('result-text').textContent = data.text;
    const base = '/api/sessions/' + encodeURIComponent(data.session_id);
    document.getElementById('download-json').href = base + '/download.json';
    document.getElementById('download-csv').href = base + '/download.csv';
    document.getElementById('empty').hidden = true;
    document.getElementById('output').hidden = false;
  }

  form.addEventListener('submit', async function (event) {
    event.preventDefault();
    button.disabled = true;
    showStatus('info', 'Extracting text and analyzing with AI...');
    try {
      const response = await fetch('/api/analyze', { method: 'POST', body: new FormData(form) });
      const data = await response.json();
      if (!response.ok) {
        const hint = data.recoverable === false ? ' Contact the administrator.' : '';
        showStatus('error', (data.error || ('Request failed: ' + response.status)) + hint);
        if (data.raw) {
          document.getElementById('result-text').textContent = data.raw;
        }
        return;
      }
      sessionStorage.setItem('documind.session', data.session_id);
      sessionInput.value = data.session_id;
      showStatus('success', 'Analysis complete!');
      render(data);
    } catch (err) {
      showStatus('error', 'Request failed: ' + err);
    } finally {
      button.disabled = false;
    }
  });
})();
"#;
