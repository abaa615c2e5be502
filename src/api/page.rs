//! Upload page served on `GET /`.

pub const UPLOAD_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="pl">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>ESAM CSV to Excel</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', system-ui, sans-serif;
      background: #fafaf9; color: #1c1917;
      min-height: 100vh; display: flex; flex-direction: column;
      align-items: center; justify-content: center; padding: 24px;
    }
    h1 { font-size: 24px; margin-bottom: 8px; }
    p { color: #78716c; font-size: 14px; margin-bottom: 24px; text-align: center; }
    form { display: flex; flex-direction: column; gap: 12px; width: 100%; max-width: 360px; }
    .btn {
      padding: 16px; border-radius: 12px; font-size: 16px; font-weight: 500;
      cursor: pointer; border: none; background: #4a7c59; color: white;
    }
    .btn:disabled { opacity: 0.5; cursor: not-allowed; }
    .status { margin-top: 24px; text-align: center; }
    .status.success { color: #16a34a; }
    .status.error { color: #dc2626; }
  </style>
</head>
<body>
  <h1>ESAM CSV to Excel</h1>
  <p>Choose an ESAM export. The report downloads as an .xlsx workbook.</p>

  <form id="upload-form">
    <input type="file" name="file" id="file-input" accept=".csv,.xlsx,.xls" required>
    <button class="btn" type="submit" id="btn-send">Convert</button>
  </form>

  <div class="status" id="status"></div>

  <script>
    var form = document.getElementById('upload-form');
    var fileInput = document.getElementById('file-input');
    var btn = document.getElementById('btn-send');
    var statusEl = document.getElementById('status');

    function show(text, kind) {
      statusEl.textContent = text;
      statusEl.className = 'status ' + kind;
    }

    form.addEventListener('submit', function(e) {
      e.preventDefault();
      var file = fileInput.files[0];
      if (!file) return;

      var data = new FormData();
      data.append('file', file);
      btn.disabled = true;
      show('Converting...', '');

      fetch('/upload', { method: 'POST', body: data })
        .then(function(res) {
          if (!res.ok) {
            return res.json().then(function(body) {
              throw new Error(body.error ? body.error.message : res.statusText);
            });
          }
          return res.blob().then(function(blob) {
            var name = file.name.replace(/\.[^.]*$/, '') + '.xlsx';
            var link = document.createElement('a');
            link.href = URL.createObjectURL(blob);
            link.download = name;
            link.click();
            URL.revokeObjectURL(link.href);
            show('Saved ' + name, 'success');
          });
        })
        .catch(function(err) { show(err.message, 'error'); })
        .finally(function() { btn.disabled = false; });
    });
  </script>
</body>
</html>
"#;
