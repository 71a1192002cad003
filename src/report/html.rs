use super::ReportData;
use crate::core::ScanResult;
use serde::Serialize;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Accessibility Report</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
  h1, h2 { font-weight: 600; }
  table { border-collapse: collapse; width: 100%; margin-bottom: 2rem; }
  th, td { border: 1px solid #ddd; padding: .4rem .6rem; text-align: left; }
  th { background: #f4f4f4; cursor: pointer; user-select: none; }
  td.num { text-align: right; font-variant-numeric: tabular-nums; }
  select { margin: 0 0 1rem; padding: .3rem; }
  .empty { color: #888; font-style: italic; }
</style>
</head>
<body>
<h1>Accessibility Report</h1>

<h2>Latest results</h2>
<label>Run: <select id="run-select"><option value="">Latest per URL</option></select></label>
<table id="latest-table"></table>

<h2>Overall trend</h2>
<table id="trend-table"></table>

<h2>URL history</h2>
<select id="url-select"></select>
<table id="history-table"></table>

<script>
const FULL_DATA = __FULL_DATA__;
const LATEST_DATA = __LATEST_DATA__;
const ALL_URLS = __ALL_URLS__;
const TREND_DATA = __TREND_DATA__;
const ALL_RUNS = __ALL_RUNS__;

const METRICS = ["Errors", "Contrast Errors", "Alerts", "Features", "Structure", "ARIA", "AIM Score"];

function fmtDate(iso) {
  return new Date(iso).toLocaleString();
}

function renderTable(table, columns, rows) {
  table.innerHTML = "";
  if (rows.length === 0) {
    table.innerHTML = '<tr><td class="empty">No data</td></tr>';
    return;
  }
  const head = table.createTHead().insertRow();
  columns.forEach(col => {
    const th = document.createElement("th");
    th.textContent = col.label;
    th.addEventListener("click", () => {
      const dir = th.dataset.dir === "asc" ? "desc" : "asc";
      th.dataset.dir = dir;
      const sorted = [...rows].sort((a, b) => {
        const x = col.value(a), y = col.value(b);
        return (x < y ? -1 : x > y ? 1 : 0) * (dir === "asc" ? 1 : -1);
      });
      renderTable(table, columns, sorted);
    });
    head.appendChild(th);
  });
  const body = table.createTBody();
  rows.forEach(row => {
    const tr = body.insertRow();
    columns.forEach(col => {
      const td = tr.insertCell();
      const v = col.value(row);
      td.textContent = col.format ? col.format(v, row) : v;
      if (typeof v === "number") td.className = "num";
    });
  });
}

const snapshotColumns = [
  { label: "URL", value: r => r.url },
  { label: "Scanned", value: r => r.datetime, format: fmtDate },
  ...METRICS.map(m => ({ label: m, value: r => r[m] })),
  { label: "Screenshot", value: r => r.screenshot_file },
];

const trendColumns = [
  { label: "Run", value: r => r.datetime, format: fmtDate },
  ...["AIM Score", "Errors", "Contrast Errors", "Alerts"].map(m => ({
    label: "Avg " + m, value: r => r[m], format: v => v.toFixed(2),
  })),
];

const runSelect = document.getElementById("run-select");
ALL_RUNS.forEach(run => {
  const opt = document.createElement("option");
  opt.value = run.unix_s;
  opt.textContent = run.label + " (New York)";
  runSelect.appendChild(opt);
});
runSelect.addEventListener("change", () => {
  const rows = runSelect.value === ""
    ? LATEST_DATA
    : FULL_DATA.filter(r => r.timestamp === Number(runSelect.value));
  renderTable(document.getElementById("latest-table"), snapshotColumns, rows);
});

const urlSelect = document.getElementById("url-select");
ALL_URLS.forEach(url => {
  const opt = document.createElement("option");
  opt.value = url;
  opt.textContent = url;
  urlSelect.appendChild(opt);
});
function renderHistory() {
  const rows = FULL_DATA
    .filter(r => r.url === urlSelect.value)
    .sort((a, b) => a.timestamp - b.timestamp);
  renderTable(document.getElementById("history-table"), snapshotColumns, rows);
}
urlSelect.addEventListener("change", renderHistory);

renderTable(document.getElementById("latest-table"), snapshotColumns, LATEST_DATA);
renderTable(document.getElementById("trend-table"), trendColumns, TREND_DATA);
renderHistory();
</script>
</body>
</html>
"#;

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> ScanResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn render_html(data: &ReportData) -> ScanResult<String> {
    Ok(PAGE_TEMPLATE
        .replace("__FULL_DATA__", &script_json(&data.history)?)
        .replace("__LATEST_DATA__", &script_json(&data.latest)?)
        .replace("__ALL_URLS__", &script_json(&data.all_urls)?)
        .replace("__TREND_DATA__", &script_json(&data.trend)?)
        .replace("__ALL_RUNS__", &script_json(&data.runs)?))
}
