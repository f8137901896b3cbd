use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::catalog;
use crate::db::models::{ClusterInfo, PlayerStats};
use crate::db::Database;
use crate::predictor::{ClusterPredictor, PredictionRequest};
use crate::stats::{self, RawStats};
use crate::view::{self, TableQuery};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub predictor: Arc<dyn ClusterPredictor>,
}

/// Boundary failures surfaced to the page. Each maps to a fixed message and
/// a 500; the underlying cause goes to the log, never to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error fetching players")]
    FetchPlayers(#[source] anyhow::Error),
    #[error("Error fetching clusters")]
    FetchClusters(#[source] anyhow::Error),
    #[error("Failed to fetch prediction")]
    Prediction(#[source] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let cause = match &self {
            ApiError::FetchPlayers(e) | ApiError::FetchClusters(e) | ApiError::Prediction(e) => e,
        };
        error!("{}: {:#}", self, cause);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/players", get(players_handler))
        .route("/api/clusters", get(clusters_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/fields", get(fields_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the dashboard HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/players?search=&cluster=&sort_key=&sort_order=
///
/// Fetches the full player snapshot and applies the table view engine;
/// omitted parameters mean no filter and the default sort.
async fn players_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<PlayerStats>>, ApiError> {
    let players = state.db.fetch_players().map_err(ApiError::FetchPlayers)?;
    Ok(Json(view::view(&players, &query)))
}

/// GET /api/clusters
async fn clusters_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClusterInfo>>, ApiError> {
    state
        .db
        .fetch_clusters()
        .map(Json)
        .map_err(ApiError::FetchClusters)
}

/// GET /api/catalog
async fn catalog_handler() -> impl IntoResponse {
    Json(catalog::entries())
}

/// GET /api/fields — the prediction form's field descriptors, in order.
async fn fields_handler() -> impl IntoResponse {
    Json(stats::FORM_FIELDS)
}

#[derive(serde::Serialize)]
struct PredictionResponse {
    cluster: i64,
    name: &'static str,
    tag: &'static str,
    color: &'static str,
}

/// POST /api/predict
///
/// Two-stage pipeline: the pure derivation runs first, then the merged
/// record is forwarded to the external service. The returned id is labelled
/// through the catalog so the page never has to interpret a bare integer.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawStats>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let derived = stats::derive(&raw);
    let request = PredictionRequest { raw, derived };
    let result = state
        .predictor
        .predict(&request)
        .await
        .map_err(ApiError::Prediction)?;

    let entry = catalog::lookup(result.cluster);
    Ok(Json(PredictionResponse {
        cluster: result.cluster,
        name: entry.name,
        tag: entry.tag,
        color: entry.color,
    }))
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    players: i64,
    clusters: i64,
    seeded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// GET /api/health
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Health>, (StatusCode, String)> {
    let report = || -> anyhow::Result<Health> {
        Ok(Health {
            status: "ok",
            players: state.db.count_players()?,
            clusters: state.db.count_clusters()?,
            seeded_at: state.db.seeded_at()?,
        })
    };
    report()
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Player Cluster Dashboard</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .tabs { display: flex; gap: .5rem; }
  .tab-btn { background: var(--card); border: 1px solid var(--border); color: var(--muted); padding: .5rem 1.1rem; border-radius: 8px; cursor: pointer; font-size: .9rem; }
  .tab-btn.active { border-color: var(--accent); color: var(--accent); font-weight: 600; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; display: flex; justify-content: space-between; align-items: center; gap: 1rem; flex-wrap: wrap; }
  .controls { display: flex; gap: .6rem; align-items: center; }
  input[type=text], input[type=number], select { background: var(--bg); border: 1px solid var(--border); color: var(--text); padding: .45rem .7rem; border-radius: 6px; font-size: .85rem; }
  input[type=text] { width: 230px; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  th.sortable { cursor: pointer; user-select: none; }
  th.sortable:hover { color: var(--accent); }
  td { padding: .65rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  tr:last-child td { border-bottom: none; }
  tbody tr.clickable { cursor: pointer; }
  tbody tr.clickable:hover { background: rgba(108,99,255,.06); }
  .pill { display: inline-block; padding: .15rem .6rem; border-radius: 20px; font-size: .75rem; font-weight: 700; color: #fff; cursor: pointer; }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
  .error { color: var(--red); }
  .overlay { position: fixed; inset: 0; background: rgba(0,0,0,.6); display: none; align-items: center; justify-content: center; z-index: 10; }
  .overlay.open { display: flex; }
  .dialog { background: var(--card); border: 1px solid var(--border); border-radius: 12px; max-width: 720px; width: 92%; max-height: 85vh; overflow-y: auto; padding: 1.4rem; }
  .dialog h2 { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; font-size: 1.2rem; }
  .stat-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(150px, 1fr)); gap: .7rem; }
  .stat-item { background: var(--bg); border: 1px solid var(--border); border-radius: 8px; padding: .7rem; }
  .stat-item .label { color: var(--muted); font-size: .72rem; text-transform: uppercase; letter-spacing: .05em; margin-bottom: .25rem; }
  .stat-item .value { font-size: 1.05rem; font-weight: 600; }
  form .fields { display: grid; grid-template-columns: repeat(auto-fill, minmax(190px, 1fr)); gap: .8rem 1rem; padding: 1.2rem; }
  form label { display: block; color: var(--muted); font-size: .78rem; margin-bottom: .25rem; }
  form input { width: 100%; }
  .submit-row { padding: 0 1.2rem 1.2rem; display: flex; align-items: center; gap: 1rem; }
  button.primary { background: var(--accent); border: none; color: #fff; padding: .6rem 1.6rem; border-radius: 8px; cursor: pointer; font-size: .95rem; font-weight: 600; }
  button.primary:disabled { opacity: .5; cursor: wait; }
  #predict-result-dialog .dialog { text-align: center; color: #fff; border: none; }
  #predict-result-dialog .big { font-size: 2.2rem; font-weight: 800; padding: 1rem 0; }
</style>
</head>
<body>
<header>
  <h1>🏏 Player Cluster Dashboard</h1>
  <span style="margin-left:auto;color:var(--muted);font-size:.8rem;" id="health"></span>
</header>

<main>
  <div class="tabs">
    <button class="tab-btn active" data-tab="players">Player Stats</button>
    <button class="tab-btn" data-tab="clusters">Cluster Info</button>
    <button class="tab-btn" data-tab="predict">Predict Your Player</button>
  </div>

  <!-- Players tab -->
  <section id="tab-players" class="panel">
    <div class="panel-header">
      <span>Player Statistics</span>
      <div class="controls">
        <input type="text" id="search" placeholder="Search by player name...">
        <select id="cluster-filter"><option value="">All Clusters</option></select>
      </div>
    </div>
    <table>
      <thead><tr id="players-head">
        <th class="sortable" data-key="player">Player Name</th>
        <th class="sortable" data-key="matches">Matches</th>
        <th class="sortable" data-key="runs">Runs</th>
        <th class="sortable" data-key="wickets">Wickets</th>
        <th class="sortable" data-key="average_batting">Batting Avg</th>
        <th class="sortable" data-key="average_bowling">Bowling Avg</th>
        <th class="sortable" data-key="cluster">Category</th>
      </tr></thead>
      <tbody id="players-tbody"><tr><td colspan="7" class="empty">Loading…</td></tr></tbody>
    </table>
  </section>

  <!-- Clusters tab -->
  <section id="tab-clusters" class="panel" hidden>
    <div class="panel-header"><span>Cluster Averages</span></div>
    <table>
      <thead><tr>
        <th>Cluster</th><th>Mean Batting Avg</th><th>Mean Strike Rate</th>
        <th>Mean Bowling Avg</th><th>Mean Economy</th>
      </tr></thead>
      <tbody id="clusters-tbody"><tr><td colspan="5" class="empty">Loading…</td></tr></tbody>
    </table>
  </section>

  <!-- Predict tab -->
  <section id="tab-predict" class="panel" hidden>
    <div class="panel-header"><span>Enter Player Statistics</span></div>
    <form id="predict-form">
      <div class="fields" id="predict-fields"></div>
      <div class="submit-row">
        <button type="submit" class="primary" id="predict-btn">Predict Category</button>
        <span id="predict-error" class="error"></span>
      </div>
    </form>
  </section>
</main>

<!-- Player detail dialog -->
<div class="overlay" id="player-dialog">
  <div class="dialog">
    <h2><span id="pd-name"></span><span class="pill" id="pd-badge"></span></h2>
    <div class="stat-grid" id="pd-grid"></div>
  </div>
</div>

<!-- Cluster detail dialog -->
<div class="overlay" id="cluster-dialog">
  <div class="dialog">
    <h2><span id="cd-name"></span></h2>
    <div class="stat-grid" id="cd-grid"></div>
  </div>
</div>

<!-- Prediction result dialog -->
<div class="overlay" id="predict-result-dialog">
  <div class="dialog" id="pr-dialog">
    <h2 style="justify-content:center;">Prediction Result</h2>
    <p>Based on the provided statistics, the player belongs to the category:</p>
    <div class="big" id="pr-name"></div>
  </div>
</div>

<script>
const fmt2 = v => v != null ? Number(v).toFixed(2) : '0.00';
const UNKNOWN = { cluster: null, name: 'Unknown', tag: 'UNK', color: '#6b7280' };

let catalog = [];
const catalogById = id => catalog.find(c => c.cluster === id) || UNKNOWN;

// Player-table query state; the server applies filtering and sorting.
const query = { search: '', cluster: null, sortKey: 'player', sortOrder: 'asc' };

async function loadCatalog() {
  const r = await fetch('/api/catalog');
  if (!r.ok) return;
  catalog = await r.json();
  const sel = document.getElementById('cluster-filter');
  for (const c of catalog) {
    const opt = document.createElement('option');
    opt.value = c.cluster;
    opt.textContent = c.name;
    sel.appendChild(opt);
  }
}

function playerQueryString() {
  const params = new URLSearchParams();
  if (query.search) params.set('search', query.search);
  if (query.cluster !== null) params.set('cluster', query.cluster);
  params.set('sort_key', query.sortKey);
  params.set('sort_order', query.sortOrder);
  return params.toString();
}

let players = [];
async function loadPlayers() {
  const tbody = document.getElementById('players-tbody');
  const r = await fetch('/api/players?' + playerQueryString()).catch(() => null);
  if (!r || !r.ok) {
    tbody.innerHTML = '<tr><td colspan="7" class="empty error">Error fetching player data</td></tr>';
    return;
  }
  players = await r.json();
  if (!players.length) {
    tbody.innerHTML = '<tr><td colspan="7" class="empty">No players match</td></tr>';
    return;
  }
  tbody.innerHTML = players.map((p, i) => {
    const c = catalogById(p.cluster);
    return `<tr class="clickable" data-idx="${i}">
      <td>${p.player}</td>
      <td>${p.matches}</td>
      <td>${p.runs}</td>
      <td>${p.wickets}</td>
      <td>${fmt2(p.average_batting)}</td>
      <td>${fmt2(p.average_bowling)}</td>
      <td><span class="pill" data-cluster="${p.cluster}" style="background:${c.color}">${c.tag}</span></td>
    </tr>`;
  }).join('');
}

function renderSortIndicators() {
  document.querySelectorAll('#players-head th').forEach(th => {
    const base = th.textContent.replace(/ [↑↓]$/, '');
    th.textContent = th.dataset.key === query.sortKey
      ? base + (query.sortOrder === 'asc' ? ' ↑' : ' ↓')
      : base;
  });
}

async function loadClusters() {
  const tbody = document.getElementById('clusters-tbody');
  const r = await fetch('/api/clusters').catch(() => null);
  if (!r || !r.ok) {
    tbody.innerHTML = '<tr><td colspan="5" class="empty error">Error fetching cluster data</td></tr>';
    return;
  }
  const clusters = await r.json();
  if (!clusters.length) {
    tbody.innerHTML = '<tr><td colspan="5" class="empty">No cluster data</td></tr>';
    return;
  }
  tbody.innerHTML = clusters.map((c, i) => {
    const cat = catalogById(c.cluster);
    return `<tr class="clickable" data-idx="${i}">
      <td><span class="pill" style="background:${cat.color}">${cat.name}</span></td>
      <td>${fmt2(c.average_batting)}</td>
      <td>${fmt2(c.strike_rate_batting)}</td>
      <td>${fmt2(c.average_bowling)}</td>
      <td>${fmt2(c.economy)}</td>
    </tr>`;
  }).join('');
  tbody.querySelectorAll('tr').forEach(tr => tr.addEventListener('click', () => {
    openClusterDialog(clusters[Number(tr.dataset.idx)]);
  }));
}

function statItem(label, value) {
  return `<div class="stat-item"><div class="label">${label}</div><div class="value">${value}</div></div>`;
}

function openPlayerDialog(p) {
  const c = catalogById(p.cluster);
  document.getElementById('pd-name').textContent = p.player;
  const badge = document.getElementById('pd-badge');
  badge.textContent = c.name;
  badge.style.background = c.color;
  document.getElementById('pd-grid').innerHTML = [
    ['Matches', p.matches], ['Innings Batted', p.innings_batted], ['Not Outs', p.not_outs],
    ['Runs', p.runs], ['Highest Score', p.highest_score], ['Balls Faced', p.balls_faced],
    ['Centuries', p.centuries], ['Fifties', p.fifties], ['Ducks', p.ducks],
    ['Fours', p.fours], ['Sixes', p.sixes], ['Innings Bowled', p.innings_bowled],
    ['Overs Bowled', p.overs_bowled], ['Maidens', p.maidens], ['Runs Conceded', p.runs_conceded],
    ['Wickets', p.wickets], ['4-Wicket Hauls', p.four_wicket_hauls],
    ['5-Wicket Hauls', p.five_wicket_hauls], ['Catches', p.catches],
    ['Batting Avg', fmt2(p.average_batting)], ['Batting SR', fmt2(p.strike_rate_batting)],
    ['Bowling Avg', fmt2(p.average_bowling)], ['Economy', fmt2(p.economy)],
    ['Bowling SR', fmt2(p.strike_rate_bowling)],
  ].map(([l, v]) => statItem(l, v ?? 0)).join('');
  document.getElementById('player-dialog').classList.add('open');
}

function openClusterDialog(c) {
  const cat = catalogById(c.cluster);
  const el = document.getElementById('cd-name');
  el.textContent = cat.name;
  el.style.color = cat.color;
  document.getElementById('cd-grid').innerHTML = [
    ['Average Batting', fmt2(c.average_batting)],
    ['Strike Rate Batting', fmt2(c.strike_rate_batting)],
    ['Average Bowling', fmt2(c.average_bowling)],
    ['Economy', fmt2(c.economy)],
    ['Strike Rate Bowling', fmt2(c.strike_rate_bowling)],
    ['Fours Per Inning', fmt2(c.fours_per_inning)],
    ['Sixes Per Inning', fmt2(c.sixes_per_inning)],
    ['Catches Per Match', fmt2(c.catches_per_match)],
    ['Centuries Per Inning', c.centuries_per_inning != null ? Number(c.centuries_per_inning).toFixed(4) : '0.0000'],
    ['Fifties Per Inning', fmt2(c.fifties_per_inning)],
    ['Wickets Per Inning', fmt2(c.wickets_per_inning)],
    ['Maidens Per Inning', fmt2(c.maidens_per_inning)],
  ].map(([l, v]) => statItem(l, v)).join('');
  document.getElementById('cluster-dialog').classList.add('open');
}

// Prediction form is generated from the server's field descriptors.
let fields = [];
async function buildPredictForm() {
  const r = await fetch('/api/fields');
  if (!r.ok) return;
  fields = await r.json();
  document.getElementById('predict-fields').innerHTML = fields.map(f => `
    <div>
      <label for="f-${f.name}">${f.label}</label>
      <input type="number" id="f-${f.name}" name="${f.name}"
             step="${f.kind === 'decimal' ? '0.1' : '1'}" min="0" value="${f.default}">
    </div>`).join('');
}

async function submitPrediction(ev) {
  ev.preventDefault();
  const errEl = document.getElementById('predict-error');
  errEl.textContent = '';
  const body = {};
  for (const f of fields) {
    const v = document.getElementById('f-' + f.name).value;
    body[f.name] = f.kind === 'decimal' ? parseFloat(v || '0') : parseInt(v || '0', 10);
  }
  const btn = document.getElementById('predict-btn');
  btn.disabled = true;
  try {
    const r = await fetch('/api/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    if (!r.ok) throw new Error('predict failed');
    const result = await r.json();
    document.getElementById('pr-dialog').style.background = result.color;
    document.getElementById('pr-name').textContent = result.name;
    document.getElementById('predict-result-dialog').classList.add('open');
  } catch (e) {
    errEl.textContent = 'Failed to fetch prediction';
  } finally {
    btn.disabled = false;
  }
}

async function loadHealth() {
  const r = await fetch('/api/health').catch(() => null);
  if (!r || !r.ok) return;
  const h = await r.json();
  document.getElementById('health').textContent =
    `${h.players} players · ${h.clusters} clusters`;
}

// ── Wiring ──────────────────────────────────────────────────────────────────

document.querySelectorAll('.tab-btn').forEach(btn => btn.addEventListener('click', () => {
  document.querySelectorAll('.tab-btn').forEach(b => b.classList.toggle('active', b === btn));
  for (const tab of ['players', 'clusters', 'predict']) {
    document.getElementById('tab-' + tab).hidden = tab !== btn.dataset.tab;
  }
}));

document.getElementById('search').addEventListener('input', ev => {
  query.search = ev.target.value;
  loadPlayers();
});

document.getElementById('cluster-filter').addEventListener('change', ev => {
  query.cluster = ev.target.value === '' ? null : Number(ev.target.value);
  loadPlayers();
});

document.querySelectorAll('#players-head th.sortable').forEach(th => th.addEventListener('click', () => {
  const key = th.dataset.key;
  if (query.sortKey === key) {
    query.sortOrder = query.sortOrder === 'asc' ? 'desc' : 'asc';
  } else {
    query.sortKey = key;
    query.sortOrder = 'asc';
  }
  renderSortIndicators();
  loadPlayers();
}));

document.getElementById('players-tbody').addEventListener('click', ev => {
  const pill = ev.target.closest('.pill');
  if (pill) {
    // badge click filters by that cluster instead of opening the dialog
    ev.stopPropagation();
    const id = pill.dataset.cluster === 'null' ? null : Number(pill.dataset.cluster);
    query.cluster = id;
    document.getElementById('cluster-filter').value = id === null ? '' : id;
    loadPlayers();
    return;
  }
  const tr = ev.target.closest('tr.clickable');
  if (tr) openPlayerDialog(players[Number(tr.dataset.idx)]);
});

document.querySelectorAll('.overlay').forEach(ov => ov.addEventListener('click', ev => {
  if (ev.target === ov) ov.classList.remove('open');
}));

document.getElementById('predict-form').addEventListener('submit', submitPrediction);

loadCatalog().then(() => {
  renderSortIndicators();
  loadPlayers();
  loadClusters();
  buildPredictForm();
  loadHealth();
});
</script>
</body>
</html>"#;
