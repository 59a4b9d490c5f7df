use crate::controller::{DashboardView, DataSource, LoadState, Notice, WriteFailurePolicy};
use crate::format::{format_amount, time_ago};
use crate::models::Settings;
use crate::stats::AnalyticsView;
use crate::tags::TagsView;
use crate::widgets::{
    StatTile, Trend, activity_list, escape_html, notice_banner, progress_ring, stat_row, tag_card,
    weekly_chart,
};
use chrono::{DateTime, Utc, Weekday};

const NAV: [(&str, &str); 4] = [
    ("Dashboard", "/"),
    ("Tags", "/tags"),
    ("Analytics", "/analytics"),
    ("Settings", "/settings"),
];

/// Seconds between browser reloads while the server keeps polling.
const PAGE_RELOAD_SECS: u64 = 30;
const LOADING_RELOAD_SECS: u64 = 2;

pub struct Page<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub reload_secs: Option<u64>,
    pub notice: Option<&'a Notice>,
    pub body: String,
}

pub fn render_page(page: Page<'_>) -> String {
    let mut nav = String::new();
    for (label, href) in NAV {
        let class = if href == page.path { " class=\"active\"" } else { "" };
        nav.push_str(&format!(r#"<a href="{href}"{class}>{label}</a>"#));
    }
    let reload = page
        .reload_secs
        .map(|secs| format!(r#"<meta http-equiv="refresh" content="{secs}" />"#))
        .unwrap_or_default();

    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(page.title))
        .replace("{{RELOAD}}", &reload)
        .replace("{{NAV}}", &nav)
        .replace("{{NOTICE}}", &notice_banner(page.notice))
        .replace("{{BODY}}", &page.body)
}

fn header(title: &str, subtitle: &str, actions: &str) -> String {
    format!(
        r#"<header><div><h1>{}</h1><p class="subtitle">{}</p></div><div class="actions">{actions}</div></header>"#,
        escape_html(title),
        escape_html(subtitle)
    )
}

fn centered(message: &str, spinner: bool) -> String {
    let spinner = if spinner { r#"<div class="spinner"></div>"# } else { "" };
    format!(r#"<section class="card centered">{spinner}<p class="hint">{message}</p></section>"#)
}

pub fn render_dashboard(view: &DashboardView, notice: Option<&Notice>, now: DateTime<Utc>, today: Weekday) -> String {
    let body = match &view.state {
        LoadState::Loading => centered("Loading your hydration data...", true),
        LoadState::Ready(data) => {
            let summary = &data.daily_summary;
            let report = &data.weekly_report;
            let refresh_label = if view.refreshing { "Refreshing..." } else { "Refresh" };
            let actions = format!(
                r#"<form method="post" action="/refresh"><button class="btn-ghost" type="submit"{}>{refresh_label}</button></form>
<form method="post" action="/drink"><button class="btn-add" type="submit">+ Add Drink ({})</button></form>"#,
                if view.refreshing { " disabled" } else { "" },
                format_amount(view.drink_amount_ml),
            );

            let tiles = stat_row(&[
                StatTile {
                    title: "Weekly Average",
                    value: format_amount(report.weekly_average),
                    subtitle: Some("Backend reported"),
                    trend: Trend::Up,
                },
                StatTile {
                    title: "Best Day",
                    value: format_amount(report.best_day),
                    subtitle: Some("This week"),
                    trend: Trend::Neutral,
                },
                StatTile {
                    title: "Current Streak",
                    value: format!("{} days", report.current_streak),
                    subtitle: Some("Meeting daily goal"),
                    trend: Trend::Neutral,
                },
            ]);

            format!(
                r#"{header}
<section class="grid">
  <div class="card centered">
    <h2>Today's Progress</h2>
    {ring}
    <div class="split">
      <div><span class="value">{remaining}</span><span class="label">Remaining</span></div>
      <div><span class="value">{drinks}</span><span class="label">Drinks</span></div>
    </div>
  </div>
  <div class="stack">{tiles}{chart}</div>
</section>
<section class="grid two">
  {activity}
  <div class="card">
    <h3>Hydration Tips</h3>
    <div class="tip"><strong>Morning Kickstart</strong><p class="hint">Drink a glass of water first thing in the morning to jumpstart your metabolism.</p></div>
    <div class="tip"><strong>Pre-meal Hydration</strong><p class="hint">Drink water 30 minutes before meals to aid digestion.</p></div>
    <div class="tip"><strong>Exercise Ready</strong><p class="hint">Hydrate extra before, during, and after physical activity.</p></div>
  </div>
</section>
<p class="hint">Tag {tag}{source}</p>"#,
                header = header(
                    "Hydration Dashboard",
                    "Track your daily water intake and stay healthy",
                    &actions
                ),
                ring = progress_ring(summary),
                remaining = format_amount(summary.remaining_ml),
                drinks = summary.drink_count,
                chart = weekly_chart(&report.daily_totals, summary.goal_ml, today),
                activity = activity_list(&data.recent_intakes, now),
                tag = escape_html(&view.tag),
                source = match view.source {
                    Some(DataSource::Fallback) => " - sample data",
                    _ => "",
                },
            )
        }
    };

    let reload = match view.state {
        LoadState::Loading => LOADING_RELOAD_SECS,
        LoadState::Ready(_) => PAGE_RELOAD_SECS,
    };
    render_page(Page {
        title: "Hydration Dashboard",
        path: "/",
        reload_secs: Some(reload),
        notice,
        body,
    })
}

pub fn render_tags(view: &TagsView, tracked: &str, goal_ml: f64, notice: Option<&Notice>, now: DateTime<Utc>) -> String {
    let tiles = stat_row(&[
        StatTile {
            title: "Active Tags",
            value: view.totals.active_tags.to_string(),
            subtitle: Some("Registered devices"),
            trend: Trend::Neutral,
        },
        StatTile {
            title: "Today's Total",
            value: format_amount(view.totals.today_total_ml),
            subtitle: Some("All tags combined"),
            trend: Trend::Neutral,
        },
        StatTile {
            title: "Weekly Average",
            value: format_amount(view.totals.weekly_average_ml),
            subtitle: Some("Across all tags"),
            trend: Trend::Neutral,
        },
    ]);

    let mut cards = String::new();
    for tag in &view.tags {
        cards.push_str(&tag_card(tag, goal_ml, now, tag.rfid_tag == tracked));
    }
    if view.tags.is_empty() {
        cards.push_str(&centered("No tags registered yet", false));
    }

    let source = match view.source {
        DataSource::Fallback => r#"<p class="hint">Showing sample tags; the hydration service is unreachable.</p>"#,
        DataSource::Live => "",
    };

    render_page(Page {
        title: "RFID Tags",
        path: "/tags",
        reload_secs: None,
        notice,
        body: format!(
            r#"{}{tiles}<section class="grid three">{cards}</section>{source}"#,
            header("RFID Tags", "Manage your water bottles and tracking devices", "")
        ),
    })
}

pub fn render_analytics(view: Option<&AnalyticsView>, notice: Option<&Notice>, today: Weekday) -> String {
    let Some(view) = view else {
        return render_page(Page {
            title: "Analytics",
            path: "/analytics",
            reload_secs: Some(LOADING_RELOAD_SECS),
            notice,
            body: centered("Loading your hydration data...", true),
        });
    };

    let tiles = stat_row(&[
        StatTile {
            title: "Average Daily",
            value: format_amount(view.average_daily_ml),
            subtitle: Some("This week"),
            trend: Trend::Neutral,
        },
        StatTile {
            title: "Current Streak",
            value: format!("{} days", view.current_streak),
            subtitle: Some("Meeting daily goal"),
            trend: Trend::Neutral,
        },
        StatTile {
            title: "Goal Achievement",
            value: format!("{}%", view.goal_achievement.round()),
            subtitle: Some("Days above target"),
            trend: if view.goal_achievement >= 50.0 { Trend::Up } else { Trend::Down },
        },
        StatTile {
            title: "Total Intake",
            value: format_amount(view.total_intake_ml),
            subtitle: Some("This week"),
            trend: Trend::Neutral,
        },
    ]);

    let totals: Vec<f64> = view.days.iter().map(|day| day.amount_ml).collect();
    let mut shares = String::new();
    for share in &view.tag_shares {
        shares.push_str(&format!(
            r#"<div class="row"><strong>{}</strong><span class="hint">{}</span></div><div class="meter"><div class="meter-fill" style="width: {:.1}%"></div></div>"#,
            escape_html(&share.name),
            format_amount(share.amount_ml),
            share.share.clamp(0.0, 100.0),
        ));
    }
    if shares.is_empty() {
        shares.push_str(r#"<p class="hint">No tag activity today</p>"#);
    }

    render_page(Page {
        title: "Analytics",
        path: "/analytics",
        reload_secs: None,
        notice,
        body: format!(
            r#"{header}{tiles}
<section class="grid">
  {chart}
  <div class="card">
    <h3>Insights</h3>
    <div class="tip"><strong>Best day</strong><p class="hint">{best} this week, {at_goal} of 7 days at goal.</p></div>
  </div>
</section>
<section class="card"><h3>Tag Performance</h3>{shares}</section>"#,
            header = header("Analytics", "Deep insights into your hydration patterns", ""),
            chart = weekly_chart(&totals, view.goal_ml, today),
            best = format_amount(view.best_day_ml),
            at_goal = view.days_at_goal,
        ),
    })
}

pub fn render_settings(
    settings: &Settings,
    dashboard: &DashboardView,
    policy: WriteFailurePolicy,
    notice: Option<&Notice>,
    now: DateTime<Utc>,
) -> String {
    let (status, dot) = match dashboard.source {
        Some(DataSource::Live) => ("Connected", "dot-excellent"),
        Some(DataSource::Fallback) => ("Offline", "dot-critical"),
        None => ("Connecting...", "dot-muted"),
    };
    let last_sync = dashboard
        .last_sync
        .map(|at| time_ago(at, now))
        .unwrap_or_else(|| "Never".to_string());
    let on_failure = match policy {
        WriteFailurePolicy::KeepOptimistic => "Keep local update",
        WriteFailurePolicy::Rollback => "Roll back",
    };

    render_page(Page {
        title: "Settings",
        path: "/settings",
        reload_secs: None,
        notice,
        body: format!(
            r#"<form method="post" action="/settings">
{header}
<section class="grid two">
  <div class="card">
    <h3>Hydration Goals</h3>
    <label for="daily_goal">Daily Water Goal (ml)</label>
    <input id="daily_goal" name="daily_goal" type="number" value="{goal}" />
    <p class="hint">Recommended: 2000ml (2L) per day</p>
    <label for="default_drink_amount">Default Drink Amount (ml)</label>
    <input id="default_drink_amount" name="default_drink_amount" type="number" value="{drink}" />
    <p class="hint">Amount recorded per RFID tag scan</p>
  </div>
  <div class="card">
    <h3>Notifications</h3>
    <label><input name="notifications" type="checkbox"{checked} /> Enable Reminders</label>
    <label for="reminder_interval">Reminder Interval (minutes)</label>
    <input id="reminder_interval" name="reminder_interval" type="number" value="{interval}" />
  </div>
  <div class="card">
    <h3>System Settings</h3>
    <label for="timezone">Timezone</label>
    <input id="timezone" name="timezone" value="{timezone}" />
  </div>
  <div class="card">
    <h3>About AquaTrack</h3>
    <div class="row"><span class="hint">Version</span><span>{version}</span></div>
    <div class="row"><span class="hint">Backend Status</span><span><span class="dot {dot}"></span> {status}</span></div>
    <div class="row"><span class="hint">Last Sync</span><span>{last_sync}</span></div>
    <div class="row"><span class="hint">Failed writes</span><span>{on_failure}</span></div>
  </div>
</section>
</form>"#,
            header = header(
                "Settings",
                "Customize your hydration tracking experience",
                r#"<button class="btn-add" type="submit">Save Changes</button>"#
            ),
            goal = settings.daily_goal,
            drink = settings.default_drink_amount,
            checked = if settings.notifications { " checked" } else { "" },
            interval = settings.reminder_interval,
            timezone = escape_html(&settings.timezone),
            version = env!("CARGO_PKG_VERSION"),
        ),
    })
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{RELOAD}}
  <title>{{TITLE}} - AquaTrack</title>
  <style>
    :root {
      --bg-1: #eaf4fb;
      --bg-2: #bfe3f7;
      --ink: #1f2d3a;
      --accent: #1d8fe1;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      --excellent: #10b981;
      --good: #3b82f6;
      --moderate: #f59e0b;
      --low: #f97316;
      --critical: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #dff1fb 60%, #f4fafd 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    nav {
      display: flex;
      gap: 6px;
      padding: 6px;
      margin: 0 auto 24px;
      width: fit-content;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    nav a {
      padding: 8px 14px;
      border-radius: 999px;
      color: #4d5b66;
      font-weight: 600;
      text-decoration: none;
    }

    nav a.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    h1 {
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    h2, h3 {
      margin: 0 0 12px;
    }

    .subtitle {
      margin: 0;
      color: #5f6b75;
    }

    .actions {
      display: flex;
      gap: 12px;
    }

    .grid {
      display: grid;
      grid-template-columns: minmax(280px, 1fr) 2fr;
      gap: 24px;
    }

    .grid.two {
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
    }

    .grid.three {
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
    }

    .stack {
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    .centered {
      text-align: center;
      display: grid;
      justify-items: center;
      gap: 12px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .label {
      display: block;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8791;
    }

    .value {
      display: block;
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .trend-up { color: var(--good); }
    .trend-down { color: var(--critical); }
    .trend-neutral { color: #7b8791; }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button[disabled] {
      opacity: 0.6;
    }

    .btn-add {
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(29, 143, 225, 0.3);
    }

    .btn-ghost {
      background: white;
      color: var(--accent-2);
    }

    .ring {
      position: relative;
      width: 240px;
      height: 240px;
    }

    .ring-svg {
      transform: rotate(-90deg);
    }

    .ring-track {
      stroke: rgba(47, 72, 88, 0.15);
    }

    .progress-ring {
      animation: ring-fill 0.8s cubic-bezier(0.4, 0, 0.2, 1) 300ms both;
    }

    @keyframes ring-fill {
      from { stroke-dashoffset: var(--ring-from); }
      to { stroke-dashoffset: var(--ring-to); }
    }

    .ring-center {
      position: absolute;
      inset: 0;
      display: grid;
      place-content: center;
      text-align: center;
    }

    .ring-value {
      font-size: 2.4rem;
      font-weight: 700;
    }

    .ring-caption {
      color: #6b7780;
      font-size: 0.9rem;
    }

    .badge {
      padding: 8px 16px;
      border-radius: 999px;
      font-weight: 600;
      background: rgba(47, 72, 88, 0.06);
    }

    .hydration-excellent { color: var(--excellent); }
    .hydration-good { color: var(--good); }
    .hydration-moderate { color: var(--moderate); }
    .hydration-low { color: var(--low); }
    .hydration-critical { color: var(--critical); }

    .split {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 16px;
      width: 100%;
      padding-top: 16px;
      border-top: 1px solid rgba(47, 72, 88, 0.1);
    }

    .bars {
      position: relative;
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      align-items: end;
      gap: 12px;
      height: 220px;
      padding-bottom: 22px;
    }

    .bars::after {
      content: "";
      position: absolute;
      left: 0;
      right: 0;
      bottom: calc(22px + (100% - 22px) * var(--goal-line) / 100%);
      border-top: 2px dashed rgba(47, 72, 88, 0.25);
    }

    .bar {
      position: relative;
      height: 100%;
      display: flex;
      align-items: flex-end;
    }

    .bar-fill {
      width: 100%;
      border-radius: 6px 6px 0 0;
      background: var(--good);
    }

    .bar.today .bar-fill {
      background: var(--accent);
    }

    .bar-label {
      position: absolute;
      bottom: -22px;
      width: 100%;
      text-align: center;
      font-size: 0.8rem;
      color: #7b8791;
    }

    .chart-footer, .row {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      margin-top: 12px;
    }

    .divider {
      padding-top: 8px;
      border-top: 1px solid rgba(47, 72, 88, 0.1);
    }

    .activity-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .activity {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 12px;
      border-radius: 14px;
      background: rgba(29, 143, 225, 0.08);
    }

    .activity div {
      display: grid;
    }

    .tip {
      padding: 12px;
      margin-bottom: 10px;
      border-radius: 14px;
      background: rgba(29, 143, 225, 0.08);
    }

    .tag-head {
      display: flex;
      justify-content: space-between;
      align-items: flex-start;
    }

    .pill {
      padding: 6px 12px;
      border-radius: 999px;
      background: rgba(16, 185, 129, 0.15);
      color: var(--excellent);
      font-weight: 600;
    }

    .meter {
      height: 8px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      margin-top: 8px;
    }

    .meter-fill {
      height: 8px;
      border-radius: 999px;
      background: linear-gradient(90deg, var(--accent), var(--excellent));
    }

    .dot {
      display: inline-block;
      width: 8px;
      height: 8px;
      border-radius: 50%;
    }

    .dot-excellent { background: var(--excellent); }
    .dot-moderate { background: var(--moderate); }
    .dot-critical { background: var(--critical); }
    .dot-muted { background: #9aa5ad; }

    label {
      display: block;
      margin-top: 12px;
      font-weight: 600;
    }

    input[type="number"], input:not([type]) {
      width: 100%;
      margin-top: 6px;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
    }

    .spinner {
      width: 48px;
      height: 48px;
      border-radius: 50%;
      border: 4px solid rgba(29, 143, 225, 0.2);
      border-bottom-color: var(--accent);
      animation: spin 1s linear infinite;
    }

    .status {
      padding: 12px 16px;
      border-radius: 14px;
      background: white;
      color: #4d5b66;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hint, .more {
      margin: 0;
      color: #6f7a83;
      font-size: 0.9rem;
    }

    @keyframes spin {
      to { transform: rotate(360deg); }
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 760px) {
      .grid {
        grid-template-columns: 1fr;
      }
      button {
        width: 100%;
      }
    }
  </style>
</head>
<body>
  <nav>{{NAV}}</nav>
  <main class="app">
    {{NOTICE}}
    {{BODY}}
  </main>
</body>
</html>
"#;
