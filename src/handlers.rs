use crate::controller::{DashboardView, DrinkOutcome, Notice, NoticeKind};
use crate::errors::AppError;
use crate::models::{
    DailySummary, IntakeRecord, RecordDrinkBody, Settings, SettingsForm, TagSelection, WeeklyReport,
};
use crate::state::AppState;
use crate::stats::build_analytics;
use crate::tags::{TagsView, load_tags};
use crate::ui::{render_analytics, render_dashboard, render_settings, render_tags};
use axum::{
    Form, Json,
    extract::State,
    response::{Html, Redirect},
};
use chrono::{Datelike, Local, Weekday};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkResponse {
    pub outcome: DrinkOutcome,
    pub dashboard: DashboardView,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.dashboard.view().await;
    let notice = state.dashboard.take_notice().await;
    let now = state.clock.now();
    Html(render_dashboard(&view, notice.as_ref(), now, today(&state)))
}

pub async fn drink(State(state): State<AppState>) -> Redirect {
    state.dashboard.record_drink(None).await;
    Redirect::to("/")
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.dashboard.refresh().await;
    Redirect::to("/")
}

pub async fn select_tag(
    State(state): State<AppState>,
    Form(selection): Form<TagSelection>,
) -> Result<Redirect, AppError> {
    let tag = selection.tag.trim();
    if tag.is_empty() {
        return Err(AppError::bad_request("tag must not be empty"));
    }

    info!(%tag, "switching active tag");
    state.dashboard.activate(tag).await;
    Ok(Redirect::to("/"))
}

pub async fn tags_page(State(state): State<AppState>) -> Html<String> {
    let now = state.clock.now();
    let view = load_tags(state.dashboard.api(), state.fallback.as_ref(), now).await;
    let tracked = state.dashboard.active_tag().await;
    let goal_ml = f64::from(state.settings.lock().await.daily_goal);
    let notice = state.dashboard.take_notice().await;
    Html(render_tags(&view, &tracked, goal_ml, notice.as_ref(), now))
}

pub async fn analytics_page(State(state): State<AppState>) -> Html<String> {
    let now = state.clock.now();
    let dashboard = state.dashboard.view().await;
    let notice = state.dashboard.take_notice().await;
    let today = today(&state);

    let analytics = match dashboard.state.data() {
        Some(data) => {
            let tags = load_tags(state.dashboard.api(), state.fallback.as_ref(), now).await;
            Some(build_analytics(
                &data.weekly_report,
                data.daily_summary.goal_ml,
                &tags.tags,
                today,
            ))
        }
        None => None,
    };

    Html(render_analytics(analytics.as_ref(), notice.as_ref(), today))
}

pub async fn settings_page(State(state): State<AppState>) -> Html<String> {
    let settings = state.settings.lock().await.clone();
    let dashboard = state.dashboard.view().await;
    let notice = state.dashboard.take_notice().await;
    Html(render_settings(
        &settings,
        &dashboard,
        state.dashboard.policy(),
        notice.as_ref(),
        state.clock.now(),
    ))
}

pub async fn save_settings(State(state): State<AppState>, Form(form): Form<SettingsForm>) -> Redirect {
    let settings = Settings::from_form(&form);
    debug!(?settings, "saving settings");

    state
        .dashboard
        .set_drink_amount(f64::from(settings.default_drink_amount))
        .await;
    *state.settings.lock().await = settings;
    state
        .dashboard
        .push_notice(Notice::new(
            NoticeKind::Success,
            "Settings saved!",
            "Your preferences have been updated successfully.",
        ))
        .await;

    Redirect::to("/settings")
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

pub async fn get_summary(State(state): State<AppState>) -> Json<DailySummary> {
    let tag = state.dashboard.active_tag().await;
    let summary = match state.dashboard.api().summary(&tag).await {
        Ok(summary) => summary,
        Err(err) => {
            debug!(%tag, "summary unavailable: {err}");
            state.fallback.dashboard(state.clock.now()).daily_summary
        }
    };
    Json(summary)
}

pub async fn get_recent(State(state): State<AppState>) -> Json<Vec<IntakeRecord>> {
    let tag = state.dashboard.active_tag().await;
    let recent = match state.dashboard.api().recent(&tag).await {
        Ok(recent) => recent,
        Err(err) => {
            debug!(%tag, "recent intakes unavailable: {err}");
            state.fallback.dashboard(state.clock.now()).recent_intakes
        }
    };
    Json(recent)
}

pub async fn get_weekly(State(state): State<AppState>) -> Json<WeeklyReport> {
    let tag = state.dashboard.active_tag().await;
    let weekly = match state.dashboard.api().weekly(&tag).await {
        Ok(weekly) => weekly,
        Err(err) => {
            debug!(%tag, "weekly report unavailable: {err}");
            state.fallback.dashboard(state.clock.now()).weekly_report
        }
    };
    Json(weekly)
}

pub async fn get_tags(State(state): State<AppState>) -> Json<TagsView> {
    let now = state.clock.now();
    Json(load_tags(state.dashboard.api(), state.fallback.as_ref(), now).await)
}

pub async fn post_drink(
    State(state): State<AppState>,
    Json(body): Json<RecordDrinkBody>,
) -> Result<Json<DrinkResponse>, AppError> {
    if let Some(amount) = body.amount_ml {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::bad_request("amountMl must be a positive number"));
        }
    }

    let outcome = state.dashboard.record_drink(body.amount_ml).await;
    let dashboard = state.dashboard.view().await;
    Ok(Json(DrinkResponse { outcome, dashboard }))
}

fn today(state: &AppState) -> Weekday {
    state.clock.now().with_timezone(&Local).weekday()
}
