//! Enhancement API endpoints

use api_types::enhancement::{
    ApplyEnhancement, ApplyEnhancementResponse, EnhancementListResponse, EnhancementView,
    VerdictView,
};
use api_types::costs::CostScheduleResponse;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::EnhancementKind) -> api_types::EnhancementKind {
    match kind {
        engine::EnhancementKind::Priority => api_types::EnhancementKind::Priority,
        engine::EnhancementKind::Aura => api_types::EnhancementKind::Aura,
    }
}

fn map_kind_in(kind: api_types::EnhancementKind) -> engine::EnhancementKind {
    match kind {
        api_types::EnhancementKind::Priority => engine::EnhancementKind::Priority,
        api_types::EnhancementKind::Aura => engine::EnhancementKind::Aura,
    }
}

fn map_tag(tag: engine::AuraTag) -> api_types::AuraTag {
    match tag {
        engine::AuraTag::Romantic => api_types::AuraTag::Romantic,
        engine::AuraTag::Gaming => api_types::AuraTag::Gaming,
        engine::AuraTag::Adventure => api_types::AuraTag::Adventure,
        engine::AuraTag::Cozy => api_types::AuraTag::Cozy,
        engine::AuraTag::Mystic => api_types::AuraTag::Mystic,
    }
}

fn map_tag_in(tag: api_types::AuraTag) -> engine::AuraTag {
    match tag {
        api_types::AuraTag::Romantic => engine::AuraTag::Romantic,
        api_types::AuraTag::Gaming => engine::AuraTag::Gaming,
        api_types::AuraTag::Adventure => engine::AuraTag::Adventure,
        api_types::AuraTag::Cozy => engine::AuraTag::Cozy,
        api_types::AuraTag::Mystic => engine::AuraTag::Mystic,
    }
}

fn map_enhancement(enhancement: engine::Enhancement) -> EnhancementView {
    EnhancementView {
        id: enhancement.id,
        wish_id: enhancement.wish_id,
        kind: map_kind(enhancement.kind),
        level: enhancement.level,
        aura_tag: enhancement.aura_tag.map(map_tag),
        cost: enhancement.cost,
        applied_by: enhancement.applied_by,
        applied_at: enhancement.applied_at,
    }
}

fn build_cmd(payload: ApplyEnhancement) -> engine::ApplyEnhancementCmd {
    let mut cmd = engine::ApplyEnhancementCmd::new(
        payload.wish_id,
        payload.user_id,
        map_kind_in(payload.kind),
    );
    if let Some(level) = payload.level {
        cmd = cmd.level(level);
    }
    if let Some(tag) = payload.aura_tag {
        cmd = cmd.aura_tag(map_tag_in(tag));
    }
    if let Some(context) = payload.context {
        cmd = cmd.context(context);
    }
    cmd
}

pub async fn apply(
    State(state): State<ServerState>,
    Json(payload): Json<ApplyEnhancement>,
) -> Result<Json<ApplyEnhancementResponse>, ServerError> {
    let applied = state.engine.apply_enhancement(build_cmd(payload)).await?;

    Ok(Json(ApplyEnhancementResponse {
        enhancement: map_enhancement(applied.enhancement),
        remaining_balance: applied.remaining_balance,
    }))
}

pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ApplyEnhancement>,
) -> Result<Json<VerdictView>, ServerError> {
    let verdict = state.engine.validate_enhancement(&build_cmd(payload)).await?;

    Ok(Json(VerdictView {
        is_valid: verdict.is_valid,
        can_apply: verdict.can_apply,
        cost: verdict.cost,
        errors: verdict.errors,
        current_level: verdict.current_level,
    }))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(wish_id): Path<Uuid>,
) -> Result<Json<EnhancementListResponse>, ServerError> {
    let enhancements = state.engine.list_enhancements(wish_id).await?;

    Ok(Json(EnhancementListResponse {
        enhancements: enhancements.into_iter().map(map_enhancement).collect(),
    }))
}

pub async fn costs() -> Json<CostScheduleResponse> {
    Json(CostScheduleResponse {
        schedule: engine::cost_schedule(),
        balance_ceiling: engine::BALANCE_CEILING,
    })
}
