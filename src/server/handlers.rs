use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::SharedState;
use crate::error::{AppError, McpError, McpResult};
use crate::listing::ListingParams;

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "ideas_list" => handle_list(state, arguments).await,
        "ideas_criteria" => handle_criteria(state),
        "ideas_sort_state" => handle_sort_state(state, arguments).await,
        "ideas_end_session" => handle_end_session(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

#[derive(Deserialize)]
struct SessionParams {
    session_id: String,
}

/// Handle ideas_list - ranked listing with optional re-ordering
async fn handle_list(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    // An absent argument object is the plain default listing.
    let params: ListingParams = match arguments {
        Some(_) => parse_arguments("ideas_list", arguments)?,
        None => ListingParams::default(),
    };

    let listing = state.listing.list(&params).await?;
    serde_json::to_value(listing).map_err(McpError::Json)
}

/// Handle ideas_criteria - list the supported ranking criteria
fn handle_criteria(state: &SharedState) -> McpResult<Value> {
    Ok(serde_json::json!({
        "criteria": state.registry.list(),
        "default": state.registry.default_criterion(),
    }))
}

/// Handle ideas_sort_state - show a session's recorded directions
async fn handle_sort_state(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: SessionParams = parse_arguments("ideas_sort_state", arguments)?;

    let sort_state = state
        .listing
        .sort_state(&params.session_id)
        .await
        .map_err(|e| session_error("ideas_sort_state", e))?;
    Ok(serde_json::json!({
        "session_id": params.session_id,
        "directions": sort_state,
    }))
}

/// Handle ideas_end_session - discard a session's recorded directions
async fn handle_end_session(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: SessionParams = parse_arguments("ideas_end_session", arguments)?;

    state
        .listing
        .end_session(&params.session_id)
        .await
        .map_err(|e| session_error("ideas_end_session", e))?;
    Ok(serde_json::json!({
        "session_id": params.session_id,
        "ended": true,
    }))
}

/// Report a blank session handle as a parameter error
fn session_error(tool_name: &str, err: AppError) -> McpError {
    match err {
        AppError::InvalidSession { message } => McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message,
        },
        other => other.into(),
    }
}

/// Parse tool arguments into a typed parameter struct
fn parse_arguments<T: for<'de> Deserialize<'de>>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    let args = arguments.ok_or_else(|| McpError::InvalidParameters {
        tool_name: tool_name.to_string(),
        message: "Missing arguments".to_string(),
    })?;

    serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
        tool_name: tool_name.to_string(),
        message: e.to_string(),
    })
}
