use axum::Json;
use axum::extract::{Query, State};
use chrono::{Local, Utc};
use collections_core::{AgentKind, CustomerInfo};
use serde::Deserialize;
use serde_json::{Value, json};

use super::rooms::RoomInfo;
use super::{AppState, ApiError, accounts};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Missing, null, zero and empty values all count as absent.
fn truthy(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    room: Option<String>,
    username: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
    /// Agent kind for a room this request creates; defaults to the assistant.
    #[serde(default)]
    agent: Option<String>,
}

/// `POST /api/token`: a join token for `room`, creating the room and its
/// agent if it does not exist yet.
pub async fn create_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(room), Some(username)) = (present(&request.room), present(&request.username)) else {
        return Err(ApiError::BadRequest("Room and username are required".to_string()));
    };
    let tokens = state.tokens()?;

    if state.rooms.get(room).is_none() {
        let kind = match present(&request.agent) {
            Some(agent) => agent.parse::<AgentKind>().map_err(ApiError::BadRequest)?,
            None => AgentKind::Assistant,
        };
        let metadata = request
            .metadata
            .as_ref()
            .filter(|m| !m.is_null())
            .map(Value::to_string);
        state.open_room(room, kind, metadata)?;
    }

    let metadata = request.metadata.unwrap_or_else(|| json!({}));
    let token = tokens.issue(username, room, &metadata, Utc::now())?;
    Ok(Json(json!({ "token": token, "url": state.service_url })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCallRequest {
    phone_number: Option<String>,
    customer_name: Option<String>,
    amount_owed: Option<Value>,
    account_number: Option<String>,
    days_overdue: Option<Value>,
    payment_due_date: Option<String>,
}

/// `POST /api/collections/initiate-call`: opens an outbound collections room
/// whose metadata describes the customer.
pub async fn initiate_call(
    State(state): State<AppState>,
    Json(request): Json<InitiateCallRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(phone_number), Some(customer_name)) = (
        present(&request.phone_number),
        present(&request.customer_name),
    ) else {
        return Err(missing_call_fields());
    };
    if !truthy(&request.amount_owed) {
        return Err(missing_call_fields());
    }

    let now = Utc::now();
    let millis = now.timestamp_millis();
    let room_name = format!("call-{millis}-{phone_number}");
    let call_id = format!("CALL-{millis}");
    let account_number = present(&request.account_number)
        .map(str::to_string)
        .unwrap_or_else(|| format!("ACC-{millis}"));
    let days_overdue = if truthy(&request.days_overdue) {
        request.days_overdue.clone().unwrap_or(Value::Null)
    } else {
        json!(30)
    };

    let mut metadata = json!({
        "callId": call_id,
        "phoneNumber": phone_number,
        "customerName": customer_name,
        "amountOwed": request.amount_owed,
        "accountNumber": account_number,
        "daysOverdue": days_overdue,
        "callType": "outbound_collection",
        "initiatedAt": now.to_rfc3339(),
    });
    if let Some(due) = present(&request.payment_due_date) {
        metadata["paymentDueDate"] = json!(due);
    }

    // The outbound agent parses the same metadata; reject what it would.
    let metadata = metadata.to_string();
    CustomerInfo::from_metadata(Some(&metadata), Local::now().date_naive())
        .map_err(|e| ApiError::BadRequest(format!("Invalid call details: {e}")))?;

    state.open_room(&room_name, AgentKind::Outbound, Some(metadata))?;

    let call = json!({
        "callId": call_id,
        "roomName": room_name,
        "phoneNumber": phone_number,
        "customerName": customer_name,
        "amountOwed": request.amount_owed,
        "accountNumber": account_number,
        "status": "initiating",
        "message": "Call is being connected. Agent will join automatically.",
    });
    tracing::info!("Initiating collection call: {}", call);
    Ok(Json(call))
}

fn missing_call_fields() -> ApiError {
    ApiError::BadRequest("Phone number, customer name, and amount are required".to_string())
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    room: Option<String>,
}

fn call_state(room: &RoomInfo) -> &'static str {
    match room.participants.len() {
        0 => "initiating",
        1 => "waiting",
        _ => "connected",
    }
}

/// `GET /api/collections/status?room=`
pub async fn call_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(name) = present(&query.room) else {
        return Err(ApiError::BadRequest("Room name is required".to_string()));
    };
    let Some(room) = state.rooms.get(name) else {
        return Ok(Json(json!({
            "status": "not_found",
            "message": "Call not found or has ended",
        })));
    };

    let metadata = room
        .metadata
        .as_deref()
        .and_then(|m| serde_json::from_str::<Value>(m).ok())
        .unwrap_or_else(|| json!({}));
    Ok(Json(json!({
        "status": call_state(&room),
        "room": {
            "name": room.name,
            "sid": room.sid,
            "createdAt": room.created_at,
            "participantCount": room.participants.len(),
        },
        "metadata": metadata,
        "participants": room.participants,
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "accountNumber")]
    account_number: Option<String>,
    #[serde(rename = "dateOfBirth")]
    date_of_birth: Option<String>,
    #[serde(rename = "lastFourSSN")]
    last_four_ssn: Option<String>,
}

/// `POST /api/collections/verify`
pub async fn verify_account(Json(request): Json<VerifyRequest>) -> Result<Json<Value>, ApiError> {
    let account = accounts::find(
        present(&request.last_four_ssn),
        present(&request.account_number),
    )
    .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if present(&request.date_of_birth).is_none() {
        return Err(ApiError::BadRequest(
            "Date of birth required for verification".to_string(),
        ));
    }

    Ok(Json(json!({ "verified": true, "account": account })))
}
