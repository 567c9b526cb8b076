//! Normalization of Trello records into Airdrop item shapes
//!
//! Every extracted record becomes a flat [`NormalizedItem`] with
//! `created_date` derived from the Trello id (the leading 8 hex chars
//! are a unix timestamp in seconds) and `modified_date` from the
//! record's own activity field when present.

use crate::trello::{Attachment, Card, Member};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A normalized record pushed to an item repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: String,
    pub created_date: String,
    pub modified_date: String,
    pub data: serde_json::Value,
}

/// A normalized attachment descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAttachment {
    pub id: String,
    pub url: String,
    pub file_name: String,
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

/// Derive the creation time encoded in a Trello object id.
///
/// Falls back to the current time when the id is too short or not hex.
pub fn created_date_from_id(id: &str) -> DateTime<Utc> {
    if id.len() >= 8 {
        if let Ok(secs) = u32::from_str_radix(&id[..8], 16) {
            if let Some(ts) = Utc.timestamp_opt(i64::from(secs), 0).single() {
                return ts;
            }
        }
    }
    Utc::now()
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split a Trello description into rich-text lines, dropping empties
pub fn to_rich_text(desc: &str) -> Vec<String> {
    desc.split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a Trello card.
///
/// `created_by` comes from the board's createCard action when the
/// enrichment fetch succeeded; it stays `null` otherwise.
pub fn normalize_card(card: &Card, created_by: Option<&str>) -> NormalizedItem {
    let created = created_date_from_id(&card.id);
    let modified = card
        .date_last_activity
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(created, |dt| dt.with_timezone(&Utc));

    NormalizedItem {
        id: card.id.clone(),
        created_date: iso(created),
        modified_date: iso(modified),
        data: json!({
            "name": card.name,
            "url": card.url.clone().unwrap_or_default(),
            "description": to_rich_text(&card.desc),
            "id_members": card.id_members,
            "created_by": created_by,
        }),
    }
}

/// Normalize a Trello member
pub fn normalize_user(member: &Member) -> NormalizedItem {
    let created = created_date_from_id(&member.id);
    let modified = member
        .last_active
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(created, |dt| dt.with_timezone(&Utc));

    NormalizedItem {
        id: member.id.clone(),
        created_date: iso(created),
        modified_date: iso(modified),
        data: json!({
            "full_name": member.full_name.clone().unwrap_or_default(),
            "username": member.username.clone().unwrap_or_default(),
        }),
    }
}

/// Normalize a card attachment
pub fn normalize_attachment(attachment: &Attachment, card_id: &str) -> NormalizedAttachment {
    NormalizedAttachment {
        id: attachment.id.clone(),
        url: attachment.url.clone(),
        file_name: attachment.name.clone(),
        parent_id: card_id.to_string(),
        author_id: attachment.id_member.clone(),
    }
}
