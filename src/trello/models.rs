//! Typed Trello API models
//!
//! Wire names are camelCase on the Trello side; fields the API omits
//! (depending on the `fields` filter of the request) all default.

use serde::{Deserialize, Serialize};

/// A Trello board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, rename = "idOrganization")]
    pub id_organization: Option<String>,
    #[serde(default, rename = "shortUrl")]
    pub short_url: Option<String>,
}

/// A Trello card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, rename = "idList")]
    pub id_list: Option<String>,
    #[serde(default, rename = "idBoard")]
    pub id_board: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "shortUrl")]
    pub short_url: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default, rename = "dueComplete")]
    pub due_complete: bool,
    #[serde(default, rename = "dateLastActivity")]
    pub date_last_activity: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default, rename = "idMembers")]
    pub id_members: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A label attached to a card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A Trello member (user)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(default, rename = "lastActive")]
    pub last_active: Option<String>,
}

/// A file attachment on a card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "idMember")]
    pub id_member: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A board or card action (only createCard actions are fetched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(default, rename = "idMemberCreator")]
    pub id_member_creator: Option<String>,
    #[serde(default, rename = "type")]
    pub action_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}
