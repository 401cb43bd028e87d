// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

// Alerta efêmero da interface. Persistido como JSON no estado do aplicativo,
// não tem tabela própria.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub timestamp: DateTime<Utc>,
    pub read: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    // Identificador estável da condição de origem (ex.: "expiring_7").
    // É ele que vai para a lista de "já vistos" na deduplicação.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub link: Option<String>,
}
