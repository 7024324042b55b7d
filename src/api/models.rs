use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// The backend hands out numeric ids for some records and string ids for
// others. Both forms are kept as received so requests echo them unchanged.
macro_rules! wire_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(untagged)]
        pub enum $name {
            Number(u64),
            Text(String),
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    Self::Number(n) => write!(f, "{n}"),
                    Self::Text(s) => f.write_str(s),
                }
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                // "007" or "+5" parse as numbers but would not print back the same.
                match s.parse::<u64>() {
                    Ok(n) if n.to_string() == s => Self::Number(n),
                    _ => Self::Text(s.to_string()),
                }
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self::Number(n)
            }
        }
    };
}

wire_id!(
    /// Identifier of a conversation, stable across reloads.
    ConversationId
);

wire_id!(
    /// Identifier of a driver or passenger account.
    UserId
);

/// The passenger on the other side of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: UserId,
    pub name: String,
}

impl Passenger {
    /// First character of the display name, used as an avatar.
    pub fn avatar_glyph(&self) -> Option<char> {
        self.name.trim_start().chars().next()
    }
}

/// One conversation between the driver and a passenger, as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(rename = "from")]
    pub counterparty: Passenger,
    #[serde(rename = "message", default)]
    pub last_message: String,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
}

/// Body of `getMessages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub data: Vec<Conversation>,
}

/// One-to-one message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub from: UserId,
    pub to: UserId,
    pub message: String,
}

/// Broadcast payload; recipients are resolved by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMessage {
    #[serde(rename = "driverId")]
    pub driver_id: UserId,
    pub message: String,
}
