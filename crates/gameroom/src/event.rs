use super::*;
use tokio::sync::mpsc::UnboundedSender;
use tpg_core::ID;

/// Marker for WebSocket connection identity. Connection ids are minted
/// server-side and die with the socket; participant identity is the
/// client-chosen id carried inside messages.
pub struct Connection;

/// Everything that can wake the room task. One inbound stream, one
/// writer: transport bridges and the chance timer both land here.
#[derive(Debug)]
pub enum Event {
    /// A connection opened and can receive server messages.
    Opened {
        conn: ID<Connection>,
        sender: UnboundedSender<ServerMessage>,
    },
    /// A decoded client frame arrived.
    Client {
        conn: ID<Connection>,
        message: ClientMessage,
    },
    /// A connection closed.
    Closed { conn: ID<Connection> },
    /// The chance-draw delay elapsed for the tagged session epoch.
    ChanceDue { epoch: u64 },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Opened { conn, .. } => write!(f, "opened {}", conn),
            Event::Client { conn, message } => write!(f, "{:?} from {}", message, conn),
            Event::Closed { conn } => write!(f, "closed {}", conn),
            Event::ChanceDue { epoch } => write!(f, "chance draw due (epoch {})", epoch),
        }
    }
}
