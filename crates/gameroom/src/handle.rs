use super::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tpg_core::ID;

/// Handle to a running room: the inbound event sender.
/// Cheap to clone; every bridge task holds one.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    tx: UnboundedSender<Event>,
}

impl RoomHandle {
    pub(crate) fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }
    /// Registers a new connection: mints its id and returns the outbound
    /// message stream. None when the room task has shut down.
    pub fn attach(&self) -> Option<(ID<Connection>, UnboundedReceiver<ServerMessage>)> {
        let conn = ID::default();
        let (tx, rx) = unbounded_channel();
        self.tx.send(Event::Opened { conn, sender: tx }).ok()?;
        Some((conn, rx))
    }
    /// Forwards a decoded client frame to the room.
    pub fn deliver(&self, conn: ID<Connection>, message: ClientMessage) {
        let _ = self.tx.send(Event::Client { conn, message });
    }
    /// Reports a closed connection.
    pub fn detach(&self, conn: ID<Connection>) {
        let _ = self.tx.send(Event::Closed { conn });
    }
}
