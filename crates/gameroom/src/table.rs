use super::*;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tpg_core::ID;

/// Connection registry and administrator claim.
/// Routes server messages to live connections. At most one connection
/// holds the admin claim; a newer login takes it over, a close revokes it.
#[derive(Debug, Default)]
pub struct Table {
    senders: HashMap<ID<Connection>, UnboundedSender<ServerMessage>>,
    admin: Option<ID<Connection>>,
}

impl Table {
    /// Registers a connection's outbound sender.
    pub fn open(&mut self, conn: ID<Connection>, sender: UnboundedSender<ServerMessage>) {
        self.senders.insert(conn, sender);
    }
    /// Drops a connection. Returns true when it held the admin claim,
    /// which the caller announces to the remaining clients.
    pub fn close(&mut self, conn: ID<Connection>) -> bool {
        self.senders.remove(&conn);
        if self.admin == Some(conn) {
            self.admin = None;
            true
        } else {
            false
        }
    }
    /// Claims the admin console for a connection, displacing any holder.
    pub fn claim_admin(&mut self, conn: ID<Connection>) {
        if let Some(previous) = self.admin.filter(|p| *p != conn) {
            log::info!("[table] admin claim moves from {} to {}", previous, conn);
        }
        self.admin = Some(conn);
    }
    pub fn admin(&self) -> Option<ID<Connection>> {
        self.admin
    }
    /// Sends to one connection.
    pub fn unicast(&self, conn: ID<Connection>, message: ServerMessage) {
        match self.senders.get(&conn).map(|inbox| inbox.send(message)) {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("[table] unicast to {} failed: {:?}", conn, e),
            None => log::debug!("[table] unicast to {}: no such connection", conn),
        }
    }
    /// Sends to every connection, admin included.
    pub fn broadcast(&self, message: ServerMessage) {
        for (conn, inbox) in &self.senders {
            if let Err(e) = inbox.send(message.clone()) {
                log::warn!("[table] broadcast to {} failed: {:?}", conn, e);
            }
        }
    }
    /// Sends to the admin console, if one is claimed.
    pub fn to_admin(&self, message: ServerMessage) {
        if let Some(conn) = self.admin {
            self.unicast(conn, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn admin_claim_moves_and_revokes() {
        let mut table = Table::default();
        let (tx, _rx) = unbounded_channel();
        let a = ID::default();
        let b = ID::default();
        table.open(a, tx.clone());
        table.open(b, tx);
        table.claim_admin(a);
        assert_eq!(table.admin(), Some(a));
        table.claim_admin(b);
        assert_eq!(table.admin(), Some(b));
        assert!(table.close(b));
        assert_eq!(table.admin(), None);
    }
    #[test]
    fn closing_a_player_keeps_the_claim() {
        let mut table = Table::default();
        let (tx, _rx) = unbounded_channel();
        let admin = ID::default();
        let player = ID::default();
        table.open(admin, tx.clone());
        table.open(player, tx);
        table.claim_admin(admin);
        assert!(!table.close(player));
        assert_eq!(table.admin(), Some(admin));
    }
    #[test]
    fn unicast_and_broadcast_deliver() {
        let mut table = Table::default();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        let a = ID::default();
        let b = ID::default();
        table.open(a, tx_a);
        table.open(b, tx_b);
        table.unicast(a, ServerMessage::game_started(1, 5));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
        table.broadcast(ServerMessage::new_round(1, 5));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }
    #[test]
    fn to_admin_without_claim_is_a_noop() {
        let table = Table::default();
        table.to_admin(ServerMessage::update_punish_count(0));
    }
}
