use tpg_gameroom::Protocol;
use tpg_gameroom::Room;
use tpg_gameroom::RoomHandle;

/// Owns the process's single live session and bridges WebSocket
/// connections into its event stream.
pub struct Hall {
    room: RoomHandle,
}

impl Default for Hall {
    fn default() -> Self {
        Self {
            room: Room::new().spawn(),
        }
    }
}

impl Hall {
    /// Spawns the per-connection bridge: room messages out to the socket,
    /// decoded frames in to the room, a close in either direction tears
    /// the connection down and reports it.
    pub async fn bridge(
        &self,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        use futures::StreamExt;
        let (conn, mut rx) = self
            .room
            .attach()
            .ok_or_else(|| anyhow::anyhow!("room is not running"))?;
        let room = self.room.clone();
        log::info!("[hall] connection {} opened", conn);
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Some(ref msg) => if session.text(Protocol::encode(msg)).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => match Protocol::decode(&text) {
                            Ok(message) => room.deliver(conn, message),
                            Err(e) => log::warn!("[hall] dropping frame from {}: {}", conn, e),
                        },
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            room.detach(conn);
            log::info!("[hall] connection {} closed", conn);
        });
        Ok(())
    }
}
