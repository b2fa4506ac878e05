//! Game Server Binary
//!
//! Hosts the live public-goods session on BIND_ADDR (e.g. 0.0.0.0:8888).

#[tokio::main]
async fn main() {
    tpg_core::log();
    tpg_core::kys();
    tpg_server::run().await.unwrap();
}
