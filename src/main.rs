#[tokio::main]
async fn main() {
    guestbook_api::start_server().await;
}
