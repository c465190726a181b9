use session_fetch::{AuthenticatedClient, Config, Credential, ReqwestTransport, SessionEvent};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = Config::from_file("config.json")?;
    let transport = ReqwestTransport::new(&cfg)?;
    let client = AuthenticatedClient::new(cfg, transport)?;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let SessionEvent::Expired { at } = event {
                println!("session expired at {at}; back to sign-in");
            }
        }
    });

    if let Ok(token) = std::env::var("SESSION_FETCH_TOKEN") {
        client.sign_in(Credential::new(token));
    }
    let profile = client.get("/users/me").await?.error_for_status()?;
    println!("{}", profile.text());
    client.logout().await;
    Ok(())
}
