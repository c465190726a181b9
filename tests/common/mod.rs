use session_fetch::{AuthenticatedClient, Config, Credential, ReqwestTransport};
use wiremock::MockServer;

pub fn client(server: &MockServer, token: Option<&str>) -> AuthenticatedClient<ReqwestTransport> {
    let config = Config::from_values(server.uri());
    let transport = ReqwestTransport::new(&config).expect("transport");
    let client = AuthenticatedClient::new(config, transport).expect("client");
    if let Some(token) = token {
        client.sign_in(Credential::new(token));
    }
    client
}
