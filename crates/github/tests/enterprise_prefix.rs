//! Requests against a GitHub Enterprise style base URL keep its path prefix.

use ghp_core::{CollaboratorIdentity, TeamRepoIdentity};
use ghp_github::{Client, ClientOpts};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn enterprise_client(server: &MockServer) -> Result<Client, ghp_github::Error> {
    let base = format!("{}/api/v3", server.uri());
    Client::new(ClientOpts::new(Some(&base), "ghe-token")?.with_verbose(true))
}

#[tokio::test]
async fn collaborator_calls_use_prefix_and_token() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/repos/acme/widgets/collaborators/bob"))
        .and(header("authorization", "token ghe-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = enterprise_client(&server)?;
    let id = CollaboratorIdentity {
        org: "acme".into(),
        repo: "widgets".into(),
        username: "bob".into(),
    };

    assert!(client.collaborators().exists(&id).await?);
    Ok(())
}

#[tokio::test]
async fn team_repo_revoke_uses_prefix() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/orgs/acme/teams/platform/repos/acme/widgets"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = enterprise_client(&server)?;
    let id = TeamRepoIdentity {
        org: "acme".into(),
        team_slug: "platform".into(),
        owner: "acme".into(),
        repo: "widgets".into(),
    };

    client.team_repos().revoke(&id).await?;
    Ok(())
}
