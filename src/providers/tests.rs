use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};

use super::mock::MockProvider;
use super::trello::TrelloProvider;
use super::{ActionQuery, ApiError, NewWebhook, Provider};
use crate::config::TrelloConfig;
use crate::model::action::ActionType;
use crate::model::card::{Card, CardUpdate};

fn auth() -> Vec<Matcher> {
    vec![
        Matcher::UrlEncoded("key".into(), "k".into()),
        Matcher::UrlEncoded("token".into(), "t".into()),
    ]
}

fn with_auth(mut extra: Vec<Matcher>) -> Matcher {
    extra.extend(auth());
    Matcher::AllOf(extra)
}

fn provider(server: &Server) -> TrelloProvider {
    TrelloProvider::new(server.url(), "k".into(), "t".into()).unwrap()
}

fn sample_card(id: &str) -> Card {
    serde_json::from_value(serde_json::json!({"id": id, "name": "Crash", "idList": "l1"})).unwrap()
}

#[test]
fn missing_credentials_fail_before_any_request() {
    let err = TrelloProvider::new("http://localhost", "".into(), "t".into())
        .err()
        .unwrap();
    assert!(matches!(err, ApiError::MissingCredentials));

    assert!(matches!(
        TrelloProvider::from_config(None).err().unwrap(),
        ApiError::MissingCredentials
    ));

    let blank = TrelloConfig {
        api_key: "k".into(),
        token: "  ".into(),
        board_id: None,
        base_url: None,
    };
    assert!(TrelloProvider::from_config(Some(&blank)).is_err());
}

#[tokio::test]
async fn board_actions_sends_range_and_default_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/boards/b1/actions")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("since".into(), "2024-05-01T00:00:00+00:00".into()),
            Matcher::UrlEncoded("before".into(), "2024-05-01T02:00:00+00:00".into()),
            Matcher::UrlEncoded("filter".into(), "updateCard,commentCard".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":"a1","idMemberCreator":"m1","type":"commentCard","date":"2024-05-01T01:00:00.000Z","data":{"text":"on it"}}]"#,
        )
        .create_async()
        .await;

    let query = ActionQuery::between(
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap(),
    )
    .with_filter(vec![ActionType::UpdateCard, ActionType::CommentCard]);

    let actions = provider(&server).board_actions("b1", &query).await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].data.text.as_deref(), Some("on it"));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_uniform_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/lists/l1/cards")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let err = provider(&server).list_cards("l1").await.unwrap_err();
    match err {
        ApiError::Status { status, text } => {
            assert_eq!(status, 404);
            assert_eq!(text, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/boards/b1/labels")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{not json")
        .create_async()
        .await;

    let err = provider(&server).board_labels("b1").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn move_card_puts_new_list() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/cards/c1")
        .match_query(with_auth(vec![Matcher::UrlEncoded("idList".into(), "l2".into())]))
        .with_status(200)
        .with_body(r#"{"id":"c1","name":"Crash","idList":"l2"}"#)
        .create_async()
        .await;

    let card = provider(&server).move_card("c1", "l2").await.unwrap();
    assert_eq!(card.id_list.as_deref(), Some("l2"));
    mock.assert_async().await;
}

#[tokio::test]
async fn add_comment_posts_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/cards/c1/actions/comments")
        .match_query(with_auth(vec![Matcher::UrlEncoded(
            "text".into(),
            "fixed in build 42".into(),
        )]))
        .with_status(200)
        .with_body(
            r#"{"id":"a9","idMemberCreator":"m1","type":"commentCard","date":"2024-05-01T01:00:00Z","data":{"text":"fixed in build 42"}}"#,
        )
        .create_async()
        .await;

    let action = provider(&server)
        .add_comment("c1", "fixed in build 42")
        .await
        .unwrap();
    assert_eq!(action.kind, ActionType::CommentCard);
    mock.assert_async().await;
}

#[tokio::test]
async fn search_unwraps_cards() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("query".into(), "login".into()),
            Matcher::UrlEncoded("modelTypes".into(), "cards".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"cards":[{"id":"c1","name":"Login crash"}],"boards":[]}"#)
        .create_async()
        .await;

    let cards = provider(&server).search_cards("login").await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Login crash");
}

#[tokio::test]
async fn webhook_lifecycle() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/tokens/t/webhooks")
        .match_query(with_auth(vec![]))
        .with_status(200)
        .with_body(r#"[{"id":"w1","idModel":"b1","callbackURL":"https://x/hook","active":false}]"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/webhooks")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("idModel".into(), "b1".into()),
            Matcher::UrlEncoded("callbackURL".into(), "https://x/hook".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"w2","idModel":"b1","callbackURL":"https://x/hook"}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/webhooks/w2")
        .match_query(with_auth(vec![]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let p = provider(&server);
    let hooks = p.list_webhooks().await.unwrap();
    assert!(!hooks[0].active);

    let created = p
        .create_webhook(&NewWebhook {
            description: "shift report".into(),
            callback_url: "https://x/hook".into(),
            id_model: "b1".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "w2");
    p.delete_webhook("w2").await.unwrap();

    list.assert_async().await;
    create.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn member_changes_use_id_members_endpoint() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/cards/c1/idMembers")
        .match_query(with_auth(vec![Matcher::UrlEncoded("value".into(), "m2".into())]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", "/cards/c1/idMembers/m2")
        .match_query(with_auth(vec![]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let p = provider(&server);
    p.add_member("c1", "m2").await.unwrap();
    p.remove_member("c1", "m2").await.unwrap();
    add.assert_async().await;
    remove.assert_async().await;
}

#[tokio::test]
async fn default_mutations_go_through_update_card() {
    let provider = MockProvider::new().with_cards(vec![sample_card("c1")]);

    let moved = provider.move_card("c1", "l-done").await.unwrap();
    assert_eq!(moved.id_list.as_deref(), Some("l-done"));
    let done = provider.mark_complete("c1").await.unwrap();
    assert!(done.due_complete);

    assert_eq!(
        provider.updates(),
        vec![
            ("c1".to_string(), CardUpdate::move_to("l-done")),
            ("c1".to_string(), CardUpdate::complete()),
        ]
    );
}

#[tokio::test]
async fn mutation_errors_propagate() {
    let provider = MockProvider::new();
    let err = provider.move_card("missing", "l1").await.unwrap_err();
    assert!(err.to_string().contains("404"));
}
