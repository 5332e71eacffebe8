use std::time::Duration;

use mealie_import::extractors::{AiRecipeExtractor, RecipeExtractor};
use mealie_import::providers::OpenAIProvider;
use mealie_import::url_to_text::RequestFetcher;
use mealie_import::ImportError;
use mockito::{Matcher, Server};
use serde_json::json;
use url::Url;

const PIE_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Recipe: Grandma&#39;s Apple Pie</title>
    <script>window.dataLayer = [];</script>
</head>
<body>
    <nav>Home | Desserts</nav>
    <h1>Grandma's Apple Pie</h1>
    <p>My grandmother baked this every autumn.</p>
    <ul>
        <li>6 apples</li>
        <li>1 pie crust</li>
    </ul>
    <ol>
        <li>Roll the dough.</li>
        <li>Fill with apples and bake for 45 minutes.</li>
    </ol>
</body>
</html>
"#;

fn extractor(server: &Server) -> AiRecipeExtractor {
    let provider = OpenAIProvider::with_base_url(
        "fake_api_key".to_string(),
        server.url(),
        "gpt-4o-mini".to_string(),
    );
    let fetcher = RequestFetcher::new(Duration::from_secs(5)).unwrap();
    AiRecipeExtractor::new(fetcher, Box::new(provider), 8000)
}

fn completion(content: serde_json::Value) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}]
    })
    .to_string()
}

#[tokio::test]
async fn test_extracts_recipe_from_page() {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/apple-pie")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PIE_PAGE)
        .create_async()
        .await;
    let model = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer fake_api_key")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Roll the dough".to_string()),
            Matcher::Regex("6 apples".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(json!({
            "name": null,
            "description": "A family classic.",
            "ingredients": ["6 apples", "1 pie crust"],
            "instructions": ["Roll the dough.", "Fill with apples and bake for 45 minutes."],
            "error": ""
        })))
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/apple-pie", server.url())).unwrap();
    let candidate = extractor(&server).extract_recipe(&url).await.unwrap();

    // No name from the model, so the page title is used
    assert_eq!(candidate.title, "Grandma's Apple Pie");
    assert_eq!(candidate.description.as_deref(), Some("A family classic."));
    assert_eq!(candidate.ingredients, vec!["6 apples", "1 pie crust"]);
    assert_eq!(candidate.instructions.len(), 2);
    assert_eq!(candidate.source_url, url.to_string());
    assert!(candidate.slug.is_none());
    page.assert_async().await;
    model.assert_async().await;
}

#[tokio::test]
async fn test_page_script_is_not_sent_to_model() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/apple-pie")
        .with_status(200)
        .with_body(PIE_PAGE)
        .create_async()
        .await;
    let model = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("dataLayer".to_string()))
        .expect(0)
        .create_async()
        .await;
    let _fallback = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion(json!({
            "name": "Apple Pie",
            "ingredients": ["6 apples"],
            "instructions": ["Bake."]
        })))
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/apple-pie", server.url())).unwrap();
    let candidate = extractor(&server).extract_recipe(&url).await.unwrap();

    assert_eq!(candidate.title, "Apple Pie");
    model.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_page_skips_model() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;
    let model = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/gone", server.url())).unwrap();
    let result = extractor(&server).extract_recipe(&url).await;

    assert!(matches!(result, Err(ImportError::Api { status: 404, .. })));
    model.assert_async().await;
}

#[tokio::test]
async fn test_page_without_text() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/app")
        .with_status(200)
        .with_body("<html><head><title>App</title></head><body><script>render()</script></body></html>")
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/app", server.url())).unwrap();
    let result = extractor(&server).extract_recipe(&url).await;

    assert!(matches!(result, Err(ImportError::AiParse(_))));
}

#[tokio::test]
async fn test_model_reports_no_recipe() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/blog")
        .with_status(200)
        .with_body("<html><body><p>Ten reasons to love autumn.</p></body></html>")
        .create_async()
        .await;
    let _model = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion(json!({
            "ingredients": [],
            "instructions": [],
            "error": "The page does not contain a recipe"
        })))
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/blog", server.url())).unwrap();
    let err = extractor(&server).extract_recipe(&url).await.unwrap_err();

    match err {
        ImportError::AiParse(message) => assert!(message.contains("does not contain a recipe")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_provider_failure_is_reported() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/apple-pie")
        .with_status(200)
        .with_body(PIE_PAGE)
        .create_async()
        .await;
    let _model = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/apple-pie", server.url())).unwrap();
    let result = extractor(&server).extract_recipe(&url).await;

    assert!(matches!(result, Err(ImportError::AiProvider(_))));
}
