use kod_http::openapi::ApiDoc;
use utoipa::OpenApi;

#[tokio::test]
async fn test_openapi_yaml_generation() {
    let openapi = ApiDoc::openapi();
    let yaml = serde_yaml::to_string(&openapi).unwrap();
    assert!(!yaml.is_empty());
    assert!(yaml.contains("openapi:"));
    assert!(yaml.contains("KOD Trade Explorer API"));
    assert!(yaml.contains("/api/trade/{id}/decrypt"));
}

#[tokio::test]
async fn test_openapi_struct() {
    let openapi = ApiDoc::openapi();
    assert_eq!(openapi.info.title, "KOD Trade Explorer API");
    assert_eq!(openapi.info.version, env!("CARGO_PKG_VERSION"));
    assert!(!openapi.paths.paths.is_empty());
}
