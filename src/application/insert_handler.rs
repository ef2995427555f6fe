/// 挿入リクエストハンドラー
///
/// API Gateway経由の呼び出しイベントを処理し、映画レコードを1件
/// DynamoDBに書き込んでHTTP形式のレスポンスを返す。
///
/// 処理は3ステージの直列構成:
/// 1. リクエスト受信の監査ログ出力
/// 2. ペイロード有無による分岐とレコード書き込み
/// 3. 成否のHTTPレスポンスへのマッピング
use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{json, Value};
use thiserror::Error;

use crate::application::AuditContext;
use crate::domain::{Movie, MovieParseError};
use crate::infrastructure::{MovieRepository, MovieRepositoryError};

/// 成功レスポンスのメッセージ
const SUCCESS_MESSAGE: &str = "Successfully inserted data!";

/// 失敗レスポンスのメッセージ（すべての失敗で共通）
const ERROR_MESSAGE: &str = "Internal server error";

/// 挿入ハンドラーのエラー型
///
/// すべてのバリアントは呼び出し元には区別されず、単一の500レスポンスに
/// 集約される。種別は監査ログのerror_typeフィールドにのみ現れる。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InsertHandlerError {
    /// ペイロードがJSONとしてパースできない
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// ペイロードからレコードを構築できない
    #[error(transparent)]
    InvalidRecord(#[from] MovieParseError),

    /// リポジトリへの書き込みに失敗
    #[error(transparent)]
    StorageError(#[from] MovieRepositoryError),
}

impl InsertHandlerError {
    /// 監査ログ用のエラー種別ラベル
    pub fn kind(&self) -> &'static str {
        match self {
            InsertHandlerError::MalformedPayload(_) => "MalformedPayload",
            InsertHandlerError::InvalidRecord(_) => "InvalidRecord",
            InsertHandlerError::StorageError(_) => "StorageError",
        }
    }
}

/// 挿入リクエストを処理するハンドラー
///
/// リポジトリをジェネリックに注入することでテスト時の差し替えを可能にする。
pub struct InsertHandler<R>
where
    R: MovieRepository,
{
    /// レコードリポジトリ
    repository: R,
}

impl<R> InsertHandler<R>
where
    R: MovieRepository,
{
    /// 新しいInsertHandlerを作成
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// 呼び出しイベントを処理してレスポンスを生成
    ///
    /// # 処理フロー
    /// 1. 受信ログを出力（ペイロード有無を含む）
    /// 2. 非空ボディがあればパース・変換して書き込み、
    ///    なければデフォルトレコードを生成して書き込み
    /// 3. 成功は200、あらゆる失敗は共通の500レスポンスに集約
    ///
    /// # 引数
    /// * `event` - API Gatewayプロキシイベント
    /// * `audit` - この呼び出しの監査コンテキスト
    ///
    /// # 戻り値
    /// API Gateway形式のHTTPレスポンス（200または500のみ）
    pub async fn handle(
        &self,
        event: &ApiGatewayProxyRequest,
        audit: &AuditContext,
    ) -> ApiGatewayProxyResponse {
        // 空文字列ボディはボディなしと同じ扱い
        let body = event.body.as_deref().filter(|b| !b.is_empty());

        audit.request_received(body.is_some());

        match self.process(body, audit).await {
            Ok(_item_id) => json_response(200, SUCCESS_MESSAGE),
            Err(err) => {
                audit.request_failed(&err.to_string(), err.kind());
                json_response(500, ERROR_MESSAGE)
            }
        }
    }

    /// レコードの決定と書き込み
    ///
    /// # 戻り値
    /// 書き込んだレコードのID
    async fn process(
        &self,
        body: Option<&str>,
        audit: &AuditContext,
    ) -> Result<String, InsertHandlerError> {
        match body {
            Some(raw) => {
                let payload: Value = serde_json::from_str(raw)
                    .map_err(|e| InsertHandlerError::MalformedPayload(e.to_string()))?;

                audit.payload_received(&payload);

                let movie = Movie::from_json(&payload)?;
                self.repository.put(&movie).await?;

                audit.insert_succeeded(&movie.id);
                Ok(movie.id)
            }
            None => {
                audit.default_payload();

                let movie = Movie::placeholder();
                self.repository.put(&movie).await?;

                audit.default_insert_succeeded(&movie.id);
                Ok(movie.id)
            }
        }
    }
}

/// 固定形式のJSONレスポンスを構築
///
/// レスポンスは常にContent-Type: application/jsonと
/// `{"message": ...}`形式のボディを持つ。
fn json_response(status_code: i64, message: &str) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    ApiGatewayProxyResponse {
        status_code,
        headers,
        body: Some(Body::Text(json!({ "message": message }).to_string())),
        is_base64_encoded: false,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::init_test_logging;
    use crate::infrastructure::movie_repository::tests::MockMovieRepository;
    use lambda_runtime::Context;

    /// テスト用のハンドラーとモックリポジトリを作成
    fn create_handler() -> (InsertHandler<MockMovieRepository>, MockMovieRepository) {
        init_test_logging();
        let repository = MockMovieRepository::new();
        let handler = InsertHandler::new(repository.clone());
        (handler, repository)
    }

    /// テスト用の監査コンテキストを作成
    fn create_audit() -> AuditContext {
        AuditContext::from_event(
            &ApiGatewayProxyRequest::default(),
            &Context::default(),
            "test-movies",
        )
    }

    /// ボディ付きのテストイベントを作成
    fn request_with_body(body: &str) -> ApiGatewayProxyRequest {
        ApiGatewayProxyRequest {
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    /// レスポンスボディをJSONとして取り出す
    fn parse_body(response: &ApiGatewayProxyResponse) -> Value {
        let text = match response.body.as_ref().unwrap() {
            Body::Text(text) => text.clone(),
            other => panic!("予期しないBody型: {:?}", other),
        };
        serde_json::from_str(&text).unwrap()
    }

    /// 正常なペイロードで1件書き込まれ、200が返る
    #[tokio::test]
    async fn test_handle_with_valid_payload() {
        let (handler, repository) = create_handler();
        let event = request_with_body(r#"{"year": 2020, "title": "Dune", "id": "abc"}"#);

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(parse_body(&response)["message"], "Successfully inserted data!");

        assert_eq!(repository.movie_count(), 1);
        let movie = repository.get_movie("abc").unwrap();
        assert_eq!(movie.year, "2020");
        assert_eq!(movie.title, "Dune");
    }

    /// 文字列形式のフィールドでも同じレコードになる
    #[tokio::test]
    async fn test_handle_coerces_string_fields() {
        let (handler, repository) = create_handler();
        let event = request_with_body(r#"{"year": "2020", "title": "Dune", "id": "abc"}"#);

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(repository.get_movie("abc").unwrap().year, "2020");
    }

    /// ボディなしはデフォルトレコードが書き込まれ、200が返る
    #[tokio::test]
    async fn test_handle_without_body_inserts_default() {
        let (handler, repository) = create_handler();
        let event = ApiGatewayProxyRequest::default();

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(repository.movie_count(), 1);
    }

    /// 空文字列ボディはボディなしと同じ扱い
    #[tokio::test]
    async fn test_handle_empty_body_inserts_default() {
        let (handler, repository) = create_handler();
        let event = request_with_body("");

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(repository.movie_count(), 1);
    }

    /// デフォルトレコードのIDは呼び出しごとに異なる
    #[tokio::test]
    async fn test_handle_default_ids_distinct_across_invocations() {
        let (handler, repository) = create_handler();
        let event = ApiGatewayProxyRequest::default();
        let audit = create_audit();

        handler.handle(&event, &audit).await;
        handler.handle(&event, &audit).await;

        // 異なるIDで2件保存される
        assert_eq!(repository.movie_count(), 2);
    }

    /// 不正なJSONボディは何も書き込まれず、500が返る
    #[tokio::test]
    async fn test_handle_malformed_json() {
        let (handler, repository) = create_handler();
        let event = request_with_body("{not json");

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(parse_body(&response)["message"], "Internal server error");
        assert_eq!(repository.movie_count(), 0);
    }

    /// 必須キー欠落は何も書き込まれず、500が返る
    #[tokio::test]
    async fn test_handle_missing_required_keys() {
        let (handler, repository) = create_handler();
        let event = request_with_body(r#"{"year": 2020}"#);

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(parse_body(&response)["message"], "Internal server error");
        assert_eq!(repository.movie_count(), 0);
    }

    /// オブジェクト以外のJSONボディは500が返る
    #[tokio::test]
    async fn test_handle_non_object_payload() {
        let (handler, repository) = create_handler();
        let event = request_with_body(r#"[1, 2, 3]"#);

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(repository.movie_count(), 0);
    }

    /// リポジトリ書き込み失敗も同じ500に集約される
    #[tokio::test]
    async fn test_handle_storage_failure() {
        let (handler, repository) = create_handler();
        repository.set_next_error(MovieRepositoryError::WriteError("throttled".to_string()));
        let event = request_with_body(r#"{"year": 2020, "title": "Dune", "id": "abc"}"#);

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(parse_body(&response)["message"], "Internal server error");
        assert_eq!(repository.movie_count(), 0);
    }

    /// 同一IDの再送信は上書きされ、最後の内容が残る（upsertセマンティクス）
    #[tokio::test]
    async fn test_handle_same_id_upserts() {
        let (handler, repository) = create_handler();
        let audit = create_audit();

        let first = request_with_body(r#"{"year": 2020, "title": "Dune", "id": "abc"}"#);
        let second = request_with_body(r#"{"year": 2021, "title": "Dune: Part Two", "id": "abc"}"#);

        assert_eq!(handler.handle(&first, &audit).await.status_code, 200);
        assert_eq!(handler.handle(&second, &audit).await.status_code, 200);

        assert_eq!(repository.movie_count(), 1);
        let movie = repository.get_movie("abc").unwrap();
        assert_eq!(movie.year, "2021");
        assert_eq!(movie.title, "Dune: Part Two");
    }

    /// 成功レスポンスはContent-Type: application/jsonを持つ
    #[tokio::test]
    async fn test_handle_success_content_type() {
        let (handler, _repository) = create_handler();
        let event = ApiGatewayProxyRequest::default();

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(
            response.headers.get("content-type").unwrap(),
            "application/json"
        );
    }

    /// 失敗レスポンスもContent-Type: application/jsonを持つ
    #[tokio::test]
    async fn test_handle_error_content_type() {
        let (handler, _repository) = create_handler();
        let event = request_with_body("{not json");

        let response = handler.handle(&event, &create_audit()).await;

        assert_eq!(
            response.headers.get("content-type").unwrap(),
            "application/json"
        );
    }

    /// エラー種別ラベルのテスト
    #[test]
    fn test_error_kind_labels() {
        assert_eq!(
            InsertHandlerError::MalformedPayload("x".to_string()).kind(),
            "MalformedPayload"
        );
        assert_eq!(
            InsertHandlerError::InvalidRecord(MovieParseError::MissingField("id")).kind(),
            "InvalidRecord"
        );
        assert_eq!(
            InsertHandlerError::StorageError(MovieRepositoryError::WriteError("x".to_string()))
                .kind(),
            "StorageError"
        );
    }

    /// エラー変換のテスト
    #[test]
    fn test_error_conversions() {
        let parse_err: InsertHandlerError = MovieParseError::MissingField("id").into();
        assert_eq!(parse_err.to_string(), "Missing required field: id");

        let repo_err: InsertHandlerError =
            MovieRepositoryError::WriteError("unavailable".to_string()).into();
        assert_eq!(repo_err.to_string(), "Write error: unavailable");
    }
}
