/// 映画レコード挿入Lambdaエントリポイント
///
/// API Gateway経由のHTTPリクエストを処理し、映画レコードを1件
/// DynamoDBに書き込んでJSONレスポンスを返却する。
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use movies_api::application::{AuditContext, InsertHandler};
use movies_api::infrastructure::{init_logging, DynamoDbConfig, DynamoMovieRepository};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("挿入Lambda関数を初期化");

    // クライアントとテーブル名は実行環境ごとに1回だけ構築し、
    // 以降の呼び出しで再利用する
    let config = DynamoDbConfig::from_env().await?;
    let repository =
        DynamoMovieRepository::new(config.client().clone(), config.table_name().to_string());
    let handler = InsertHandler::new(repository);

    // Lambda関数を実行
    run(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| {
        handle(&handler, &config, event)
    }))
    .await
}

/// 1回分の呼び出しを処理
///
/// 監査コンテキストを構築してハンドラーに委譲する。
/// あらゆる結果はレスポンスとして表現され、ランタイムにエラーは返さない。
async fn handle(
    handler: &InsertHandler<DynamoMovieRepository>,
    config: &DynamoDbConfig,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let audit = AuditContext::from_event(&event.payload, &event.context, config.table_name());

    Ok(handler.handle(&event.payload, &audit).await)
}
