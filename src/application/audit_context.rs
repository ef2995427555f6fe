/// 監査ログコンテキスト
///
/// 呼び出し1回分の監査フィールド（リクエストID、呼び出し元IP等）を束ね、
/// すべてのログエントリに同じフィールドセットを付与して出力する。
/// 呼び出し元情報が欠落している場合は固定値"unknown"、リクエスト時刻が
/// 欠落している場合は現在時刻で補完する。
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use chrono::Utc;
use lambda_runtime::Context;
use serde_json::Value;
use tracing::{error, info};

/// 呼び出し元情報が欠落している場合の補完値
const UNKNOWN: &str = "unknown";

/// 監査ログのイベント種別（全エントリ共通）
const EVENT_TYPE: &str = "api_request";

/// 監査フィールドを束ねたログコンテキスト
///
/// 各ステージのログ出力メソッドは、束ねたフィールド全体に
/// ステージ固有のメッセージと追加フィールドを加えて出力する。
#[derive(Debug, Clone)]
pub struct AuditContext {
    /// 呼び出しごとの一意なリクエストID
    pub request_id: String,
    /// 呼び出し元IPアドレス
    pub source_ip: String,
    /// 呼び出し元ユーザーエージェント
    pub user_agent: String,
    /// リクエスト時刻
    pub request_time: String,
    /// 書き込み先テーブル名
    pub table_name: String,
    /// Lambda関数名
    pub function_name: String,
}

impl AuditContext {
    /// 呼び出しイベントと実行コンテキストから監査コンテキストを構築
    ///
    /// # 引数
    /// * `event` - API Gatewayプロキシイベント
    /// * `context` - Lambda実行コンテキスト
    /// * `table_name` - 書き込み先テーブル名
    pub fn from_event(
        event: &ApiGatewayProxyRequest,
        context: &Context,
        table_name: &str,
    ) -> Self {
        let identity = &event.request_context.identity;

        Self {
            request_id: context.request_id.clone(),
            source_ip: identity
                .source_ip
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            user_agent: identity
                .user_agent
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            request_time: event
                .request_context
                .request_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            table_name: table_name.to_string(),
            function_name: context.env_config.function_name.clone(),
        }
    }

    /// リクエスト受信を記録
    pub fn request_received(&self, has_payload: bool) {
        info!(
            request_id = %self.request_id,
            source_ip = %self.source_ip,
            user_agent = %self.user_agent,
            request_time = %self.request_time,
            event_type = EVENT_TYPE,
            table_name = %self.table_name,
            function_name = %self.function_name,
            has_payload,
            "Request received"
        );
    }

    /// ペイロード付きリクエストの処理開始を記録
    ///
    /// ペイロードがオブジェクトの場合はキー一覧を、
    /// それ以外の場合はマーカー"non_dict_payload"を出力する。
    pub fn payload_received(&self, payload: &Value) {
        match payload.as_object() {
            Some(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                info!(
                    request_id = %self.request_id,
                    source_ip = %self.source_ip,
                    user_agent = %self.user_agent,
                    request_time = %self.request_time,
                    event_type = EVENT_TYPE,
                    table_name = %self.table_name,
                    function_name = %self.function_name,
                    payload_keys = ?keys,
                    "Processing request with payload"
                );
            }
            None => {
                info!(
                    request_id = %self.request_id,
                    source_ip = %self.source_ip,
                    user_agent = %self.user_agent,
                    request_time = %self.request_time,
                    event_type = EVENT_TYPE,
                    table_name = %self.table_name,
                    function_name = %self.function_name,
                    payload_keys = "non_dict_payload",
                    "Processing request with payload"
                );
            }
        }
    }

    /// ペイロードなしリクエストのデフォルトデータ処理を記録
    pub fn default_payload(&self) {
        info!(
            request_id = %self.request_id,
            source_ip = %self.source_ip,
            user_agent = %self.user_agent,
            request_time = %self.request_time,
            event_type = EVENT_TYPE,
            table_name = %self.table_name,
            function_name = %self.function_name,
            "Processing request without payload - using default data"
        );
    }

    /// レコード書き込み成功を記録
    pub fn insert_succeeded(&self, item_id: &str) {
        info!(
            request_id = %self.request_id,
            source_ip = %self.source_ip,
            user_agent = %self.user_agent,
            request_time = %self.request_time,
            event_type = EVENT_TYPE,
            table_name = %self.table_name,
            function_name = %self.function_name,
            operation = "put_item",
            item_id = %item_id,
            "Data inserted successfully"
        );
    }

    /// デフォルトレコード書き込み成功を記録
    pub fn default_insert_succeeded(&self, item_id: &str) {
        info!(
            request_id = %self.request_id,
            source_ip = %self.source_ip,
            user_agent = %self.user_agent,
            request_time = %self.request_time,
            event_type = EVENT_TYPE,
            table_name = %self.table_name,
            function_name = %self.function_name,
            operation = "put_item",
            item_id = %item_id,
            "Default data inserted successfully"
        );
    }

    /// リクエスト処理失敗を記録
    pub fn request_failed(&self, error_message: &str, error_type: &str) {
        error!(
            request_id = %self.request_id,
            source_ip = %self.source_ip,
            user_agent = %self.user_agent,
            request_time = %self.request_time,
            event_type = EVENT_TYPE,
            table_name = %self.table_name,
            function_name = %self.function_name,
            error = %error_message,
            error_type = %error_type,
            "Error processing request"
        );
    }
}
