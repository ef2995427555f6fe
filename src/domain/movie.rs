/// 映画レコードのドメインモデル
///
/// DynamoDBに書き込む1件のレコード（year / title / id）を表現する。
/// すべてのフィールドはテキスト形式で保持し、yearのみDynamoDBでは
/// 数値型属性（N）として書き込まれる。
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// ペイロードが存在しない場合に書き込むデフォルトレコードのyear
pub const DEFAULT_YEAR: &str = "2012";

/// ペイロードが存在しない場合に書き込むデフォルトレコードのtitle
pub const DEFAULT_TITLE: &str = "The Amazing Spider-Man 2";

/// ペイロード変換のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MovieParseError {
    /// ペイロードがJSONオブジェクトではない
    #[error("Payload is not a JSON object")]
    NonObjectPayload,

    /// 必須フィールドが存在しない
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// フィールドがテキスト/数値形式に変換できない
    #[error("Field cannot be coerced to text: {0}")]
    InvalidField(&'static str),

    /// 変換結果が空文字列
    #[error("Field is empty: {0}")]
    EmptyField(&'static str),
}

/// DynamoDBに書き込む映画レコード
///
/// 不変条件: 3フィールドすべてが存在し、テキスト変換後に非空であること。
/// この条件を満たさないペイロードからはレコードを構築できない。
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// 公開年（テキスト保持、DynamoDBでは数値型属性）
    pub year: String,
    /// タイトル
    pub title: String,
    /// レコードID（呼び出し元指定または生成値）
    pub id: String,
}

impl Movie {
    /// パース済みのJSONペイロードからレコードを構築
    ///
    /// year / title / idの3キーをテキスト形式に変換する。
    /// JSON文字列はそのまま、数値・真偽値は正規のテキスト表現に変換し、
    /// それ以外の型（null、配列、オブジェクト）は変換エラーとする。
    ///
    /// # 引数
    /// * `payload` - パース済みのJSONペイロード
    ///
    /// # 戻り値
    /// * 成功時は`Ok(Movie)`
    /// * 不変条件を満たさない場合は`Err(MovieParseError)`
    pub fn from_json(payload: &Value) -> Result<Self, MovieParseError> {
        let map = payload
            .as_object()
            .ok_or(MovieParseError::NonObjectPayload)?;

        let year = Self::coerce_field(map, "year")?;
        let title = Self::coerce_field(map, "title")?;
        let id = Self::coerce_field(map, "id")?;

        Ok(Self { year, title, id })
    }

    /// ペイロードが存在しない場合のデフォルトレコードを生成
    ///
    /// year / titleは固定値、idは呼び出しごとに新規生成したUUID v4。
    pub fn placeholder() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            title: DEFAULT_TITLE.to_string(),
            id: Uuid::new_v4().to_string(),
        }
    }

    /// 1フィールドをテキスト形式に変換
    fn coerce_field(
        map: &serde_json::Map<String, Value>,
        name: &'static str,
    ) -> Result<String, MovieParseError> {
        let value = map.get(name).ok_or(MovieParseError::MissingField(name))?;

        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(MovieParseError::InvalidField(name)),
        };

        if text.is_empty() {
            return Err(MovieParseError::EmptyField(name));
        }

        Ok(text)
    }
}
