/// DynamoDBで映画レコードを管理するためのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

use crate::domain::Movie;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MovieRepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),
}

/// レコード永続化用トレイト
///
/// 異なる実装を可能にします（実際のDynamoDB、テスト用モック）。
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// レコードを保存（無条件put、同一IDは上書き）
    ///
    /// # 引数
    /// * `movie` - 保存するレコード
    ///
    /// # 戻り値
    /// * 成功時は`Ok(())`
    /// * 失敗時は`Err(MovieRepositoryError)`
    async fn put(&self, movie: &Movie) -> Result<(), MovieRepositoryError>;
}

/// MovieRepositoryのDynamoDB実装
///
/// yearは数値型属性（N）、title / idはテキスト型属性（S）として書き込む。
/// 条件式・バッチ・トランザクションは使用しない。
#[derive(Debug, Clone)]
pub struct DynamoMovieRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// レコードテーブル名
    table_name: String,
}

impl DynamoMovieRepository {
    /// 新しいDynamoMovieRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - レコードテーブルの名前
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl MovieRepository for DynamoMovieRepository {
    async fn put(&self, movie: &Movie) -> Result<(), MovieRepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("year", AttributeValue::N(movie.year.clone()))
            .item("title", AttributeValue::S(movie.title.clone()))
            .item("id", AttributeValue::S(movie.id.clone()))
            .send()
            .await
            .map_err(|err| {
                MovieRepositoryError::WriteError(err.into_service_error().to_string())
            })?;

        Ok(())
    }
}
