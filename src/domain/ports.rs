use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 資料存取介面：由呼叫端注入，不使用全域單例
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// 取得資料表的全部記錄（一次性快照）
    async fn list_all(&self, table: &str) -> Result<Vec<Record>>;

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Record>;
}
