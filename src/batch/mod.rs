//! 异步批量软删除
//!
//! 删除请求先进入缓冲区，由后台任务按固定间隔合并后写入存储后端。

mod processor;

pub use processor::BatchDeleteProcessor;

use crate::errors::Result;

/// 服务层看到的删除队列
///
/// `enqueue` 必须立即返回，不能等待存储后端。
pub trait DeleteQueue: Send + Sync {
    fn enqueue(&self, owner_id: &str, uids: Vec<String>) -> Result<()>;
}
