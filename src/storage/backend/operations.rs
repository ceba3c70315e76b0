use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, sea_query::OnConflict};
use tracing::debug;

use crate::storage::{SaveOutcome, Shortlink};
use migration::entities::shortlink;

use super::converters::{model_to_shortlink, shortlink_to_active_model};

/// `INSERT ... ON CONFLICT (long) DO NOTHING`，再按 long 读回最终记录
///
/// 没有插入成功说明该 long 已存在，返回已有记录并标记为冲突。
/// uid 主键冲突不在 ON CONFLICT 范围内，会作为错误返回。
pub async fn insert_or_existing<C>(conn: &C, link: &Shortlink) -> Result<SaveOutcome, DbErr>
where
    C: ConnectionTrait,
{
    let inserted = match shortlink::Entity::insert(shortlink_to_active_model(link))
        .on_conflict(
            OnConflict::column(shortlink::Column::Long)
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await
    {
        Ok(_) => true,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) if is_not_inserted(&e) => false,
        Err(e) => return Err(e),
    };

    let row = shortlink::Entity::find()
        .filter(shortlink::Column::Long.eq(link.long.as_str()))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("long url not found after insert: {}", link.long)))?;

    let stored = model_to_shortlink(row);
    // 不报 RecordNotInserted 的驱动：读回的 uid 不同说明是已有记录
    if inserted && stored.uid == link.uid {
        Ok(SaveOutcome::Inserted(stored))
    } else {
        debug!(
            "Long URL already stored as {}, skipped insert of {}",
            stored.uid, link.uid
        );
        Ok(SaveOutcome::UrlConflict(stored))
    }
}

/// 部分驱动在 DO NOTHING 跳过插入时返回的是查询错误而不是 RecordNotInserted
fn is_not_inserted(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("no rows") || msg.contains("record not inserted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_inserted_messages() {
        let err = DbErr::Custom("no rows returned by a query".to_string());
        assert!(is_not_inserted(&err));

        let err = DbErr::Custom("UNIQUE constraint failed: shortlinks.uid".to_string());
        assert!(!is_not_inserted(&err));
    }
}
