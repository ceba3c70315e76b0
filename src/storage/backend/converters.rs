use crate::storage::Shortlink;
use migration::entities::shortlink;

/// 将 Sea-ORM Model 转换为 Shortlink
pub fn model_to_shortlink(model: shortlink::Model) -> Shortlink {
    Shortlink {
        uid: model.uid,
        owner_id: model.owner_id,
        short: model.short,
        long: model.long,
        deleted: model.deleted,
        correlation_id: model.correlation_id,
    }
}

/// 将 Shortlink 转换为用于插入的 ActiveModel
pub fn shortlink_to_active_model(link: &Shortlink) -> shortlink::ActiveModel {
    use sea_orm::ActiveValue::Set;

    shortlink::ActiveModel {
        uid: Set(link.uid.clone()),
        owner_id: Set(link.owner_id.clone()),
        short: Set(link.short.clone()),
        long: Set(link.long.clone()),
        deleted: Set(link.deleted),
        correlation_id: Set(link.correlation_id.clone()),
    }
}
