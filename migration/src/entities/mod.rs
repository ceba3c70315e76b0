pub mod shortlink;

pub use shortlink::Entity as ShortlinkEntity;
