mod tag_list_cache;

pub use tag_list_cache::TagListCache;
