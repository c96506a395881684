// handlers/admin - session resolved by middleware, decisions made by the guard

pub mod admins;
pub mod content;
pub mod media;
pub mod whoami;

pub use admins::grant as grant_post;
pub use content::{
    delete as content_delete, get as content_get, list as content_list, patch as content_patch,
    post as content_post, publish as content_publish, unpublish as content_unpublish,
};
pub use media::{delete as media_delete, list as media_list, put as media_put};
pub use whoami::get as whoami_get;
