// handlers/public - no authentication required

pub mod contact;
pub mod content;
pub mod settings;

pub use contact::post as contact_post;
pub use content::get as content_get;
pub use content::list as content_list;
pub use settings::get as settings_get;
