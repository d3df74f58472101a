mod migrate;
mod review;
mod title;
mod user;

pub use migrate::{cmd_migrate_down, cmd_migrate_status, cmd_migrate_up};
pub use review::cmd_review_show;
pub use title::{cmd_title_list, cmd_title_show};
pub use user::{cmd_user_add, cmd_user_list};
