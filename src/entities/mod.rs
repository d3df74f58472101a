pub mod prelude;

pub mod categories;
pub mod comments;
pub mod genre_titles;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;
