use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i32,
    pub title_id: i32,
    pub title_name: String,
    pub text: String,
    pub author_id: i32,
    pub author: String,
    pub score: i16,
    pub pub_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub review_id: i32,
    pub text: String,
    pub author_id: i32,
    pub author: String,
    pub pub_date: String,
}
