use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        (
            self.skip.unwrap_or(0).max(0),
            self.limit.unwrap_or(default_limit).max(0),
        )
    }
}
