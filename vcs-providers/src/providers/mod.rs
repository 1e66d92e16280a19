pub mod bitbucket;
pub mod github;
pub mod gitlab;
