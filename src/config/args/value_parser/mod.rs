pub mod bucket;
pub mod url;
