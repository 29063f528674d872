pub mod authenticator;
pub mod pagination;
pub mod seed;
pub mod sheet;
pub mod uploader;
