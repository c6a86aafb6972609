pub(crate) mod cache;
pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod video;
