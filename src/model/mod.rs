pub(crate) mod carousel;
pub(crate) mod message;
pub(crate) mod zone;
