pub(crate) mod backend;
pub(crate) mod carousel;
pub(crate) mod cpu;
pub(crate) mod fit;
pub(crate) mod overlay;
pub(crate) mod plan;
pub(crate) mod text_scroll;
