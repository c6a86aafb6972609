pub(crate) mod compositor;
pub(crate) mod display_loop;
pub(crate) mod scheduler;
pub(crate) mod state;
