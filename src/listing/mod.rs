pub mod composer;
pub mod events;
pub mod guard;
pub mod model;
