pub mod event_processor;
pub mod normalize;
