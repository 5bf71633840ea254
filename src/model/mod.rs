pub mod simple_bicycle;

pub use simple_bicycle::SimpleBicycle;
