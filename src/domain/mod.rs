pub mod gateways;
pub mod value_objects;
