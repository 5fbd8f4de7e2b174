pub mod ports;
pub mod batch_use_case;
