pub mod bill_mapper;
pub mod split_mapper;
