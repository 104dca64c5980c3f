pub mod flatbuffer_store_generated;
pub mod serializer;
