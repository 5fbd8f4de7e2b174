pub mod ndjson_sink;
pub mod ndjson_source;
